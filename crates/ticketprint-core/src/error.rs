// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for ticketprint.

use thiserror::Error;

/// A failed call into the host printing subsystem.
///
/// `code` is the raw platform code: `GetLastError()` for winspool, the
/// `ipp_status_t` from `cupsLastError()` for CUPS, or 0 when the platform
/// gave no code. `message` is the platform text, relayed verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{function} failed with error code {code}: {message}")]
pub struct OsError {
    pub function: &'static str,
    pub code: u32,
    pub message: String,
}

impl OsError {
    pub fn new(function: &'static str, code: u32, message: impl Into<String>) -> Self {
        Self {
            function,
            code,
            message: message.into(),
        }
    }

    /// The printing library itself could not be loaded.
    pub fn library_unavailable(message: impl Into<String>) -> Self {
        Self::new(LIBRARY_LOADER, 0, message)
    }

    pub fn is_library_unavailable(&self) -> bool {
        self.function == LIBRARY_LOADER
    }
}

const LIBRARY_LOADER: &str = "dlopen";

/// Top-level error type for all ticketprint operations.
#[derive(Debug, Error)]
pub enum PrintError {
    // -- Both realizations --
    #[error("unable to open printer {printer}: {source}")]
    HandleAcquisition { printer: String, source: OsError },

    #[error("printer handle is invalid")]
    InvalidHandle,

    // -- Spooler stages --
    #[error("could not start print job: {0}")]
    JobStart(OsError),

    #[error("could not start page: {0}")]
    PageStart(OsError),

    #[error("could not write document data: {0}")]
    Write(OsError),

    #[error("could not finish print job: {0}")]
    JobEnd(OsError),

    // -- Print service --
    #[error("unable to get printer information for {printer}")]
    DestinationInfo { printer: String },

    #[error("unable to create temporary file: {0}")]
    TempFile(#[source] std::io::Error),

    #[error("failed to print file: {0}")]
    Submission(OsError),

    // -- Configuration / startup --
    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("no print subsystem is available on this platform")]
    PlatformUnavailable,
}

impl PrintError {
    /// The platform error behind this failure, if the platform reported one.
    pub fn os_error(&self) -> Option<&OsError> {
        match self {
            Self::HandleAcquisition { source, .. } => Some(source),
            Self::JobStart(e)
            | Self::PageStart(e)
            | Self::Write(e)
            | Self::JobEnd(e)
            | Self::Submission(e) => Some(e),
            _ => None,
        }
    }
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, PrintError>;
