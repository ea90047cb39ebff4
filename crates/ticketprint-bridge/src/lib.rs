// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>

//! ticketprint — native print subsystem bridge.
//!
//! Binds the capability traits from `ticketprint-spool` to the host OS:
//! winspool on Windows, libcups on Unix. Exactly one realization is compiled
//! per target and exported as [`Printer`]; there is no runtime dispatch.
//!
//! All `unsafe` code in the workspace lives in this crate.

#[cfg(windows)]
pub mod win32;

#[cfg(unix)]
pub mod cups;

#[cfg(not(any(windows, unix)))]
pub mod stub;

use ticketprint_core::types::JobOptions;

/// The printer session for this target.
#[cfg(windows)]
pub type Printer = ticketprint_spool::SpoolerSession<win32::Win32Spooler>;

/// The printer session for this target.
#[cfg(unix)]
pub type Printer = ticketprint_spool::CupsSession<cups::LibCups>;

/// The printer session for this target.
#[cfg(not(any(windows, unix)))]
pub type Printer = stub::StubSession;

/// Open a session on the named printer using the native subsystem.
///
/// Never fails; check [`ticketprint_spool::PrintSession::state`] or just
/// call `print` and handle `InvalidHandle`.
pub fn open_printer(printer_name: &str, options: JobOptions) -> Printer {
    tracing::debug!(printer = printer_name, platform = platform_name(), "opening printer");

    #[cfg(windows)]
    {
        ticketprint_spool::SpoolerSession::open(win32::Win32Spooler, printer_name, options)
    }
    #[cfg(unix)]
    {
        ticketprint_spool::CupsSession::open(cups::LibCups::load(), printer_name, options)
    }
    #[cfg(not(any(windows, unix)))]
    {
        stub::StubSession::open(printer_name, options)
    }
}

/// Human-readable name of the compiled realization.
pub fn platform_name() -> &'static str {
    if cfg!(windows) {
        "Windows print spooler"
    } else if cfg!(unix) {
        "CUPS"
    } else {
        "unsupported (stub)"
    }
}
