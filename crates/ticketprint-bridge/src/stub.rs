// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Stub session for targets with neither winspool nor CUPS.
//
// Opening always fails with `PlatformUnavailable`, so every print is
// `InvalidHandle`, matching a printer that could not be opened.

use ticketprint_core::error::{PrintError, Result};
use ticketprint_core::types::{JobOptions, PrintReceipt, SessionState};
use ticketprint_spool::PrintSession;

/// Session that never acquires anything.
pub struct StubSession {
    printer_name: String,
    state: SessionState,
    open_error: Option<PrintError>,
}

impl StubSession {
    pub fn open(printer_name: &str, _options: JobOptions) -> Self {
        tracing::warn!(printer = printer_name, "no print subsystem on this platform");
        Self {
            printer_name: printer_name.to_string(),
            state: SessionState::Failed,
            open_error: Some(PrintError::PlatformUnavailable),
        }
    }
}

impl PrintSession for StubSession {
    fn printer_name(&self) -> &str {
        &self.printer_name
    }

    fn state(&self) -> SessionState {
        self.state
    }

    fn open_error(&self) -> Option<&PrintError> {
        self.open_error.as_ref()
    }

    fn print(&mut self, _text: &str) -> Result<PrintReceipt> {
        tracing::error!(printer = %self.printer_name, "printer handle is invalid");
        Err(PrintError::InvalidHandle)
    }

    fn close(&mut self) {}
}
