// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Capability traits over the host printing subsystems.
//
// Each trait is the smallest surface a session needs from its OS library.
// Implementations do no logging and no cleanup sequencing; that belongs to
// the sessions.

use std::path::Path;

use ticketprint_core::error::{OsError, Result};
use ticketprint_core::types::{DocInfo, JobId, PrintReceipt, SessionState};

/// The contract every printer realization honours.
pub trait PrintSession {
    /// Queue or destination name this session targets.
    fn printer_name(&self) -> &str;

    fn state(&self) -> SessionState;

    fn is_ready(&self) -> bool {
        self.state() == SessionState::Ready
    }

    /// Why the handle could not be acquired, if it could not.
    fn open_error(&self) -> Option<&ticketprint_core::PrintError>;

    /// Submit `text` as the whole content of one print job.
    fn print(&mut self, text: &str) -> Result<PrintReceipt>;

    /// Release the handle. Safe to call any number of times.
    fn close(&mut self);
}

/// The winspool job model: open a queue, stream raw bytes inside a doc/page.
pub trait SpoolerApi {
    type Handle;

    fn open_printer(&self, name: &str) -> std::result::Result<Self::Handle, OsError>;

    /// Start a level-1 document. Returns the spooler's job id.
    fn start_doc(&self, handle: &Self::Handle, doc: &DocInfo)
    -> std::result::Result<u32, OsError>;

    fn start_page(&self, handle: &Self::Handle) -> std::result::Result<(), OsError>;

    /// Returns the number of bytes the spooler accepted.
    fn write(&self, handle: &Self::Handle, bytes: &[u8]) -> std::result::Result<usize, OsError>;

    fn end_page(&self, handle: &Self::Handle) -> std::result::Result<(), OsError>;

    fn end_doc(&self, handle: &Self::Handle) -> std::result::Result<(), OsError>;

    fn close_printer(&self, handle: Self::Handle) -> std::result::Result<(), OsError>;
}

/// The CUPS job model: resolve a destination, submit a file.
pub trait CupsApi {
    /// An owned copy of one destination.
    type Destination;
    /// Destination capabilities (`cups_dinfo_t`).
    type DestInfo;

    /// Look up a destination by name (optionally `name/instance`).
    fn find_destination(&self, name: &str) -> std::result::Result<Self::Destination, OsError>;

    /// `None` when the service could not describe the destination.
    fn copy_dest_info(&self, dest: &Self::Destination) -> Option<Self::DestInfo>;

    /// Enqueue `path` for `dest`. A rejected job surfaces the service's
    /// last error code and string.
    fn print_file(
        &self,
        dest: &Self::Destination,
        path: &Path,
        title: &str,
    ) -> std::result::Result<JobId, OsError>;

    fn free_dest_info(&self, info: Self::DestInfo);

    fn free_destination(&self, dest: Self::Destination);
}
