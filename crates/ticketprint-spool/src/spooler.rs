// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Print-spooler session (raw byte stream).
//
// One job is one document with one page: StartDoc → StartPage → Write →
// EndPage → EndDoc. When a stage fails, every stage already opened is closed
// in reverse before the error is returned, and the printer handle is
// released.

use std::marker::PhantomData;

use chrono::Utc;
use tracing::{debug, error, info, warn};

use ticketprint_core::error::{OsError, PrintError, Result};
use ticketprint_core::types::{DocInfo, JobId, JobOptions, PrintReceipt, SessionState};

use crate::traits::{PrintSession, SpoolerApi};

/// An open (or failed) print-queue handle. Dropping it closes the handle.
pub struct SpoolerSession<A: SpoolerApi> {
    api: A,
    printer_name: String,
    options: JobOptions,
    handle: Option<A::Handle>,
    state: SessionState,
    open_error: Option<PrintError>,
    // Native handles are bound to the thread that opened them.
    _not_send: PhantomData<*const ()>,
}

impl<A: SpoolerApi> SpoolerSession<A> {
    /// Open the named queue. Never fails: on error the session is `Failed`
    /// and every later `print` returns `InvalidHandle`.
    pub fn open(api: A, printer_name: impl Into<String>, options: JobOptions) -> Self {
        let mut session = Self {
            api,
            printer_name: printer_name.into(),
            options,
            handle: None,
            state: SessionState::Unopened,
            open_error: None,
            _not_send: PhantomData,
        };
        session.acquire();
        session
    }

    fn acquire(&mut self) {
        self.state = SessionState::Opening;
        match self.api.open_printer(&self.printer_name) {
            Ok(handle) => {
                self.handle = Some(handle);
                self.state = SessionState::Ready;
                info!(printer = %self.printer_name, "printer opened");
            }
            Err(source) => {
                error!(
                    printer = %self.printer_name,
                    code = source.code,
                    message = %source.message,
                    "failed to initialize printer"
                );
                self.state = SessionState::Failed;
                self.open_error = Some(PrintError::HandleAcquisition {
                    printer: self.printer_name.clone(),
                    source,
                });
            }
        }
    }

    fn release(&mut self) {
        if let Some(handle) = self.handle.take() {
            match self.api.close_printer(handle) {
                Ok(()) => debug!(printer = %self.printer_name, "printer handle released"),
                Err(e) => warn!(printer = %self.printer_name, error = %e, "ClosePrinter failed"),
            }
        }
    }
}

impl<A: SpoolerApi> PrintSession for SpoolerSession<A> {
    fn printer_name(&self) -> &str {
        &self.printer_name
    }

    fn state(&self) -> SessionState {
        self.state
    }

    fn open_error(&self) -> Option<&PrintError> {
        self.open_error.as_ref()
    }

    fn print(&mut self, text: &str) -> Result<PrintReceipt> {
        let handle = match (&self.handle, self.state) {
            (Some(handle), SessionState::Ready) => handle,
            (_, state) => {
                error!(printer = %self.printer_name, ?state, "printer handle is invalid");
                return Err(PrintError::InvalidHandle);
            }
        };

        self.state = SessionState::Printing;
        let doc = &self.options.doc_info;
        info!(
            printer = %self.printer_name,
            document = %doc.name,
            datatype = %doc.datatype,
            "starting document print"
        );

        let payload = self.options.encoding.encode(text);
        match run_job(&self.api, handle, doc, &payload) {
            Ok(job) => {
                self.state = SessionState::Ready;
                info!(printer = %self.printer_name, job_id = job, bytes = payload.len(), "document spooled");
                Ok(PrintReceipt {
                    printer: self.printer_name.clone(),
                    job_id: JobId(job),
                    bytes: payload.len() as u64,
                    submitted_at: Utc::now(),
                })
            }
            Err(err) => {
                if let Some(os) = err.os_error() {
                    error!(
                        printer = %self.printer_name,
                        function = os.function,
                        code = os.code,
                        message = %os.message,
                        "print job failed"
                    );
                }
                self.release();
                self.state = SessionState::Failed;
                Err(err)
            }
        }
    }

    fn close(&mut self) {
        self.release();
        if self.state != SessionState::Failed {
            self.state = SessionState::Closed;
        }
    }
}

impl<A: SpoolerApi> Drop for SpoolerSession<A> {
    fn drop(&mut self) {
        self.release();
    }
}

/// Drive one document through the spooler stages. Returns the job id.
fn run_job<A: SpoolerApi>(
    api: &A,
    handle: &A::Handle,
    doc: &DocInfo,
    payload: &[u8],
) -> Result<u32> {
    let job = api.start_doc(handle, doc).map_err(PrintError::JobStart)?;
    debug!(job_id = job, "StartDocPrinter ok");

    if let Err(e) = api.start_page(handle) {
        end_doc_quietly(api, handle);
        return Err(PrintError::PageStart(e));
    }

    let write_result = api.write(handle, payload).and_then(|written| {
        if written < payload.len() {
            Err(OsError::new(
                "WritePrinter",
                0,
                format!("wrote {written} of {} bytes", payload.len()),
            ))
        } else {
            Ok(written)
        }
    });
    if let Err(e) = write_result {
        end_page_quietly(api, handle);
        end_doc_quietly(api, handle);
        return Err(PrintError::Write(e));
    }

    if let Err(e) = api.end_page(handle) {
        end_doc_quietly(api, handle);
        return Err(PrintError::JobEnd(e));
    }

    api.end_doc(handle).map_err(PrintError::JobEnd)?;
    Ok(job)
}

fn end_page_quietly<A: SpoolerApi>(api: &A, handle: &A::Handle) {
    if let Err(e) = api.end_page(handle) {
        warn!(error = %e, "EndPagePrinter failed during cleanup");
    }
}

fn end_doc_quietly<A: SpoolerApi>(api: &A, handle: &A::Handle) {
    if let Err(e) = api.end_doc(handle) {
        warn!(error = %e, "EndDocPrinter failed during cleanup");
    }
}
