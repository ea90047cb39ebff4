// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Print-service session (file submission).
//
// CUPS has no streaming job API at this level: the ticket is written to a
// temporary file and the file is queued for the destination. The temporary
// file is removed once the service has taken it, on every path.

use std::io::Write;
use std::marker::PhantomData;

use chrono::Utc;
use tracing::{debug, error, info, warn};

use ticketprint_core::error::{PrintError, Result};
use ticketprint_core::types::{JobOptions, PrintReceipt, SessionState};

use crate::traits::{CupsApi, PrintSession};

/// Destination plus its info: acquired together, released together.
struct CupsHandle<A: CupsApi> {
    dest: A::Destination,
    info: A::DestInfo,
}

/// A resolved (or failed) CUPS destination. Dropping it frees the destination.
pub struct CupsSession<A: CupsApi> {
    api: A,
    printer_name: String,
    options: JobOptions,
    handle: Option<CupsHandle<A>>,
    state: SessionState,
    open_error: Option<PrintError>,
    _not_send: PhantomData<*const ()>,
}

impl<A: CupsApi> CupsSession<A> {
    /// Resolve the named destination and fetch its info. Never fails: on
    /// error the session is `Failed` and nothing is held.
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

        let dest = match self.api.find_destination(&self.printer_name) {
            Ok(dest) => dest,
            Err(source) => {
                error!(printer = %self.printer_name, message = %source.message, "unable to find printer");
                self.state = SessionState::Failed;
                self.open_error = Some(PrintError::HandleAcquisition {
                    printer: self.printer_name.clone(),
                    source,
                });
                return;
            }
        };

        let Some(info) = self.api.copy_dest_info(&dest) else {
            error!(printer = %self.printer_name, "unable to get printer information");
            self.api.free_destination(dest);
            self.state = SessionState::Failed;
            self.open_error = Some(PrintError::DestinationInfo {
                printer: self.printer_name.clone(),
            });
            return;
        };

        self.handle = Some(CupsHandle { dest, info });
        self.state = SessionState::Ready;
        info!(printer = %self.printer_name, "destination resolved");
    }

    fn release(&mut self) {
        if let Some(CupsHandle { dest, info }) = self.handle.take() {
            self.api.free_dest_info(info);
            self.api.free_destination(dest);
            debug!(printer = %self.printer_name, "destination released");
        }
    }
}

impl<A: CupsApi> PrintSession for CupsSession<A> {
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
        info!(printer = %self.printer_name, title = %self.options.doc_info.name, "starting document print");

        let payload = self.options.encoding.encode(text);
        let outcome = spool_to_temp_file(&payload).and_then(|file| {
            debug!(path = %file.path().display(), bytes = payload.len(), "ticket staged");
            let submitted = self
                .api
                .print_file(&handle.dest, file.path(), &self.options.doc_info.name)
                .map_err(PrintError::Submission);
            if let Err(e) = file.close() {
                warn!(error = %e, "could not remove temporary ticket file");
            }
            submitted
        });

        match outcome {
            Ok(job_id) => {
                self.state = SessionState::Ready;
                info!(printer = %self.printer_name, %job_id, "print job sent");
                Ok(PrintReceipt {
                    printer: self.printer_name.clone(),
                    job_id,
                    bytes: payload.len() as u64,
                    submitted_at: Utc::now(),
                })
            }
            Err(err) => {
                error!(printer = %self.printer_name, error = %err, "print job failed");
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

impl<A: CupsApi> Drop for CupsSession<A> {
    fn drop(&mut self) {
        self.release();
    }
}

fn spool_to_temp_file(payload: &[u8]) -> Result<tempfile::NamedTempFile> {
    let mut file = tempfile::Builder::new()
        .prefix("ticketprint-")
        .suffix(".txt")
        .tempfile()
        .map_err(PrintError::TempFile)?;
    file.write_all(payload).map_err(PrintError::TempFile)?;
    file.flush().map_err(PrintError::TempFile)?;
    Ok(file)
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::path::{Path, PathBuf};
    use std::rc::Rc;

    use ticketprint_core::error::OsError;
    use ticketprint_core::types::{DocInfo, JobId, TextEncoding};

    use super::*;

    #[derive(Default)]
    struct Service {
        log: Vec<String>,
        live_dests: i32,
        live_infos: i32,
        submitted: Vec<(PathBuf, String, Vec<u8>)>,
        next_job: u32,
    }

    /// In-memory print service with one known destination.
    #[derive(Clone, Default)]
    struct FakeCups {
        service: Rc<RefCell<Service>>,
        no_info: bool,
        reject_with: Option<&'static str>,
    }

    impl FakeCups {
        fn live(&self) -> (i32, i32) {
            let s = self.service.borrow();
            (s.live_dests, s.live_infos)
        }

        fn log(&self) -> Vec<String> {
            self.service.borrow().log.clone()
        }
    }

    impl CupsApi for FakeCups {
        type Destination = String;
        type DestInfo = ();

        fn find_destination(&self, name: &str) -> std::result::Result<String, OsError> {
            let mut s = self.service.borrow_mut();
            s.log.push(format!("find {name}"));
            if name != "hp_LaserJet_1320" {
                return Err(OsError::new("cupsGetDest", 0, "destination not found"));
            }
            s.live_dests += 1;
            Ok(name.to_string())
        }

        fn copy_dest_info(&self, _dest: &String) -> Option<()> {
            let mut s = self.service.borrow_mut();
            s.log.push("info".into());
            if self.no_info {
                return None;
            }
            s.live_infos += 1;
            Some(())
        }

        fn print_file(
            &self,
            dest: &String,
            path: &Path,
            title: &str,
        ) -> std::result::Result<JobId, OsError> {
            let contents = std::fs::read(path).expect("staged file must exist during submission");
            let mut s = self.service.borrow_mut();
            s.log.push(format!("print {dest}"));
            if let Some(reason) = self.reject_with {
                return Err(OsError::new("cupsPrintFile", 1280, reason));
            }
            s.submitted.push((path.to_path_buf(), title.to_string(), contents));
            s.next_job += 1;
            Ok(JobId(s.next_job))
        }

        fn free_dest_info(&self, _info: ()) {
            let mut s = self.service.borrow_mut();
            s.log.push("free info".into());
            s.live_infos -= 1;
        }

        fn free_destination(&self, dest: String) {
            let mut s = self.service.borrow_mut();
            s.log.push(format!("free {dest}"));
            s.live_dests -= 1;
        }
    }

    fn utf8_options() -> JobOptions {
        JobOptions {
            doc_info: DocInfo::default(),
            encoding: TextEncoding::Utf8,
        }
    }

    const TICKET: &str = "This is a test ticket.\nThank you for your purchase!";

    #[test]
    fn unknown_destination_fails_without_submission() {
        let fake = FakeCups::default();
        let mut session = CupsSession::open(fake.clone(), "NoSuchPrinter", utf8_options());

        assert_eq!(session.state(), SessionState::Failed);
        assert!(matches!(session.open_error(), Some(PrintError::HandleAcquisition { .. })));
        assert!(matches!(session.print("x"), Err(PrintError::InvalidHandle)));
        assert_eq!(fake.log(), vec!["find NoSuchPrinter".to_string()]);
    }

    #[test]
    fn missing_dest_info_releases_destination() {
        let fake = FakeCups {
            no_info: true,
            ..Default::default()
        };
        let mut session = CupsSession::open(fake.clone(), "hp_LaserJet_1320", utf8_options());

        assert!(matches!(
            session.open_error(),
            Some(PrintError::DestinationInfo { printer }) if printer == "hp_LaserJet_1320"
        ));
        assert_eq!(fake.live(), (0, 0));
        assert!(matches!(session.print(TICKET), Err(PrintError::InvalidHandle)));
    }

    #[test]
    fn ticket_is_submitted_as_a_file() {
        let fake = FakeCups::default();
        let mut session = CupsSession::open(fake.clone(), "hp_LaserJet_1320", utf8_options());

        let receipt = session.print(TICKET).unwrap();
        assert_eq!(receipt.job_id, JobId(1));
        assert_eq!(receipt.bytes, TICKET.len() as u64);
        assert_eq!(session.state(), SessionState::Ready);

        let service = fake.service.borrow();
        let (path, title, contents) = &service.submitted[0];
        assert_eq!(title, "Ticket");
        assert_eq!(contents.as_slice(), TICKET.as_bytes());
        assert!(!path.exists(), "temporary file must be removed after submission");
    }

    #[test]
    fn rejected_job_relays_service_text() {
        let fake = FakeCups {
            reject_with: Some("Printer \"hp_LaserJet_1320\" is offline."),
            ..Default::default()
        };
        let mut session = CupsSession::open(fake.clone(), "hp_LaserJet_1320", utf8_options());

        let err = session.print(TICKET).unwrap_err();
        match &err {
            PrintError::Submission(os) => {
                assert_eq!(os.message, "Printer \"hp_LaserJet_1320\" is offline.");
                assert_eq!(os.code, 1280);
            }
            other => panic!("expected submission failure, got {other:?}"),
        }
        assert_eq!(session.state(), SessionState::Failed);
        assert_eq!(fake.live(), (0, 0));
        assert!(matches!(session.print(TICKET), Err(PrintError::InvalidHandle)));
    }

    #[test]
    fn drop_frees_info_then_destination() {
        let fake = FakeCups::default();
        let session = CupsSession::open(fake.clone(), "hp_LaserJet_1320", utf8_options());
        assert_eq!(fake.live(), (1, 1));
        drop(session);

        assert_eq!(fake.live(), (0, 0));
        let log = fake.log();
        assert_eq!(log[log.len() - 2..].to_vec(), vec!["free info", "free hp_LaserJet_1320"]);
    }

    #[test]
    fn close_twice_frees_once() {
        let fake = FakeCups::default();
        let mut session = CupsSession::open(fake.clone(), "hp_LaserJet_1320", utf8_options());
        session.close();
        session.close();
        drop(session);

        let frees = fake.log().iter().filter(|l| l.starts_with("free ")).count();
        assert_eq!(frees, 2); // one info, one destination
        assert_eq!(fake.live(), (0, 0));
    }

    #[test]
    fn utf16_opt_in_stages_wide_bytes() {
        let fake = FakeCups::default();
        let options = JobOptions {
            encoding: TextEncoding::Utf16Le,
            ..utf8_options()
        };
        let mut session = CupsSession::open(fake.clone(), "hp_LaserJet_1320", options);
        session.print("ok").unwrap();
        assert_eq!(fake.service.borrow().submitted[0].2, vec![b'o', 0, b'k', 0]);
    }
}
