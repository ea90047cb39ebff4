// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Plain-language explanations for print failures.
//
// The final status line of a run is written for whoever is standing at the
// till, not for whoever wrote the driver. Each error maps to a short message
// and one thing to try.

use crate::error::PrintError;

/// Severity of an error from the operator's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Printer busy or briefly unreachable; running again may work.
    Transient,
    /// Someone must do something (turn the printer on, fix the name).
    ActionRequired,
    /// Running again will not help.
    Permanent,
}

/// A failure restated for a human.
#[derive(Debug, Clone)]
pub struct HumanError {
    pub message: String,
    pub suggestion: String,
    pub severity: Severity,
}

/// Explain a `PrintError` in plain words.
pub fn humanize_error(err: &PrintError) -> HumanError {
    match err {
        PrintError::HandleAcquisition { source, .. } if source.is_library_unavailable() => HumanError {
            message: "The system print service isn't installed.".into(),
            suggestion: "Install CUPS (the libcups2 package on most Linux systems) and run again.".into(),
            severity: Severity::Permanent,
        },

        PrintError::HandleAcquisition { printer, .. } => HumanError {
            message: format!("We couldn't find the printer \"{printer}\"."),
            suggestion: "Check the printer name matches the one in your system's printer list exactly, including spaces and capitals.".into(),
            severity: Severity::ActionRequired,
        },

        PrintError::InvalidHandle => HumanError {
            message: "The printer isn't connected.".into(),
            suggestion: "The printer could not be opened earlier. Fix the problem reported above and run again.".into(),
            severity: Severity::ActionRequired,
        },

        PrintError::JobStart(_) | PrintError::PageStart(_) => HumanError {
            message: "The printer wouldn't accept the ticket.".into(),
            suggestion: "Make sure the printer is switched on, online, and not paused in the print queue.".into(),
            severity: Severity::Transient,
        },

        PrintError::Write(_) => HumanError {
            message: "The ticket was only partly sent to the printer.".into(),
            suggestion: "Check the cable or network connection, then cancel any stuck job in the queue and run again.".into(),
            severity: Severity::Transient,
        },

        PrintError::JobEnd(_) => HumanError {
            message: "The printer didn't confirm the end of the ticket.".into(),
            suggestion: "The ticket may still print. Check the print queue before printing again, to avoid duplicates.".into(),
            severity: Severity::Transient,
        },

        PrintError::DestinationInfo { .. } => HumanError {
            message: "The print service couldn't describe this printer.".into(),
            suggestion: "The printer may be offline or its driver may be missing. Check it in your system's printer settings.".into(),
            severity: Severity::ActionRequired,
        },

        PrintError::TempFile(_) => HumanError {
            message: "There was a problem preparing the ticket.".into(),
            suggestion: "Your temporary folder may be full or read-only. Free some space and try again.".into(),
            severity: Severity::Transient,
        },

        PrintError::Submission(os) => humanize_submission(&os.message),

        PrintError::Io(io_err) => {
            if io_err.kind() == std::io::ErrorKind::NotFound {
                HumanError {
                    message: "The ticket file couldn't be found.".into(),
                    suggestion: "Check the path and try again.".into(),
                    severity: Severity::ActionRequired,
                }
            } else {
                HumanError {
                    message: "There was a problem reading a file.".into(),
                    suggestion: "Check the file permissions and try again.".into(),
                    severity: Severity::ActionRequired,
                }
            }
        }

        PrintError::PlatformUnavailable => HumanError {
            message: "Printing isn't supported on this system.".into(),
            suggestion: "Run ticketprint on Windows, Linux, or macOS.".into(),
            severity: Severity::Permanent,
        },
    }
}

/// CUPS reports submission failures as free text; pick out the usual suspects.
fn humanize_submission(detail: &str) -> HumanError {
    let lower = detail.to_ascii_lowercase();

    if lower.contains("not accepting") || lower.contains("stopped") || lower.contains("paused") {
        HumanError {
            message: "The printer is paused and isn't taking new jobs.".into(),
            suggestion: "Resume the printer in your system's printer settings, then run again.".into(),
            severity: Severity::ActionRequired,
        }
    } else if lower.contains("forbidden") || lower.contains("not authorized") || lower.contains("unauthorized") {
        HumanError {
            message: "You aren't allowed to print to this printer.".into(),
            suggestion: "Ask whoever manages the printer to give your account access.".into(),
            severity: Severity::Permanent,
        }
    } else if lower.contains("not found") || lower.contains("does not exist") {
        HumanError {
            message: "The printer has disappeared from the print service.".into(),
            suggestion: "It may have been removed or renamed. Check your system's printer list.".into(),
            severity: Severity::ActionRequired,
        }
    } else {
        HumanError {
            message: "The print service refused the ticket.".into(),
            suggestion: format!("Check the printer is online and try again. (Detail: {detail})"),
            severity: Severity::Transient,
        }
    }
}
