// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// ticketprint — send one text ticket to one printer.
//
// Entry point. Initialises logging, builds the ticket configuration from the
// command line, opens the platform printer, prints, and reports. The exit
// status is 0 whether or not the ticket printed; the outcome is on the
// console.

mod cli;

use std::io::{self, Write};

use clap::Parser;

use ticketprint_core::PrintError;
use ticketprint_core::human_errors::{Severity, humanize_error};
use ticketprint_core::types::PrintReceipt;
use ticketprint_spool::PrintSession;

use cli::Cli;

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .init();

    tracing::info!(platform = ticketprint_bridge::platform_name(), "ticketprint starting");

    if let Err(e) = run(cli, &mut io::stdout().lock(), &mut io::stderr().lock()) {
        tracing::error!(error = %e, "could not write status line");
    }
}

/// One print attempt. The success status goes to `out`, the failure status
/// to `err`. Only console write failures are returned.
fn run(cli: Cli, out: &mut impl Write, err: &mut impl Write) -> io::Result<()> {
    let config = match cli.into_config() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "could not build ticket configuration");
            return write_lines(err, &failure_lines(&e));
        }
    };

    tracing::debug!(
        printer = %config.printer_name,
        document = %config.document_name,
        encoding = config.encoding.as_str(),
        "ticket configured"
    );

    let mut printer = ticketprint_bridge::open_printer(&config.printer_name, config.job_options());
    match printer.print(&config.ticket_text) {
        Ok(receipt) => {
            tracing::info!(
                printer = printer.printer_name(),
                bytes = receipt.bytes,
                submitted_at = %receipt.submitted_at,
                "ticket submitted"
            );
            write_lines(out, &success_lines(&receipt))
        }
        Err(print_err) => {
            let cause = failure_cause(&print_err, printer.open_error());
            write_lines(err, &failure_lines(cause))
        }
    }
}

/// A print on an unopened session only says "invalid handle"; the open
/// failure is the useful explanation.
fn failure_cause<'a>(err: &'a PrintError, open_error: Option<&'a PrintError>) -> &'a PrintError {
    match (err, open_error) {
        (PrintError::InvalidHandle, Some(open_err)) => open_err,
        _ => err,
    }
}

fn success_lines(receipt: &PrintReceipt) -> [String; 2] {
    [
        format!("Print job sent with ID: {}", receipt.job_id),
        "Ticket printed successfully.".to_string(),
    ]
}

fn failure_lines(err: &PrintError) -> [String; 2] {
    let human = humanize_error(err);
    match human.severity {
        Severity::Transient => tracing::warn!(error = %err, "print failed; retrying may help"),
        Severity::ActionRequired | Severity::Permanent => {
            tracing::error!(error = %err, severity = ?human.severity, "print failed")
        }
    }
    [
        "Failed to print ticket.".to_string(),
        format!("  {} {}", human.message, human.suggestion),
    ]
}

fn write_lines(w: &mut impl Write, lines: &[String]) -> io::Result<()> {
    for line in lines {
        writeln!(w, "{line}")?;
    }
    w.flush()
}
