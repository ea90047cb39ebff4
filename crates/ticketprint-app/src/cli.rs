// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Command-line surface. Every flag is optional; anything left out keeps the
// built-in ticket defaults.

use std::path::PathBuf;

use clap::Parser;

use ticketprint_core::TicketConfig;
use ticketprint_core::error::Result;
use ticketprint_core::types::TextEncoding;

/// Send a text ticket to a printer.
#[derive(Debug, Parser)]
#[command(name = "ticketprint", version, about)]
pub struct Cli {
    /// Print queue (Windows) or CUPS destination, optionally `name/instance` (Unix).
    pub printer: Option<String>,

    /// Ticket text, used verbatim.
    #[arg(long, conflicts_with = "text_file")]
    pub text: Option<String>,

    /// Read the ticket text from a file.
    #[arg(long, value_name = "PATH")]
    pub text_file: Option<PathBuf>,

    /// Spooler document name / CUPS job title.
    #[arg(long, value_name = "NAME")]
    pub document_name: Option<String>,

    /// Spooler data type (Windows only).
    #[arg(long, value_name = "TYPE")]
    pub datatype: Option<String>,

    /// Payload encoding: utf16le or utf8.
    #[arg(long, value_parser = parse_encoding)]
    pub encoding: Option<TextEncoding>,

    /// Log at debug level.
    #[arg(short, long)]
    pub verbose: bool,
}

fn parse_encoding(s: &str) -> std::result::Result<TextEncoding, String> {
    s.parse()
}

impl Cli {
    /// Layer the flags over `TicketConfig::default()`.
    pub fn into_config(self) -> Result<TicketConfig> {
        let mut config = TicketConfig::default();

        if let Some(printer) = self.printer {
            config.printer_name = printer;
        }
        if let Some(path) = &self.text_file {
            config.ticket_text = std::fs::read_to_string(path)?;
        } else if let Some(text) = self.text {
            config.ticket_text = text;
        }
        if let Some(name) = self.document_name {
            config.document_name = name;
        }
        if let Some(datatype) = self.datatype {
            config.datatype = datatype;
        }
        if let Some(encoding) = self.encoding {
            config.encoding = encoding;
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use ticketprint_core::PrintError;

    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("ticketprint").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn no_arguments_keeps_defaults() {
        let config = parse(&[]).into_config().unwrap();
        assert_eq!(config, TicketConfig::default());
    }

    #[test]
    fn flags_override_defaults() {
        let config = parse(&[
            "Kitchen",
            "--text",
            "Table 4",
            "--document-name",
            "Order",
            "--datatype",
            "TEXT",
            "--encoding",
            "utf8",
        ])
        .into_config()
        .unwrap();

        assert_eq!(config.printer_name, "Kitchen");
        assert_eq!(config.ticket_text, "Table 4");
        assert_eq!(config.document_name, "Order");
        assert_eq!(config.datatype, "TEXT");
        assert_eq!(config.encoding, TextEncoding::Utf8);
    }

    #[test]
    fn text_file_is_read() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "Line one\nLine two\n").unwrap();

        let path = file.path().to_str().unwrap().to_string();
        let config = parse(&["--text-file", &path]).into_config().unwrap();
        assert_eq!(config.ticket_text, "Line one\nLine two\n");
    }

    #[test]
    fn missing_text_file_is_an_io_error() {
        let err = parse(&["--text-file", "/nonexistent/ticket.txt"])
            .into_config()
            .unwrap_err();
        assert!(matches!(err, PrintError::Io(_)));
    }

    #[test]
    fn text_and_text_file_conflict() {
        let res = Cli::try_parse_from(["ticketprint", "--text", "a", "--text-file", "b"]);
        assert!(res.is_err());
    }

    #[test]
    fn unknown_encoding_is_rejected() {
        let res = Cli::try_parse_from(["ticketprint", "--encoding", "ebcdic"]);
        assert!(res.is_err());
    }
}
