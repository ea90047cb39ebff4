// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Ticket configuration.

use serde::{Deserialize, Serialize};

use crate::types::{DocInfo, JobOptions, TextEncoding};

#[cfg(windows)]
const DEFAULT_PRINTER: &str = "hp LaserJet 1320 PCL 5";
#[cfg(not(windows))]
const DEFAULT_PRINTER: &str = "hp_LaserJet_1320";

const DEFAULT_TICKET: &str = "This is a test ticket.\nThank you for your purchase!";

/// Everything one run needs: where to print and what.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketConfig {
    /// Spooler queue name (Windows) or CUPS destination name (Unix).
    pub printer_name: String,
    /// Full content of the single print job.
    pub ticket_text: String,
    /// Spooler document name / CUPS job title.
    pub document_name: String,
    /// Spooler data type. Ignored by CUPS.
    pub datatype: String,
    pub encoding: TextEncoding,
}

impl Default for TicketConfig {
    fn default() -> Self {
        let doc = DocInfo::default();
        Self {
            printer_name: DEFAULT_PRINTER.into(),
            ticket_text: DEFAULT_TICKET.into(),
            document_name: doc.name,
            datatype: doc.datatype,
            encoding: TextEncoding::platform_default(),
        }
    }
}

impl TicketConfig {
    pub fn job_options(&self) -> JobOptions {
        JobOptions {
            doc_info: DocInfo {
                name: self.document_name.clone(),
                datatype: self.datatype.clone(),
            },
            encoding: self.encoding,
        }
    }
}
