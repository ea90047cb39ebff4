// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for printer sessions.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Job identifier assigned by the printing subsystem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JobId(pub u32);

impl std::fmt::Display for JobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle states of a printer session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionState {
    /// Constructed, acquisition not yet attempted.
    Unopened,
    /// Acquiring the printer handle / destination.
    Opening,
    /// Handle held, ready to accept a job.
    Ready,
    /// A job is being submitted.
    Printing,
    /// Acquisition or a print failed; the handle has been released.
    Failed,
    /// Explicitly closed by the owner.
    Closed,
}

/// How ticket text becomes payload bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TextEncoding {
    /// UTF-16 little-endian code units, the native wide-string layout on Windows.
    Utf16Le,
    Utf8,
}

impl TextEncoding {
    /// Encoding the host platform's string type uses natively.
    pub fn platform_default() -> Self {
        if cfg!(windows) {
            Self::Utf16Le
        } else {
            Self::Utf8
        }
    }

    pub fn encode(&self, text: &str) -> Vec<u8> {
        match self {
            Self::Utf16Le => text.encode_utf16().flat_map(u16::to_le_bytes).collect(),
            Self::Utf8 => text.as_bytes().to_vec(),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Utf16Le => "utf16le",
            Self::Utf8 => "utf8",
        }
    }
}

impl FromStr for TextEncoding {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('-', "").as_str() {
            "utf16le" | "utf16" => Ok(Self::Utf16Le),
            "utf8" => Ok(Self::Utf8),
            other => Err(format!("unknown encoding '{other}' (expected utf16le or utf8)")),
        }
    }
}

/// Spooler document metadata (`DOC_INFO_1`). The name doubles as the CUPS job title.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocInfo {
    pub name: String,
    /// Spooler data type, e.g. `RAW` to bypass the driver.
    pub datatype: String,
}

impl Default for DocInfo {
    fn default() -> Self {
        Self {
            name: "Ticket".into(),
            datatype: "RAW".into(),
        }
    }
}

/// Per-session job options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobOptions {
    pub doc_info: DocInfo,
    pub encoding: TextEncoding,
}

impl Default for JobOptions {
    fn default() -> Self {
        Self {
            doc_info: DocInfo::default(),
            encoding: TextEncoding::platform_default(),
        }
    }
}

/// What a successful `print` reports back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrintReceipt {
    pub printer: String,
    pub job_id: JobId,
    /// Payload bytes handed to the subsystem.
    pub bytes: u64,
    pub submitted_at: DateTime<Utc>,
}
