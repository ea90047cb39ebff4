// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// ticketprint Spool — printer session lifecycle for the two native job
// models: the Windows spooler's raw byte stream and the CUPS file submission.
// Sessions are generic over a narrow capability trait; the FFI that
// implements those traits lives in `ticketprint-bridge`.

#![forbid(unsafe_code)]

pub mod cups;
pub mod spooler;
pub mod traits;

pub use cups::CupsSession;
pub use spooler::SpoolerSession;
pub use traits::{CupsApi, PrintSession, SpoolerApi};
