// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// winspool binding.
//
// Thin wrappers over the spooler API. Each call maps its failure to an
// `OsError` carrying the function name, the Win32 error code, and the
// system-formatted message.

use windows::Win32::Foundation::BOOL;
use windows::Win32::Graphics::Printing::{
    ClosePrinter, DOC_INFO_1W, EndDocPrinter, EndPagePrinter, OpenPrinterW, PRINTER_HANDLE,
    StartDocPrinterW, StartPagePrinter, WritePrinter,
};
use windows::core::{Error as WinError, HSTRING, PWSTR};

use ticketprint_core::error::OsError;
use ticketprint_core::types::DocInfo;
use ticketprint_spool::SpoolerApi;

/// `SpoolerApi` over the local print spooler.
pub struct Win32Spooler;

/// Spooler entry points surface failure either as a raw `BOOL` or as a
/// `windows::core::Result`, depending on metadata; both become `OsError`.
trait Win32Outcome {
    fn check(self, function: &'static str) -> Result<(), OsError>;
}

impl Win32Outcome for BOOL {
    fn check(self, function: &'static str) -> Result<(), OsError> {
        if self.as_bool() {
            Ok(())
        } else {
            Err(last_os_error(function))
        }
    }
}

impl Win32Outcome for windows::core::Result<()> {
    fn check(self, function: &'static str) -> Result<(), OsError> {
        self.map_err(|e| os_error(function, &e))
    }
}

fn last_os_error(function: &'static str) -> OsError {
    os_error(function, &WinError::from_win32())
}

fn os_error(function: &'static str, e: &WinError) -> OsError {
    let hresult = e.code().0 as u32;
    // Win32 codes arrive wrapped as HRESULT_FROM_WIN32 (0x8007xxxx).
    let code = if hresult & 0xFFFF_0000 == 0x8007_0000 {
        hresult & 0xFFFF
    } else {
        hresult
    };
    OsError::new(function, code, e.message().to_string().trim_end())
}

/// NUL-terminated UTF-16 copy of `s`.
fn wide(s: &str) -> Vec<u16> {
    s.encode_utf16().chain(std::iter::once(0)).collect()
}

impl SpoolerApi for Win32Spooler {
    type Handle = PRINTER_HANDLE;

    fn open_printer(&self, name: &str) -> Result<PRINTER_HANDLE, OsError> {
        let name = HSTRING::from(name);
        let mut handle = PRINTER_HANDLE::default();
        // SAFETY: `name` outlives the call; `handle` is a valid out-pointer.
        unsafe { OpenPrinterW(&name, &mut handle, None) }.check("OpenPrinterW")?;
        Ok(handle)
    }

    fn start_doc(&self, handle: &PRINTER_HANDLE, doc: &DocInfo) -> Result<u32, OsError> {
        let mut doc_name = wide(&doc.name);
        let mut datatype = wide(&doc.datatype);
        let info = DOC_INFO_1W {
            pDocName: PWSTR(doc_name.as_mut_ptr()),
            pOutputFile: PWSTR::null(),
            pDatatype: PWSTR(datatype.as_mut_ptr()),
        };
        // SAFETY: `info` and the buffers it points at outlive the call.
        let job = unsafe { StartDocPrinterW(*handle, 1, &info) };
        if job == 0 {
            Err(last_os_error("StartDocPrinterW"))
        } else {
            Ok(job)
        }
    }

    fn start_page(&self, handle: &PRINTER_HANDLE) -> Result<(), OsError> {
        // SAFETY: `handle` is an open printer handle owned by the session.
        unsafe { StartPagePrinter(*handle) }.check("StartPagePrinter")
    }

    fn write(&self, handle: &PRINTER_HANDLE, bytes: &[u8]) -> Result<usize, OsError> {
        let len = u32::try_from(bytes.len())
            .map_err(|_| OsError::new("WritePrinter", 0, "document larger than 4 GiB"))?;
        let mut written = 0u32;
        // SAFETY: `bytes` is valid for `len` bytes; `written` is a valid out-pointer.
        unsafe { WritePrinter(*handle, bytes.as_ptr().cast(), len, &mut written) }
            .check("WritePrinter")?;
        Ok(written as usize)
    }

    fn end_page(&self, handle: &PRINTER_HANDLE) -> Result<(), OsError> {
        // SAFETY: as for `start_page`.
        unsafe { EndPagePrinter(*handle) }.check("EndPagePrinter")
    }

    fn end_doc(&self, handle: &PRINTER_HANDLE) -> Result<(), OsError> {
        // SAFETY: as for `start_page`.
        unsafe { EndDocPrinter(*handle) }.check("EndDocPrinter")
    }

    fn close_printer(&self, handle: PRINTER_HANDLE) -> Result<(), OsError> {
        // SAFETY: the session hands each handle to `close_printer` exactly once.
        unsafe { ClosePrinter(handle) }.check("ClosePrinter")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wide_strings_are_nul_terminated() {
        assert_eq!(wide("RAW"), vec![b'R' as u16, b'A' as u16, b'W' as u16, 0]);
    }

    #[test]
    fn unknown_queue_reports_win32_error() {
        let err = Win32Spooler
            .open_printer("ticketprint-no-such-queue")
            .unwrap_err();
        assert_eq!(err.function, "OpenPrinterW");
        assert_ne!(err.code, 0);
    }
}
