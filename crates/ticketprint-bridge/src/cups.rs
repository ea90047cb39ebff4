// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// libcups binding.
//
// The library is opened at runtime with dlopen rather than linked, so the
// binary starts (and reports a clean `HandleAcquisition` failure) on hosts
// without CUPS installed. Only the handful of destination/job calls the
// session needs are resolved.
//
// libcups is loaded at most once per process and never unloaded: it keeps
// per-thread state whose destructors run at thread exit, after any dlclose
// would have unmapped them.

use std::ffi::{CStr, CString, c_char, c_int, c_void};
use std::os::unix::ffi::OsStrExt;
use std::path::Path;
use std::ptr;
use std::sync::OnceLock;

use tracing::{debug, warn};

use ticketprint_core::error::OsError;
use ticketprint_core::types::JobId;
use ticketprint_spool::CupsApi;

// ── C layout ──────────────────────────────────────────────────────────────────

#[repr(C)]
#[allow(non_camel_case_types, dead_code)]
struct cups_option_t {
    name: *mut c_char,
    value: *mut c_char,
}

#[repr(C)]
#[allow(non_camel_case_types, dead_code)]
struct cups_dest_t {
    name: *mut c_char,
    instance: *mut c_char,
    is_default: c_int,
    num_options: c_int,
    options: *mut cups_option_t,
}

type GetDestsFn = unsafe extern "C" fn(*mut *mut cups_dest_t) -> c_int;
type GetDestFn =
    unsafe extern "C" fn(*const c_char, *const c_char, c_int, *mut cups_dest_t) -> *mut cups_dest_t;
type CopyDestFn = unsafe extern "C" fn(*mut cups_dest_t, c_int, *mut *mut cups_dest_t) -> c_int;
type FreeDestsFn = unsafe extern "C" fn(c_int, *mut cups_dest_t);
// First argument is `http_t *`; null selects CUPS_HTTP_DEFAULT.
type CopyDestInfoFn = unsafe extern "C" fn(*mut c_void, *mut cups_dest_t) -> *mut c_void;
type FreeDestInfoFn = unsafe extern "C" fn(*mut c_void);
type PrintFileFn = unsafe extern "C" fn(
    *const c_char,
    *const c_char,
    *const c_char,
    c_int,
    *mut cups_option_t,
) -> c_int;
type LastErrorFn = unsafe extern "C" fn() -> c_int;
type LastErrorStringFn = unsafe extern "C" fn() -> *const c_char;

#[cfg(target_os = "macos")]
const LIBRARY_NAMES: &[&CStr] = &[c"libcups.2.dylib", c"/usr/lib/libcups.2.dylib"];
#[cfg(not(target_os = "macos"))]
const LIBRARY_NAMES: &[&CStr] = &[c"libcups.so.2", c"libcups.so"];

// ── Loaded library ────────────────────────────────────────────────────────────

/// Process-wide libcups. Initialised on first use, never freed.
static LIBCUPS: OnceLock<Result<Symbols, String>> = OnceLock::new();

struct Symbols {
    get_dests: GetDestsFn,
    get_dest: GetDestFn,
    copy_dest: CopyDestFn,
    free_dests: FreeDestsFn,
    copy_dest_info: CopyDestInfoFn,
    free_dest_info: FreeDestInfoFn,
    print_file: PrintFileFn,
    last_error: LastErrorFn,
    last_error_string: LastErrorStringFn,
}

impl Symbols {
    fn shared() -> Result<&'static Self, String> {
        LIBCUPS
            .get_or_init(|| {
                let loaded = Self::load();
                if let Err(e) = &loaded {
                    warn!(error = %e, "CUPS unavailable");
                }
                loaded
            })
            .as_ref()
            .map_err(|e| e.clone())
    }

    fn load() -> Result<Self, String> {
        let mut last_failure = String::from("no candidate library names");
        for name in LIBRARY_NAMES {
            // SAFETY: `name` is a NUL-terminated literal; the flags are valid
            // dlopen modes.
            let lib = unsafe { libc::dlopen(name.as_ptr(), libc::RTLD_NOW | libc::RTLD_LOCAL) };
            if lib.is_null() {
                last_failure = dlerror_string();
                continue;
            }

            // SAFETY: `lib` is a live handle returned by dlopen above.
            return match unsafe { Self::resolve(lib) } {
                Ok(symbols) => {
                    debug!(library = %name.to_string_lossy(), "libcups loaded");
                    Ok(symbols)
                }
                // `lib` stays open: libcups' initialisers have already run.
                Err(e) => Err(e),
            };
        }
        Err(format!("libcups could not be loaded: {last_failure}"))
    }

    /// # Safety
    ///
    /// `lib` must be a live dlopen handle for libcups 2.x, whose exported
    /// signatures match the function pointer types above.
    unsafe fn resolve(lib: *mut c_void) -> Result<Self, String> {
        // SAFETY: forwarded from the caller.
        unsafe {
            Ok(Self {
                get_dests: symbol(lib, c"cupsGetDests")?,
                get_dest: symbol(lib, c"cupsGetDest")?,
                copy_dest: symbol(lib, c"cupsCopyDest")?,
                free_dests: symbol(lib, c"cupsFreeDests")?,
                copy_dest_info: symbol(lib, c"cupsCopyDestInfo")?,
                free_dest_info: symbol(lib, c"cupsFreeDestInfo")?,
                print_file: symbol(lib, c"cupsPrintFile")?,
                last_error: symbol(lib, c"cupsLastError")?,
                last_error_string: symbol(lib, c"cupsLastErrorString")?,
            })
        }
    }
}

/// # Safety
///
/// `T` must be an `extern "C"` function pointer type matching the symbol.
unsafe fn symbol<T: Copy>(lib: *mut c_void, name: &CStr) -> Result<T, String> {
    // SAFETY: `lib` is live (caller contract) and `name` is NUL-terminated.
    let ptr = unsafe { libc::dlsym(lib, name.as_ptr()) };
    if ptr.is_null() {
        return Err(format!(
            "symbol {} missing from libcups: {}",
            name.to_string_lossy(),
            dlerror_string()
        ));
    }
    // SAFETY: function pointers and data pointers share a representation on
    // every platform CUPS supports; `T` matches the symbol per caller contract.
    Ok(unsafe { std::mem::transmute_copy::<*mut c_void, T>(&ptr) })
}

fn dlerror_string() -> String {
    // SAFETY: dlerror returns null or a NUL-terminated thread-local string.
    unsafe {
        let msg = libc::dlerror();
        if msg.is_null() {
            "unknown dynamic loader error".into()
        } else {
            CStr::from_ptr(msg).to_string_lossy().into_owned()
        }
    }
}

// ── Public binding ────────────────────────────────────────────────────────────

/// An owned single-entry destination list (from `cupsCopyDest`).
pub struct CupsDestination {
    list: *mut cups_dest_t,
    count: c_int,
}

/// Opaque `cups_dinfo_t *`.
pub struct CupsDestInfo(*mut c_void);

/// `CupsApi` over the host's libcups.
pub struct LibCups {
    symbols: Result<&'static Symbols, String>,
}

impl LibCups {
    /// Bind to the process-wide libcups, loading it on first use. A missing
    /// library is not an error here; it surfaces as a lookup failure when the
    /// session opens.
    pub fn load() -> Self {
        Self {
            symbols: Symbols::shared(),
        }
    }

    fn symbols(&self) -> Result<&'static Symbols, OsError> {
        self.symbols
            .clone()
            .map_err(OsError::library_unavailable)
    }

    fn last_error(&self, symbols: &Symbols, function: &'static str) -> OsError {
        // SAFETY: both calls read libcups' thread-local last-error state.
        unsafe {
            let code = (symbols.last_error)();
            let text = (symbols.last_error_string)();
            let message = if text.is_null() {
                "unknown error".to_string()
            } else {
                CStr::from_ptr(text).to_string_lossy().into_owned()
            };
            OsError::new(function, code as u32, message)
        }
    }
}

fn c_string(function: &'static str, value: &[u8]) -> Result<CString, OsError> {
    CString::new(value).map_err(|_| OsError::new(function, 0, "argument contains a NUL byte"))
}

impl CupsApi for LibCups {
    type Destination = CupsDestination;
    type DestInfo = CupsDestInfo;

    fn find_destination(&self, name: &str) -> Result<CupsDestination, OsError> {
        let symbols = self.symbols()?;
        let (queue, instance) = match name.split_once('/') {
            Some((queue, instance)) => (queue, Some(instance)),
            None => (name, None),
        };
        let queue_c = c_string("cupsGetDest", queue.as_bytes())?;
        let instance_c = instance
            .map(|i| c_string("cupsGetDest", i.as_bytes()))
            .transpose()?;

        // SAFETY: every pointer handed to libcups is either null or a live
        // NUL-terminated string; the enumerated list is freed exactly once,
        // after the match has been copied out of it.
        unsafe {
            let mut dests: *mut cups_dest_t = ptr::null_mut();
            let count = (symbols.get_dests)(&mut dests);
            let found = (symbols.get_dest)(
                queue_c.as_ptr(),
                instance_c.as_ref().map_or(ptr::null(), |i| i.as_ptr()),
                count,
                dests,
            );
            if found.is_null() {
                (symbols.free_dests)(count, dests);
                return Err(OsError::new(
                    "cupsGetDest",
                    0,
                    format!("no destination named {name} ({count} known)"),
                ));
            }

            let mut owned: *mut cups_dest_t = ptr::null_mut();
            let owned_count = (symbols.copy_dest)(found, 0, &mut owned);
            (symbols.free_dests)(count, dests);
            if owned.is_null() || owned_count < 1 {
                return Err(self.last_error(symbols, "cupsCopyDest"));
            }
            Ok(CupsDestination {
                list: owned,
                count: owned_count,
            })
        }
    }

    fn copy_dest_info(&self, dest: &CupsDestination) -> Option<CupsDestInfo> {
        let symbols = self.symbols().ok()?;
        // SAFETY: `dest.list` is a live list owned by `dest`.
        let info = unsafe { (symbols.copy_dest_info)(ptr::null_mut(), dest.list) };
        (!info.is_null()).then_some(CupsDestInfo(info))
    }

    fn print_file(&self, dest: &CupsDestination, path: &Path, title: &str) -> Result<JobId, OsError> {
        let symbols = self.symbols()?;
        let path_c = c_string("cupsPrintFile", path.as_os_str().as_bytes())?;
        let title_c = c_string("cupsPrintFile", title.as_bytes())?;

        // SAFETY: `dest.list` points at one initialised cups_dest_t owned by
        // `dest`; its name and option array stay valid for the call.
        let job = unsafe {
            let d = &*dest.list;
            (symbols.print_file)(d.name, path_c.as_ptr(), title_c.as_ptr(), d.num_options, d.options)
        };

        if job <= 0 {
            Err(self.last_error(symbols, "cupsPrintFile"))
        } else {
            Ok(JobId(job as u32))
        }
    }

    fn free_dest_info(&self, info: CupsDestInfo) {
        if let Ok(symbols) = self.symbols() {
            // SAFETY: `info` came from cupsCopyDestInfo and is consumed here.
            unsafe { (symbols.free_dest_info)(info.0) };
        }
    }

    fn free_destination(&self, dest: CupsDestination) {
        if let Ok(symbols) = self.symbols() {
            // SAFETY: `dest` came from cupsCopyDest and is consumed here.
            unsafe { (symbols.free_dests)(dest.count, dest.list) };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn without_library() -> LibCups {
        LibCups {
            symbols: Err("libcups could not be loaded: libcups.so.2: cannot open shared object file".into()),
        }
    }

    #[test]
    fn missing_library_is_reported_as_unavailable() {
        let err = without_library().find_destination("hp_LaserJet_1320").err().unwrap();
        assert!(err.is_library_unavailable());
        assert!(err.message.contains("cannot open shared object file"));
    }

    #[test]
    fn shared_library_is_loaded_once() {
        let first = LibCups::load();
        let second = LibCups::load();
        match (first.symbols, second.symbols) {
            (Ok(a), Ok(b)) => assert!(std::ptr::eq(a, b)),
            (Err(a), Err(b)) => assert_eq!(a, b),
            _ => panic!("libcups load outcome changed between calls"),
        }
    }
}
