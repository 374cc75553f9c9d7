//! C ABI for cache hosts
//!
//! Hosts written in C or C++ load the shared library, resolve the versioned
//! factory symbol `admit_get_decision_v1` and drive the returned handle
//! through the functions below. No Rust type crosses the boundary.

use std::cell::RefCell;
use std::ffi::{CStr, CString, c_char};
use std::ptr;

use admit_storage::LocalStorage;
use tracing::{Span, error, info_span};

use crate::decision::{Decision, get_decision};

thread_local! {
    static LAST_ERROR: RefCell<Option<CString>> = const { RefCell::new(None) };
}

fn set_last_error(msg: &str) {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = CString::new(msg).ok();
    });
}

/// Opaque handle to a decision object and the storage it decides for
pub struct AdmitDecision {
    decision: Box<dyn Decision>,
    storage: LocalStorage,
    span: Span,
}

/// Read a C string argument, recording an error for null or non-UTF-8 input
///
/// # Safety
/// `ptr` must be null or a valid null-terminated C string.
unsafe fn read_str<'a>(ptr: *const c_char, what: &str) -> Option<&'a str> {
    if ptr.is_null() {
        set_last_error(&format!("{} is null", what));
        return None;
    }

    // SAFETY: checked non-null above, caller guarantees null termination
    match unsafe { CStr::from_ptr(ptr) }.to_str() {
        Ok(s) => Some(s),
        Err(_) => {
            set_last_error(&format!("{} is not valid UTF-8", what));
            None
        }
    }
}

/// Get the last error message (thread-local)
///
/// Returns null when no error has been recorded on this thread. The pointer
/// is valid until the next failing call on the same thread.
#[unsafe(no_mangle)]
pub extern "C" fn admit_last_error() -> *const c_char {
    LAST_ERROR.with(|e| {
        e.borrow()
            .as_ref()
            .map(|s| s.as_ptr())
            .unwrap_or(ptr::null())
    })
}

/// Create a decision object.
///
/// `log_name` labels every diagnostic of the object; `storage_root` is the
/// directory of the host's disk cache. Returns null on failure; call
/// `admit_last_error()` for the reason.
///
/// # Safety
/// - Both arguments must be valid null-terminated C strings.
/// - The returned pointer must be freed with `admit_decision_free()`.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn admit_get_decision_v1(
    log_name: *const c_char,
    storage_root: *const c_char,
) -> *mut AdmitDecision {
    // SAFETY: forwarded caller guarantee
    let Some(log_name) = (unsafe { read_str(log_name, "log_name") }) else {
        return ptr::null_mut();
    };
    // SAFETY: forwarded caller guarantee
    let Some(storage_root) = (unsafe { read_str(storage_root, "storage_root") }) else {
        return ptr::null_mut();
    };

    let storage = match LocalStorage::new(storage_root) {
        Ok(storage) => storage,
        Err(e) => {
            set_last_error(&format!("failed to open storage: {}", e));
            return ptr::null_mut();
        }
    };

    let span = info_span!("decision", plugin = %log_name);
    let decision = get_decision(span.clone());
    Box::into_raw(Box::new(AdmitDecision {
        decision,
        storage,
        span,
    }))
}

/// Configure a decision object from its plugin parameter.
///
/// Returns 1 on success and 0 on failure. A failed configuration leaves
/// the object usable; it then caches everything.
///
/// # Safety
/// - `handle` must have been returned by `admit_get_decision_v1()`.
/// - `parameter` must be null or a valid null-terminated C string.
/// - Must not be called concurrently with any other call on `handle`.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn admit_decision_configure(
    handle: *mut AdmitDecision,
    parameter: *const c_char,
) -> u8 {
    if handle.is_null() {
        set_last_error("handle is null");
        return 0;
    }

    // SAFETY: checked non-null above, caller guarantees exclusive access
    let handle = unsafe { &mut *handle };

    // A null parameter is an unspecified blacklist, same as an empty one
    let parameter = if parameter.is_null() {
        ""
    } else {
        // SAFETY: checked non-null above, caller guarantees null termination
        match unsafe { read_str(parameter, "parameter") } {
            Some(s) => s,
            None => {
                let _enter = handle.span.enter();
                error!("Blacklist parameter is not valid UTF-8");
                return 0;
            }
        }
    };

    handle.decision.configure(parameter) as u8
}

/// Decide whether the object behind `url` should be cached.
///
/// Returns 1 to cache and 0 to bypass. Invalid arguments return 1.
///
/// # Safety
/// - `handle` must be null or have been returned by `admit_get_decision_v1()`.
/// - `url` must be null or a valid null-terminated C string.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn admit_decision_decide(
    handle: *const AdmitDecision,
    url: *const c_char,
) -> u8 {
    if handle.is_null() {
        set_last_error("handle is null");
        return 1;
    }

    // SAFETY: checked non-null above
    let handle = unsafe { &*handle };

    // SAFETY: forwarded caller guarantee
    let Some(url) = (unsafe { read_str(url, "url") }) else {
        return 1;
    };

    handle.decision.decide(url, &handle.storage) as u8
}

/// Free a decision object
///
/// # Safety
/// `handle` must be null or have been returned by `admit_get_decision_v1()`,
/// and must not be used afterwards.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn admit_decision_free(handle: *mut AdmitDecision) {
    if handle.is_null() {
        return;
    }

    // SAFETY: allocated by Box::into_raw in admit_get_decision_v1
    unsafe { drop(Box::from_raw(handle)) };
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn c(s: &str) -> CString {
        CString::new(s).unwrap()
    }

    fn last_error() -> String {
        let err = admit_last_error();
        assert!(!err.is_null());
        unsafe { CStr::from_ptr(err) }.to_str().unwrap().to_string()
    }

    #[test]
    fn test_handle_lifecycle() {
        let dir = tempfile::tempdir().unwrap();
        let mut blacklist = tempfile::NamedTempFile::new().unwrap();
        writeln!(blacklist, "/private/*").unwrap();

        let name = c("blacklist");
        let root = c(dir.path().to_str().unwrap());
        let parameter = c(blacklist.path().to_str().unwrap());

        unsafe {
            let handle = admit_get_decision_v1(name.as_ptr(), root.as_ptr());
            assert!(!handle.is_null());

            assert_eq!(admit_decision_configure(handle, parameter.as_ptr()), 1);

            let private = c("root://host//private/secret.dat");
            let public = c("root://host//public/data.root");
            assert_eq!(admit_decision_decide(handle, private.as_ptr()), 0);
            assert_eq!(admit_decision_decide(handle, public.as_ptr()), 1);

            admit_decision_free(handle);
        }
    }

    #[test]
    fn test_null_parameter_fails_open() {
        let dir = tempfile::tempdir().unwrap();
        let name = c("blacklist");
        let root = c(dir.path().to_str().unwrap());

        unsafe {
            let handle = admit_get_decision_v1(name.as_ptr(), root.as_ptr());
            assert!(!handle.is_null());

            assert_eq!(admit_decision_configure(handle, ptr::null()), 0);

            let url = c("root://host//private/secret.dat");
            assert_eq!(admit_decision_decide(handle, url.as_ptr()), 1);

            admit_decision_free(handle);
        }
    }

    #[test]
    fn test_non_utf8_parameter_fails_open() {
        let dir = tempfile::tempdir().unwrap();
        let name = c("blacklist");
        let root = c(dir.path().to_str().unwrap());
        let parameter = CString::new(vec![b'/', 0xff, b'x']).unwrap();

        unsafe {
            let handle = admit_get_decision_v1(name.as_ptr(), root.as_ptr());
            assert!(!handle.is_null());

            assert_eq!(admit_decision_configure(handle, parameter.as_ptr()), 0);
            assert_eq!(last_error(), "parameter is not valid UTF-8");

            let url = c("root://host//private/secret.dat");
            assert_eq!(admit_decision_decide(handle, url.as_ptr()), 1);

            admit_decision_free(handle);
        }
    }

    #[test]
    fn test_null_arguments() {
        let name = c("blacklist");

        unsafe {
            let handle = admit_get_decision_v1(name.as_ptr(), ptr::null());
            assert!(handle.is_null());
            assert_eq!(last_error(), "storage_root is null");

            let url = c("/private/secret.dat");
            assert_eq!(admit_decision_decide(ptr::null(), url.as_ptr()), 1);
            assert_eq!(last_error(), "handle is null");

            assert_eq!(admit_decision_configure(ptr::null_mut(), url.as_ptr()), 0);

            admit_decision_free(ptr::null_mut());
        }
    }
}
