//! Memory management utilities for FFI
//!
//! This module owns the two allocation paths that cross the boundary
//! (info strings out, text arguments in) and the per-thread last error
//! that reports rejected calls.

use std::cell::RefCell;
use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::ptr;

use crate::ledger::{self, Domain};
use crate::types::PersonResult;

struct LastError {
    code: PersonResult,
    message: CString,
}

// Thread-local storage for last error
thread_local! {
    static LAST_ERROR: RefCell<Option<LastError>> = const { RefCell::new(None) };
}

/// Set the last error for the current thread
pub fn set_last_error<S: Into<String>>(code: PersonResult, err: S) {
    let message = CString::new(err.into())
        .unwrap_or_else(|_| {
            CString::new("Error message contained null byte").unwrap_or_default()
        });

    tracing::warn!(code = ?code, message = %message.to_string_lossy(), "call rejected");

    LAST_ERROR.with(|e| {
        *e.borrow_mut() = Some(LastError { code, message });
    });
}

/// Clear the last error for the current thread
pub fn clear_last_error() {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = None;
    });
}

/// Code of the last error, `Success` if none is set
pub fn last_error_code() -> PersonResult {
    LAST_ERROR.with(|e| {
        e.borrow()
            .as_ref()
            .map_or(PersonResult::Success, |err| err.code)
    })
}

/// Pointer to the last error message, valid until the next call on this thread
pub fn last_error_ptr() -> *const c_char {
    LAST_ERROR.with(|e| match &*e.borrow() {
        Some(err) => err.message.as_ptr(),
        None => ptr::null(),
    })
}

/// Hand a string to the caller as an owned info string
///
/// Interior nul bytes would truncate the C view of the string, so they are
/// replaced rather than rejected.
///
/// The caller must free the result with `person_release_info`.
pub fn allocate_string(s: &str) -> *mut c_char {
    let c_string = match CString::new(s) {
        Ok(c_string) => c_string,
        Err(_) => CString::new(s.replace('\0', "\u{FFFD}")).unwrap_or_default(),
    };
    let raw = c_string.into_raw();
    ledger::register(raw as usize, Domain::Info);
    tracing::debug!(addr = ?raw, len = s.len(), "info string allocated");
    raw
}

/// Free a string previously returned by `allocate_string`
///
/// # Safety
/// The pointer must have been retired from the ledger as `Domain::Info` by
/// the caller, so it is known to come from `CString::into_raw`.
pub unsafe fn free_string(s: *mut c_char) {
    drop(CString::from_raw(s));
    tracing::debug!(addr = ?s, "info string released");
}

/// Copy a borrowed C string into an owned Rust string
///
/// Invalid UTF-8 is replaced, matching the platform-default encoding the
/// caller is allowed to pass.
///
/// # Safety
/// The pointer must be null or a valid nul-terminated C string for the
/// duration of the call.
pub unsafe fn c_str_to_string(s: *const c_char, name: &str) -> Result<String, PersonResult> {
    if s.is_null() {
        set_last_error(PersonResult::NullPointer, format!("{} is null", name));
        return Err(PersonResult::NullPointer);
    }

    Ok(CStr::from_ptr(s).to_string_lossy().into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_error_handling() {
        set_last_error(PersonResult::UnknownPointer, "Test error");
        assert_eq!(last_error_code(), PersonResult::UnknownPointer);
        unsafe {
            let error = last_error_ptr();
            assert!(!error.is_null());
            let error_str = CStr::from_ptr(error).to_str().unwrap();
            assert_eq!(error_str, "Test error");
        }

        clear_last_error();
        assert_eq!(last_error_code(), PersonResult::Success);
        assert!(last_error_ptr().is_null());
    }

    #[test]
    fn test_error_message_with_nul() {
        set_last_error(PersonResult::InternalError, "bad\0message");
        assert_eq!(last_error_code(), PersonResult::InternalError);
        unsafe {
            let error = CStr::from_ptr(last_error_ptr()).to_str().unwrap();
            assert_eq!(error, "Error message contained null byte");
        }
        clear_last_error();
    }

    #[test]
    #[serial]
    fn test_string_allocation() {
        let s = allocate_string("Hello, FFI!");
        assert!(!s.is_null());
        unsafe {
            assert_eq!(CStr::from_ptr(s).to_str().unwrap(), "Hello, FFI!");
        }

        ledger::retire(s as usize, Domain::Info).unwrap();
        unsafe { free_string(s) };
    }

    #[test]
    #[serial]
    fn test_interior_nul_is_replaced() {
        let s = allocate_string("a\0b");
        unsafe {
            assert_eq!(CStr::from_ptr(s).to_str().unwrap(), "a\u{FFFD}b");
        }
        ledger::retire(s as usize, Domain::Info).unwrap();
        unsafe { free_string(s) };
    }

    #[test]
    fn test_c_str_conversion() {
        let input = CString::new("Springfield").unwrap();
        let converted = unsafe { c_str_to_string(input.as_ptr(), "city") };
        assert_eq!(converted.unwrap(), "Springfield");

        let invalid = [0xFFu8, 0x41, 0x00];
        let converted = unsafe { c_str_to_string(invalid.as_ptr() as *const c_char, "city") };
        assert_eq!(converted.unwrap(), "\u{FFFD}A");

        let missing = unsafe { c_str_to_string(ptr::null(), "city") };
        assert_eq!(missing.unwrap_err(), PersonResult::NullPointer);
        assert_eq!(last_error_code(), PersonResult::NullPointer);
    }
}
