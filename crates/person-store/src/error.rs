//! Error handling for FFI boundary
//!
//! This module provides utilities for safely propagating errors
//! across the FFI boundary without panics or undefined behavior.

use std::any::Any;
use std::panic;

use crate::ledger::{self, Domain};
use crate::memory::set_last_error;
use crate::types::PersonResult;

/// Safely execute a closure that might panic
///
/// This function catches any panics and converts them to appropriate
/// error codes, preventing undefined behavior at the FFI boundary.
pub fn catch_panic<F, R>(f: F) -> Result<R, PersonResult>
where
    F: FnOnce() -> Result<R, PersonResult> + panic::UnwindSafe,
{
    match panic::catch_unwind(f) {
        Ok(result) => result,
        Err(panic_info) => {
            let msg = get_panic_message(&panic_info);
            set_last_error(PersonResult::InternalError, format!("Panic occurred: {}", msg));
            Err(PersonResult::InternalError)
        }
    }
}

/// Extract a message from panic info
fn get_panic_message(panic_info: &Box<dyn Any + Send>) -> String {
    if let Some(s) = panic_info.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = panic_info.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "Unknown panic".to_string()
    }
}

/// Macro for safely executing FFI functions
///
/// `$fallback` is returned when the body fails or panics; the failure
/// itself is already recorded as the thread's last error.
#[macro_export]
macro_rules! ffi_boundary {
    ($fallback:expr, $body:expr) => {{
        match $crate::error::catch_panic(|| $body) {
            Ok(result) => result,
            Err(_) => return $fallback,
        }
    }};
}

/// Validate that a pointer is not null
pub fn validate_ptr<T>(ptr: *const T, name: &str) -> Result<(), PersonResult> {
    if ptr.is_null() {
        set_last_error(PersonResult::NullPointer, format!("{} is null", name));
        Err(PersonResult::NullPointer)
    } else {
        Ok(())
    }
}

/// Validate that a pointer is non-null and live in `domain`
pub fn validate_live<T>(ptr: *const T, domain: Domain, name: &str) -> Result<(), PersonResult> {
    validate_ptr(ptr, name)?;
    ledger::check(ptr as usize, domain).map_err(|(code, message)| {
        set_last_error(code, format!("{}: {}", name, message));
        code
    })
}

/// Validate and remove a pointer from the ledger ahead of freeing it
pub fn retire_live<T>(ptr: *const T, domain: Domain, name: &str) -> Result<(), PersonResult> {
    validate_ptr(ptr, name)?;
    ledger::retire(ptr as usize, domain).map_err(|(code, message)| {
        set_last_error(code, format!("{}: {}", name, message));
        code
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::last_error_code;

    #[test]
    fn test_panic_catching() {
        let result = catch_panic(|| {
            panic!("Test panic");
            #[allow(unreachable_code)]
            Ok(42)
        });

        assert!(result.is_err());
        assert_eq!(result.unwrap_err(), PersonResult::InternalError);
        assert_eq!(last_error_code(), PersonResult::InternalError);
    }

    #[test]
    fn test_ptr_validation() {
        let value = 42;
        let ptr = &value as *const i32;

        assert!(validate_ptr(ptr, "test_ptr").is_ok());
        assert!(validate_ptr(std::ptr::null::<i32>(), "null_ptr").is_err());
    }

    #[test]
    fn test_unregistered_pointer_is_not_live() {
        let value = 7u8;
        let result = validate_live(&value as *const u8, Domain::Record, "handle");
        assert_eq!(result.unwrap_err(), PersonResult::UnknownPointer);
    }
}
