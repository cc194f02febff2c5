//! Person Store - native object store behind a C ABI
//!
//! This crate allocates person records on the native heap, renders them
//! into human-readable or JSON strings, and hands both out as raw pointers
//! that the caller must give back through the matching release function.
//!
//! # Safety
//!
//! All FFI functions deal with raw pointers crossing a language boundary.
//! Callers must:
//! - Release every handle with `person_release_record` and every returned
//!   string with `person_release_info`, exactly once
//! - Pass valid nul-terminated strings to `person_create`
//! - Serialize all calls that touch the same handle or string
//!
//! Misuse that can be detected without dereferencing the pointer (double
//! release, stale handles, a string passed where a handle is expected) is
//! rejected and reported through `person_last_error_code` and
//! `person_get_last_error`.

#![warn(missing_docs)]

#[macro_use]
mod error;
mod api;
mod ledger;
mod memory;
mod record;
mod types;

// Re-export public API
pub use api::*;
pub use record::{Gender, Location, PersonRecord};
pub use types::{PersonHandle, PersonLedgerStats, PersonResult};

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::CStr;

    #[test]
    fn test_version() {
        unsafe {
            let version = person_store_version();
            assert!(!version.is_null());
            let version = CStr::from_ptr(version).to_str().unwrap();
            assert!(version.starts_with("person-store "));
        }
    }
}
