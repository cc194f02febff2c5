//! FFI API function definitions
//!
//! This module contains the extern "C" functions that form
//! the public API of the person store.

use std::io::Write;
use std::os::raw::{c_char, c_uchar};
use std::ptr;

use crate::error::{retire_live, validate_live, validate_ptr};
use crate::ffi_boundary;
use crate::ledger::{self, Domain};
use crate::memory::{
    allocate_string, c_str_to_string, clear_last_error, free_string, last_error_code,
    last_error_ptr, set_last_error,
};
use crate::record::{Location, PersonRecord};
use crate::types::{PersonHandle, PersonLedgerStats, PersonResult};

/// Create a new person record on the native heap
///
/// Every text argument is copied before this returns; the caller keeps
/// ownership of its buffers. `gender` and `age` are stored as given.
///
/// # Returns
/// A handle to the new record, or null if a text argument was null
/// (see `person_get_last_error`).
///
/// # Safety
/// - All string pointers must be null or valid nul-terminated C strings
/// - The returned handle must be freed exactly once with `person_release_record`
#[no_mangle]
#[allow(clippy::too_many_arguments)]
pub unsafe extern "C" fn person_create(
    first_name: *const c_char,
    last_name: *const c_char,
    gender: c_uchar,
    age: c_uchar,
    street_address: *const c_char,
    city: *const c_char,
    state: *const c_char,
    country: *const c_char,
) -> *mut PersonHandle {
    ffi_boundary!(ptr::null_mut(), {
        clear_last_error();

        let record = PersonRecord {
            first_name: c_str_to_string(first_name, "first_name")?,
            last_name: c_str_to_string(last_name, "last_name")?,
            gender,
            age,
            location: Location {
                street_address: c_str_to_string(street_address, "street_address")?,
                city: c_str_to_string(city, "city")?,
                state: c_str_to_string(state, "state")?,
                country: c_str_to_string(country, "country")?,
            },
        };

        let handle = Box::into_raw(Box::new(record)) as *mut PersonHandle;
        ledger::register(handle as usize, Domain::Record);
        tracing::debug!(addr = ?handle, "person record created");

        Ok(handle)
    })
}

/// Print a human-readable rendering of a record to stdout
///
/// # Safety
/// `handle` should come from `person_create`. Stale or foreign pointers are
/// rejected through the last error instead of being dereferenced.
#[no_mangle]
pub unsafe extern "C" fn person_print_info(handle: *const PersonHandle) {
    ffi_boundary!((), {
        clear_last_error();

        let record = record_ref(handle)?;
        let stdout = std::io::stdout();
        let mut out = stdout.lock();
        writeln!(out, "{}", record)
            .and_then(|_| out.flush())
            .map_err(|e| {
                set_last_error(PersonResult::InternalError, format!("Failed to write to stdout: {}", e));
                PersonResult::InternalError
            })
    })
}

/// Render a record into a newly allocated string
///
/// The string is independent of the handle: releasing either one does not
/// affect the other.
///
/// # Returns
/// An owned string, or null if `handle` was rejected.
///
/// # Safety
/// The returned string must be freed exactly once with `person_release_info`
#[no_mangle]
pub unsafe extern "C" fn person_get_info(handle: *const PersonHandle) -> *mut c_char {
    ffi_boundary!(ptr::null_mut(), {
        clear_last_error();

        let record = record_ref(handle)?;
        Ok(allocate_string(&record.info()))
    })
}

/// Serialize a record as JSON into a newly allocated string
///
/// Gender and age are emitted as their raw byte values, so the output can be
/// compared field-by-field with the arguments given to `person_create`.
///
/// # Safety
/// The returned string must be freed exactly once with `person_release_info`
#[no_mangle]
pub unsafe extern "C" fn person_get_json(handle: *const PersonHandle) -> *mut c_char {
    ffi_boundary!(ptr::null_mut(), {
        clear_last_error();

        let record = record_ref(handle)?;
        let json = record.to_json().map_err(|e| {
            set_last_error(PersonResult::InternalError, format!("Failed to serialize record: {}", e));
            PersonResult::InternalError
        })?;
        Ok(allocate_string(&json))
    })
}

/// Free a string returned by `person_get_info` or `person_get_json`
///
/// # Safety
/// Passing a string twice, or a record handle, is detected and reported
/// through the last error; nothing is freed in that case.
#[no_mangle]
pub unsafe extern "C" fn person_release_info(info: *mut c_char) {
    ffi_boundary!((), {
        clear_last_error();

        retire_live(info, Domain::Info, "info")?;
        free_string(info);
        Ok(())
    })
}

/// Free a record created by `person_create`
///
/// After this call the handle is dead; any further use is reported as
/// `UnknownPointer`.
///
/// # Safety
/// Passing a handle twice, or an info string, is detected and reported
/// through the last error; nothing is freed in that case.
#[no_mangle]
pub unsafe extern "C" fn person_release_record(handle: *mut PersonHandle) {
    ffi_boundary!((), {
        clear_last_error();

        retire_live(handle, Domain::Record, "handle")?;
        drop(Box::from_raw(handle as *mut PersonRecord));
        tracing::debug!(addr = ?handle, "person record released");
        Ok(())
    })
}

/// Get the code of the last error on this thread
#[no_mangle]
pub extern "C" fn person_last_error_code() -> PersonResult {
    last_error_code()
}

/// Get the last error message on this thread
///
/// # Safety
/// Returns a pointer that should NOT be freed by the caller. It is valid
/// until the next store call on the same thread.
#[no_mangle]
pub unsafe extern "C" fn person_get_last_error() -> *const c_char {
    last_error_ptr()
}

/// Clear the last error message
#[no_mangle]
pub extern "C" fn person_clear_error() {
    clear_last_error();
}

/// Copy the allocation counters into `out`
///
/// # Safety
/// `out` must be null or point to writable memory for one `PersonLedgerStats`
#[no_mangle]
pub unsafe extern "C" fn person_ledger_stats(out: *mut PersonLedgerStats) -> PersonResult {
    ffi_boundary!(last_error_code(), {
        clear_last_error();

        validate_ptr(out, "out")?;
        *out = ledger::stats();
        Ok(PersonResult::Success)
    })
}

/// Number of records and info strings not yet released
#[no_mangle]
pub extern "C" fn person_outstanding_allocations() -> usize {
    ledger::stats().outstanding()
}

/// Get version information
///
/// # Safety
/// The returned string is static and should NOT be freed
#[no_mangle]
pub unsafe extern "C" fn person_store_version() -> *const c_char {
    concat!(env!("CARGO_PKG_NAME"), " ", env!("CARGO_PKG_VERSION"), "\0").as_ptr() as *const c_char
}

/// Borrow the record behind a live handle
unsafe fn record_ref<'a>(handle: *const PersonHandle) -> Result<&'a PersonRecord, PersonResult> {
    validate_live(handle, Domain::Record, "handle")?;
    Ok(&*(handle as *const PersonRecord))
}
