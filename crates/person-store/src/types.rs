//! FFI-safe type definitions
//!
//! All types in this module are designed to be safely passed across
//! the FFI boundary with C ABI compatibility.

/// Result codes for FFI operations
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersonResult {
    /// Operation completed successfully
    Success = 0,
    /// Null pointer provided
    NullPointer = -1,
    /// Pointer was never issued by the store or has already been released
    UnknownPointer = -2,
    /// Pointer belongs to the other domain (handle passed as string or vice versa)
    WrongDomain = -3,
    /// Internal error, including a caught panic
    InternalError = -9,
    /// Unknown error
    Unknown = -99,
}

/// Opaque handle for a person record
///
/// Callers only ever see `*mut PersonHandle`; the layout behind it is private
/// to the store.
#[repr(C)]
pub struct PersonHandle {
    _private: [u8; 0],
}

/// Allocation counters for both pointer domains
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PersonLedgerStats {
    /// Allocations handed out since process start
    pub allocated: u64,
    /// Allocations released since process start
    pub released: u64,
    /// Records currently live
    pub live_records: usize,
    /// Info strings currently live
    pub live_strings: usize,
}

impl PersonLedgerStats {
    /// Total live allocations across both domains
    pub fn outstanding(&self) -> usize {
        self.live_records + self.live_strings
    }
}

impl PersonResult {
    /// Check if the result indicates success
    pub fn is_success(self) -> bool {
        self == PersonResult::Success
    }

    /// Get a human-readable error message
    pub fn error_message(self) -> &'static str {
        match self {
            PersonResult::Success => "Success",
            PersonResult::NullPointer => "Null pointer provided",
            PersonResult::UnknownPointer => "Pointer is not live (never issued or already released)",
            PersonResult::WrongDomain => "Pointer belongs to a different domain",
            PersonResult::InternalError => "Internal error",
            PersonResult::Unknown => "Unknown error",
        }
    }

    /// Map a raw code back to a result, for callers holding an `i32`
    pub fn from_code(code: i32) -> Self {
        match code {
            0 => PersonResult::Success,
            -1 => PersonResult::NullPointer,
            -2 => PersonResult::UnknownPointer,
            -3 => PersonResult::WrongDomain,
            -9 => PersonResult::InternalError,
            _ => PersonResult::Unknown,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_mapping() {
        for result in [
            PersonResult::Success,
            PersonResult::NullPointer,
            PersonResult::UnknownPointer,
            PersonResult::WrongDomain,
            PersonResult::InternalError,
        ] {
            assert_eq!(PersonResult::from_code(result as i32), result);
        }
        assert_eq!(PersonResult::from_code(42), PersonResult::Unknown);
    }

    #[test]
    fn test_outstanding() {
        let stats = PersonLedgerStats {
            allocated: 5,
            released: 2,
            live_records: 1,
            live_strings: 2,
        };
        assert_eq!(stats.outstanding(), 3);
    }
}
