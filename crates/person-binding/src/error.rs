//! Error types for the binding
//!
//! Store-side failures arrive as a `PersonResult` code plus the store's
//! thread-local message; everything else is raised on the caller side.

use person_store::PersonResult;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for binding operations
pub type Result<T> = std::result::Result<T, BindingError>;

/// Main error type for binding operations
#[derive(Error, Debug)]
pub enum BindingError {
    /// The shared library could not be opened
    #[error("Failed to load library '{}': {source}", path.display())]
    Load {
        path: PathBuf,
        #[source]
        source: libloading::Error,
    },

    /// A declared symbol is missing from the loaded library
    #[error("Symbol '{symbol}' not found in '{}': {source}", path.display())]
    MissingSymbol {
        symbol: &'static str,
        path: PathBuf,
        #[source]
        source: libloading::Error,
    },

    /// A text field contains a nul byte and cannot become a C string
    #[error("Field '{field}' contains an interior nul byte at position {position}")]
    InteriorNul { field: &'static str, position: usize },

    /// The store returned null without reporting a reason
    #[error("'{operation}' returned a null pointer")]
    NullPointer { operation: &'static str },

    /// The store rejected a call and reported why
    #[error("'{operation}' failed ({code:?}): {message}")]
    Store {
        operation: &'static str,
        code: PersonResult,
        message: String,
    },

    /// The serialized record could not be parsed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A value read back from the store differs from what was passed in
    #[error("Signature mismatch on '{field}': sent {expected}, store recorded {actual}")]
    SignatureMismatch {
        field: &'static str,
        expected: String,
        actual: String,
    },
}

impl BindingError {
    /// The store-side code, if this error came from the store
    pub fn code(&self) -> Option<PersonResult> {
        match self {
            Self::Store { code, .. } => Some(*code),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_error_display() {
        let err = BindingError::Store {
            operation: "person_release_record",
            code: PersonResult::UnknownPointer,
            message: "0x10 is not a live person handle".to_string(),
        };
        assert_eq!(err.code(), Some(PersonResult::UnknownPointer));
        let text = err.to_string();
        assert!(text.contains("person_release_record"));
        assert!(text.contains("UnknownPointer"));
    }

    #[test]
    fn test_mismatch_display() {
        let err = BindingError::SignatureMismatch {
            field: "age",
            expected: "203".to_string(),
            actual: "2".to_string(),
        };
        assert_eq!(err.code(), None);
        assert_eq!(
            err.to_string(),
            "Signature mismatch on 'age': sent 203, store recorded 2"
        );
    }
}
