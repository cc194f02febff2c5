//! The declared binary signature of every store entry point
//!
//! The `store_api!` invocation below is the only place the calling
//! convention is written down. It expands into:
//!
//! - [`StoreApi`], one typed function pointer per entry point
//! - [`StoreApi::linked`], which takes the functions straight from the
//!   `person-store` crate, so the compiler checks each declaration against
//!   the real definition
//! - `StoreApi::resolve`, which looks the same names up in a shared library
//!   at runtime, where nothing can check them
//! - [`StoreApi::SIGNATURES`], the table in printable form

use std::os::raw::{c_char, c_uchar};
use std::path::Path;

use libloading::{Library, Symbol};
use person_store::{PersonHandle, PersonLedgerStats, PersonResult};

use crate::error::{BindingError, Result};

/// One declared entry point
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Signature {
    /// Exported symbol name
    pub symbol: &'static str,
    /// Declared Rust function pointer type
    pub declaration: &'static str,
}

/// Render a function pointer type on one line, independent of rustc's
/// pretty-printer wrapping.
macro_rules! declaration {
    (($($first:ty $(, $rest:ty)*)?) $(-> $ret:ty)?) => {
        concat!(
            "fn("
            $(, stringify!($first) $(, ", ", stringify!($rest))*)?
            , ")"
            $(, " -> ", stringify!($ret))?
        )
    };
}

macro_rules! store_api {
    ($(
        $(#[$doc:meta])*
        $field:ident => $symbol:ident : fn($($arg:ty),* $(,)?) $(-> $ret:ty)?;
    )*) => {
        /// Typed entry points of the person store
        #[derive(Clone, Copy)]
        pub struct StoreApi {
            $(
                $(#[$doc])*
                pub $field: unsafe extern "C" fn($($arg),*) $(-> $ret)?,
            )*
        }

        impl StoreApi {
            /// Every declared entry point, in declaration order
            pub const SIGNATURES: &'static [Signature] = &[
                $(
                    Signature {
                        symbol: stringify!($symbol),
                        declaration: declaration!(($($arg),*) $(-> $ret)?),
                    },
                )*
            ];

            /// Entry points of the store compiled into this process
            pub fn linked() -> Self {
                Self {
                    $( $field: person_store::$symbol, )*
                }
            }

            /// Resolve every entry point by name from a loaded library
            ///
            /// # Safety
            /// The library must export each symbol with exactly the declared
            /// signature; a mismatch is not detected here.
            pub(crate) unsafe fn resolve(library: &Library, path: &Path) -> Result<Self> {
                Ok(Self {
                    $(
                        $field: {
                            let symbol: Symbol<'_, unsafe extern "C" fn($($arg),*) $(-> $ret)?> = library
                                .get(concat!(stringify!($symbol), "\0").as_bytes())
                                .map_err(|source| BindingError::MissingSymbol {
                                    symbol: stringify!($symbol),
                                    path: path.to_path_buf(),
                                    source,
                                })?;
                            *symbol
                        },
                    )*
                })
            }
        }
    };
}

store_api! {
    /// `create`: copy the fields into a new record
    create => person_create: fn(
        *const c_char,
        *const c_char,
        c_uchar,
        c_uchar,
        *const c_char,
        *const c_char,
        *const c_char,
        *const c_char,
    ) -> *mut PersonHandle;

    /// `print_info`: write the record to stdout
    print_info => person_print_info: fn(*const PersonHandle);

    /// `get_info`: render the record into an owned string
    get_info => person_get_info: fn(*const PersonHandle) -> *mut c_char;

    /// Serialize the record into an owned JSON string
    get_json => person_get_json: fn(*const PersonHandle) -> *mut c_char;

    /// `release_info`: free a string from `get_info` or `get_json`
    release_info => person_release_info: fn(*mut c_char);

    /// `release_record`: free a record
    release_record => person_release_record: fn(*mut PersonHandle);

    /// Code of the last error on the calling thread
    last_error_code => person_last_error_code: fn() -> PersonResult;

    /// Borrowed message of the last error on the calling thread
    last_error => person_get_last_error: fn() -> *const c_char;

    /// Clear the last error on the calling thread
    clear_error => person_clear_error: fn();

    /// Copy the allocation counters out
    ledger_stats => person_ledger_stats: fn(*mut PersonLedgerStats) -> PersonResult;

    /// Count of unreleased records and strings
    outstanding_allocations => person_outstanding_allocations: fn() -> usize;

    /// Static version string
    version => person_store_version: fn() -> *const c_char;
}

impl StoreApi {
    /// Look up a declaration by symbol name
    pub fn signature(symbol: &str) -> Option<&'static Signature> {
        Self::SIGNATURES.iter().find(|sig| sig.symbol == symbol)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_covers_core_operations() {
        for symbol in [
            "person_create",
            "person_print_info",
            "person_get_info",
            "person_release_info",
            "person_release_record",
        ] {
            assert!(StoreApi::signature(symbol).is_some(), "{symbol} not declared");
        }
        assert_eq!(StoreApi::SIGNATURES.len(), 12);
        assert_eq!(StoreApi::SIGNATURES[0].symbol, "person_create");
    }

    #[test]
    fn test_declarations_are_printable() {
        let create = StoreApi::signature("person_create").unwrap();
        assert!(create.declaration.contains("c_uchar"));
        assert!(create.declaration.contains("PersonHandle"));

        let release = StoreApi::signature("person_release_record").unwrap();
        assert!(!release.declaration.contains("->"));
    }

    #[test]
    fn test_declarations_fit_on_one_line() {
        for sig in StoreApi::SIGNATURES {
            assert!(!sig.declaration.contains('\n'), "{} wraps", sig.symbol);
        }

        let create = StoreApi::signature("person_create").unwrap();
        assert_eq!(
            create.declaration,
            "fn(*const c_char, *const c_char, c_uchar, c_uchar, *const c_char, \
             *const c_char, *const c_char, *const c_char) -> *mut PersonHandle"
        );
        assert_eq!(
            StoreApi::signature("person_clear_error").unwrap().declaration,
            "fn()"
        );
        assert_eq!(
            StoreApi::signature("person_outstanding_allocations").unwrap().declaration,
            "fn() -> usize"
        );
    }
}
