//! Owning wrappers over store handles and strings
//!
//! [`Person`] and [`NativeString`] each hold exactly one pointer the store
//! handed out and give it back exactly once: explicitly through `release`,
//! or from `Drop` on any other exit path. Neither is `Clone`, and both hold
//! raw pointers, so neither can leave the thread that created it.

use std::ffi::CStr;
use std::fmt;
use std::mem::ManuallyDrop;
use std::os::raw::c_char;
use std::path::{Path, PathBuf};
use std::ptr::NonNull;

use libloading::Library;
use person_store::{PersonHandle, PersonLedgerStats, PersonResult};

use crate::error::{BindingError, Result};
use crate::marshal::{CreateArgs, NewPerson, PersonSnapshot};
use crate::signature::StoreApi;

/// Where a store's entry points came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Origin {
    /// Compiled into this process
    Linked,
    /// Resolved from a shared library at runtime
    Loaded(PathBuf),
    /// Supplied by the caller
    Custom,
}

/// A person store reachable through a declared [`StoreApi`]
pub struct Store {
    api: StoreApi,
    origin: Origin,
    // Keeps the resolved code mapped; must outlive every call through `api`.
    _library: Option<Library>,
}

impl Store {
    /// Use the store compiled into this process
    pub fn linked() -> Self {
        Self {
            api: StoreApi::linked(),
            origin: Origin::Linked,
            _library: None,
        }
    }

    /// Load a store from a shared library
    ///
    /// # Safety
    /// Loading runs the library's initialisers, and the library must export
    /// every declared symbol with exactly the declared signature. Use
    /// [`Store::load_verified`] to smoke-test the signatures after loading.
    pub unsafe fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let library = Library::new(path).map_err(|source| BindingError::Load {
            path: path.to_path_buf(),
            source,
        })?;
        let api = StoreApi::resolve(&library, path)?;
        tracing::debug!(path = %path.display(), "person store loaded");

        Ok(Self {
            api,
            origin: Origin::Loaded(path.to_path_buf()),
            _library: Some(library),
        })
    }

    /// Load a store and check that values survive a round trip through it
    ///
    /// # Safety
    /// Same requirements as [`Store::load`]. The round trip catches swapped
    /// or mis-sized arguments but cannot make a wrong declaration safe.
    pub unsafe fn load_verified(path: impl AsRef<Path>) -> Result<Self> {
        let store = Self::load(path)?;
        crate::verify::verify_roundtrip(&store)?;
        Ok(store)
    }

    /// Use a caller-supplied table of entry points
    ///
    /// # Safety
    /// Every function pointer must honour the contract of the store entry
    /// point it stands in for.
    pub unsafe fn from_api(api: StoreApi) -> Self {
        Self {
            api,
            origin: Origin::Custom,
            _library: None,
        }
    }

    /// Where the entry points came from
    pub fn origin(&self) -> &Origin {
        &self.origin
    }

    /// The resolved entry points
    pub fn api(&self) -> &StoreApi {
        &self.api
    }

    /// Create a record from caller-side values
    pub fn create(&self, person: &NewPerson) -> Result<Person<'_>> {
        let args = CreateArgs::new(person)?;
        let raw = unsafe {
            (self.api.create)(
                args.first_name.as_ptr(),
                args.last_name.as_ptr(),
                args.gender,
                args.age,
                args.street_address.as_ptr(),
                args.city.as_ptr(),
                args.state.as_ptr(),
                args.country.as_ptr(),
            )
        };
        let handle = self.non_null(raw, "person_create")?;
        tracing::debug!(addr = ?handle, first_name = %person.first_name, "record acquired");

        Ok(Person {
            store: self,
            handle,
        })
    }

    /// Current allocation counters of the store
    pub fn ledger_stats(&self) -> Result<PersonLedgerStats> {
        let mut stats = PersonLedgerStats::default();
        let code = unsafe { (self.api.ledger_stats)(&mut stats) };
        if code.is_success() {
            Ok(stats)
        } else {
            Err(self.last_error("person_ledger_stats"))
        }
    }

    /// Records and strings not yet released
    pub fn outstanding_allocations(&self) -> usize {
        unsafe { (self.api.outstanding_allocations)() }
    }

    /// Version string reported by the store
    pub fn version(&self) -> String {
        let raw = unsafe { (self.api.version)() };
        if raw.is_null() {
            return String::new();
        }
        unsafe { CStr::from_ptr(raw) }.to_string_lossy().into_owned()
    }

    /// Turn a possibly-null pointer into a result
    fn non_null<T>(&self, raw: *mut T, operation: &'static str) -> Result<NonNull<T>> {
        NonNull::new(raw).ok_or_else(|| match self.last_error(operation) {
            BindingError::Store {
                code: PersonResult::Success,
                ..
            } => BindingError::NullPointer { operation },
            err => err,
        })
    }

    /// Fail if the store recorded an error for the preceding void call
    fn check(&self, operation: &'static str) -> Result<()> {
        let code = unsafe { (self.api.last_error_code)() };
        if code.is_success() {
            Ok(())
        } else {
            Err(self.last_error(operation))
        }
    }

    /// Capture the store's last error for this thread
    fn last_error(&self, operation: &'static str) -> BindingError {
        let code = unsafe { (self.api.last_error_code)() };
        let raw = unsafe { (self.api.last_error)() };
        let message = if raw.is_null() {
            code.error_message().to_string()
        } else {
            unsafe { CStr::from_ptr(raw) }.to_string_lossy().into_owned()
        };
        unsafe { (self.api.clear_error)() };

        BindingError::Store {
            operation,
            code,
            message,
        }
    }

    fn release_record(&self, handle: NonNull<PersonHandle>) -> Result<()> {
        unsafe { (self.api.release_record)(handle.as_ptr()) };
        self.check("person_release_record")?;
        tracing::debug!(addr = ?handle, "record released");
        Ok(())
    }

    fn release_info(&self, ptr: NonNull<c_char>) -> Result<()> {
        unsafe { (self.api.release_info)(ptr.as_ptr()) };
        self.check("person_release_info")?;
        tracing::debug!(addr = ?ptr, "string released");
        Ok(())
    }
}

impl fmt::Debug for Store {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store")
            .field("origin", &self.origin)
            .finish_non_exhaustive()
    }
}

/// An owned record handle
///
/// The record is released when this guard is released or dropped,
/// whichever comes first.
pub struct Person<'s> {
    store: &'s Store,
    handle: NonNull<PersonHandle>,
}

impl<'s> Person<'s> {
    /// Print the record to the process's stdout
    pub fn print_info(&self) -> Result<()> {
        unsafe { (self.store.api.print_info)(self.handle.as_ptr()) };
        self.store.check("person_print_info")
    }

    /// Human-readable rendering, owned independently of this handle
    pub fn info(&self) -> Result<NativeString<'s>> {
        let raw = unsafe { (self.store.api.get_info)(self.handle.as_ptr()) };
        self.string(raw, "person_get_info")
    }

    /// JSON rendering, owned independently of this handle
    pub fn json(&self) -> Result<NativeString<'s>> {
        let raw = unsafe { (self.store.api.get_json)(self.handle.as_ptr()) };
        self.string(raw, "person_get_json")
    }

    /// Read the record back into caller-side values
    pub fn snapshot(&self) -> Result<PersonSnapshot> {
        let json = self.json()?;
        let snapshot = PersonSnapshot::from_json(json.as_c_str())?;
        json.release()?;
        Ok(snapshot)
    }

    /// The raw handle, still owned by this guard
    pub fn as_ptr(&self) -> *const PersonHandle {
        self.handle.as_ptr()
    }

    /// Release the record now and report any failure
    pub fn release(self) -> Result<()> {
        let this = ManuallyDrop::new(self);
        this.store.release_record(this.handle)
    }

    fn string(&self, raw: *mut c_char, operation: &'static str) -> Result<NativeString<'s>> {
        let ptr = self.store.non_null(raw, operation)?;
        Ok(NativeString {
            store: self.store,
            ptr,
        })
    }
}

impl Drop for Person<'_> {
    fn drop(&mut self) {
        if let Err(err) = self.store.release_record(self.handle) {
            tracing::warn!(error = %err, "failed to release record on drop");
        }
    }
}

impl fmt::Debug for Person<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Person").field(&self.handle).finish()
    }
}

/// An owned string returned by the store
///
/// Its lifetime is tied to the [`Store`], not to the [`Person`] it was
/// rendered from.
pub struct NativeString<'s> {
    store: &'s Store,
    ptr: NonNull<c_char>,
}

impl NativeString<'_> {
    /// Borrow the string without copying
    pub fn as_c_str(&self) -> &CStr {
        unsafe { CStr::from_ptr(self.ptr.as_ptr()) }
    }

    /// Copy the string into a Rust `String`; the native copy stays owned
    pub fn to_string_lossy(&self) -> String {
        self.as_c_str().to_string_lossy().into_owned()
    }

    /// Release the string now and report any failure
    pub fn release(self) -> Result<()> {
        let this = ManuallyDrop::new(self);
        this.store.release_info(this.ptr)
    }
}

impl Drop for NativeString<'_> {
    fn drop(&mut self) {
        if let Err(err) = self.store.release_info(self.ptr) {
            tracing::warn!(error = %err, "failed to release string on drop");
        }
    }
}

impl fmt::Display for NativeString<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_c_str().to_string_lossy())
    }
}

impl fmt::Debug for NativeString<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("NativeString").field(&self.as_c_str()).finish()
    }
}
