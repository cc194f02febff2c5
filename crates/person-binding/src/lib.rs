//! Person Binding - safe caller side of the person store C ABI
//!
//! This crate declares every store entry point once, resolves them either
//! from the store compiled into the process or from a shared library, and
//! wraps the pointers the store hands out in guards that release them
//! exactly once.
//!
//! ```no_run
//! use person_binding::{Gender, Location, NewPerson, Store};
//!
//! let store = Store::linked();
//! let person = store.create(&NewPerson {
//!     first_name: "Wison".into(),
//!     last_name: "Ye".into(),
//!     gender: Gender::Male,
//!     age: 50,
//!     location: Location {
//!         street_address: "Addr".into(),
//!         city: "City".into(),
//!         state: "State".into(),
//!         country: "Country".into(),
//!     },
//! })?;
//!
//! let info = person.info()?;
//! println!("{}", info);
//! info.release()?;
//! person.release()?;
//! # Ok::<(), person_binding::BindingError>(())
//! ```

mod error;
mod marshal;
mod signature;
mod store;
mod verify;

pub use error::{BindingError, Result};
pub use marshal::{Gender, Location, NewPerson, PersonSnapshot};
pub use person_store::{PersonHandle, PersonLedgerStats, PersonResult};
pub use signature::{Signature, StoreApi};
pub use store::{NativeString, Origin, Person, Store};
pub use verify::{probe_person, verify_roundtrip};
