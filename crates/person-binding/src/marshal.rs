//! Caller-side person values and their conversion to C arguments

use std::ffi::{CStr, CString};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{BindingError, Result};

/// Gender as the caller sees it
///
/// `Other` carries any raw code; the store accepts every byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    /// Code `0`
    Female,
    /// Code `1`
    Male,
    /// Any raw code
    Other(u8),
}

impl Gender {
    /// The byte passed across the boundary
    pub fn code(self) -> u8 {
        match self {
            Gender::Female => 0,
            Gender::Male => 1,
            Gender::Other(code) => code,
        }
    }

    /// Interpret a byte read back from the store
    pub fn from_code(code: u8) -> Self {
        match code {
            0 => Gender::Female,
            1 => Gender::Male,
            other => Gender::Other(other),
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Gender::Female => f.write_str("female"),
            Gender::Male => f.write_str("male"),
            Gender::Other(code) => write!(f, "other({})", code),
        }
    }
}

/// Postal location
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub street_address: String,
    pub city: String,
    pub state: String,
    pub country: String,
}

/// Field values for a new record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPerson {
    pub first_name: String,
    pub last_name: String,
    pub gender: Gender,
    pub age: u8,
    pub location: Location,
}

/// A record as read back through `person_get_json`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonSnapshot {
    pub first_name: String,
    pub last_name: String,
    pub gender: u8,
    pub age: u8,
    pub location: Location,
}

impl PersonSnapshot {
    /// Parse the JSON rendering of a record
    pub fn from_json(json: &CStr) -> Result<Self> {
        Ok(serde_json::from_slice(json.to_bytes())?)
    }

    /// Interpreted gender
    pub fn gender(&self) -> Gender {
        Gender::from_code(self.gender)
    }
}

/// Arguments of `person_create`, owned for the duration of the call
pub(crate) struct CreateArgs {
    pub first_name: CString,
    pub last_name: CString,
    pub gender: u8,
    pub age: u8,
    pub street_address: CString,
    pub city: CString,
    pub state: CString,
    pub country: CString,
}

impl CreateArgs {
    pub fn new(person: &NewPerson) -> Result<Self> {
        Ok(Self {
            first_name: c_string("first_name", &person.first_name)?,
            last_name: c_string("last_name", &person.last_name)?,
            gender: person.gender.code(),
            age: person.age,
            street_address: c_string("street_address", &person.location.street_address)?,
            city: c_string("city", &person.location.city)?,
            state: c_string("state", &person.location.state)?,
            country: c_string("country", &person.location.country)?,
        })
    }
}

fn c_string(field: &'static str, value: &str) -> Result<CString> {
    CString::new(value).map_err(|e| BindingError::InteriorNul {
        field,
        position: e.nul_position(),
    })
}
