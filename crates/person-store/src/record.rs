//! The native-side person record and its renderings

use std::fmt;

use serde::{Deserialize, Serialize};

/// Gender as interpreted from the raw one-byte code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gender {
    /// Code `0`
    Female,
    /// Code `1`
    Male,
    /// Any other code, kept verbatim
    Unknown(u8),
}

impl Gender {
    /// Interpret a raw gender code. Every byte is accepted.
    pub fn from_code(code: u8) -> Self {
        match code {
            0 => Gender::Female,
            1 => Gender::Male,
            other => Gender::Unknown(other),
        }
    }

    /// The raw code this gender was built from
    pub fn code(self) -> u8 {
        match self {
            Gender::Female => 0,
            Gender::Male => 1,
            Gender::Unknown(code) => code,
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Gender::Female => f.write_str("Female"),
            Gender::Male => f.write_str("Male"),
            Gender::Unknown(code) => write!(f, "Unknown({})", code),
        }
    }
}

/// Postal location of a person
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    /// Street address line
    pub street_address: String,
    /// City name
    pub city: String,
    /// State or region
    pub state: String,
    /// Country name
    pub country: String,
}

/// A person record as stored on the native heap
///
/// Records are immutable once built. The serialized form keeps `gender` as
/// its raw code so that a caller can compare it byte-for-byte with what it
/// passed in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonRecord {
    /// Given name
    pub first_name: String,
    /// Family name
    pub last_name: String,
    /// Raw gender code
    pub gender: u8,
    /// Age in years, unvalidated
    pub age: u8,
    /// Postal location
    pub location: Location,
}

impl PersonRecord {
    /// Interpreted gender
    pub fn gender(&self) -> Gender {
        Gender::from_code(self.gender)
    }

    /// Human-readable rendering, as returned by `person_get_info`
    pub fn info(&self) -> String {
        self.to_string()
    }

    /// Serialized rendering, as returned by `person_get_json`
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

impl fmt::Display for PersonRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "[ Person ]")?;
        writeln!(f, "First name: {:?}", self.first_name)?;
        writeln!(f, "Last name: {:?}", self.last_name)?;
        writeln!(f, "Gender: {}", self.gender())?;
        writeln!(f, "Age: {}", self.age)?;
        writeln!(f, "Location:")?;
        writeln!(f, "    Street address: {:?}", self.location.street_address)?;
        writeln!(f, "    City: {:?}", self.location.city)?;
        writeln!(f, "    State: {:?}", self.location.state)?;
        write!(f, "    Country: {:?}", self.location.country)
    }
}

impl Drop for PersonRecord {
    fn drop(&mut self) {
        tracing::debug!(
            first_name = %self.first_name,
            last_name = %self.last_name,
            "person record destroyed"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wison() -> PersonRecord {
        PersonRecord {
            first_name: "Wison".to_string(),
            last_name: "Ye".to_string(),
            gender: 1,
            age: 50,
            location: Location {
                street_address: "Addr".to_string(),
                city: "Springfield".to_string(),
                state: "Oregon".to_string(),
                country: "USA".to_string(),
            },
        }
    }

    #[test]
    fn test_gender_codes() {
        assert_eq!(Gender::from_code(0), Gender::Female);
        assert_eq!(Gender::from_code(1), Gender::Male);
        assert_eq!(Gender::from_code(7), Gender::Unknown(7));
        assert_eq!(Gender::from_code(255).code(), 255);
        assert_eq!(Gender::Unknown(9).to_string(), "Unknown(9)");
    }

    #[test]
    fn test_info_layout() {
        let info = wison().info();
        let lines: Vec<&str> = info.lines().collect();
        assert_eq!(lines[0], "[ Person ]");
        assert_eq!(lines[1], "First name: \"Wison\"");
        assert_eq!(lines[2], "Last name: \"Ye\"");
        assert_eq!(lines[3], "Gender: Male");
        assert_eq!(lines[4], "Age: 50");
        assert_eq!(lines[9], "    Country: \"USA\"");
        assert!(!info.ends_with('\n'));
    }

    #[test]
    fn test_json_keeps_raw_codes() {
        let mut record = wison();
        record.gender = 200;
        record.age = 255;
        let json: serde_json::Value = serde_json::from_str(&record.to_json().unwrap()).unwrap();
        assert_eq!(json["gender"], 200);
        assert_eq!(json["age"], 255);
        assert_eq!(json["location"]["city"], "Springfield");
    }
}
