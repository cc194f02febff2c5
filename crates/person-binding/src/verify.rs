//! Round-trip smoke test for a store's declared signatures
//!
//! A wrong declaration at an FFI boundary does not fail loudly: swapped or
//! mis-sized arguments arrive as different values. Sending a probe record
//! with a distinct value in every field and reading it back exposes that.

use crate::error::{BindingError, Result};
use crate::marshal::{Gender, Location, NewPerson, PersonSnapshot};
use crate::store::Store;

/// Gender code for the probe. Distinct from the age and wider than the
/// valid enum range so that a swapped or truncated byte shows up.
const PROBE_GENDER: u8 = 0xA5;
const PROBE_AGE: u8 = 0x2B;

/// The record sent through the store by [`verify_roundtrip`]
pub fn probe_person() -> NewPerson {
    NewPerson {
        first_name: "probe-first-name".to_string(),
        last_name: "probe-last-name".to_string(),
        gender: Gender::Other(PROBE_GENDER),
        age: PROBE_AGE,
        location: Location {
            street_address: "probe-street-address".to_string(),
            city: "probe-city".to_string(),
            state: "probe-state".to_string(),
            country: "probe-country".to_string(),
        },
    }
}

/// Create the probe record, read it back and compare every field
///
/// Fails with [`BindingError::SignatureMismatch`] naming the first field
/// that did not survive the trip.
pub fn verify_roundtrip(store: &Store) -> Result<()> {
    let probe = probe_person();
    let person = store.create(&probe)?;
    let snapshot = person.snapshot()?;
    person.release()?;

    compare(&probe, &snapshot)?;
    tracing::debug!(origin = ?store.origin(), "store signatures verified");
    Ok(())
}

fn compare(sent: &NewPerson, stored: &PersonSnapshot) -> Result<()> {
    let fields: [(&'static str, String, String); 8] = [
        ("first_name", sent.first_name.clone(), stored.first_name.clone()),
        ("last_name", sent.last_name.clone(), stored.last_name.clone()),
        ("gender", sent.gender.code().to_string(), stored.gender.to_string()),
        ("age", sent.age.to_string(), stored.age.to_string()),
        (
            "location.street_address",
            sent.location.street_address.clone(),
            stored.location.street_address.clone(),
        ),
        ("location.city", sent.location.city.clone(), stored.location.city.clone()),
        ("location.state", sent.location.state.clone(), stored.location.state.clone()),
        (
            "location.country",
            sent.location.country.clone(),
            stored.location.country.clone(),
        ),
    ];

    match fields.into_iter().find(|(_, expected, actual)| expected != actual) {
        Some((field, expected, actual)) => Err(BindingError::SignatureMismatch {
            field,
            expected,
            actual,
        }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stored_from(sent: &NewPerson) -> PersonSnapshot {
        PersonSnapshot {
            first_name: sent.first_name.clone(),
            last_name: sent.last_name.clone(),
            gender: sent.gender.code(),
            age: sent.age,
            location: sent.location.clone(),
        }
    }

    #[test]
    fn test_probe_fields_are_distinct() {
        let probe = probe_person();
        assert_ne!(probe.gender.code(), probe.age);
        let texts = [
            &probe.first_name,
            &probe.last_name,
            &probe.location.street_address,
            &probe.location.city,
            &probe.location.state,
            &probe.location.country,
        ];
        for (i, a) in texts.iter().enumerate() {
            for b in &texts[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn test_compare_reports_first_difference() {
        let probe = probe_person();
        let mut stored = stored_from(&probe);
        assert!(compare(&probe, &stored).is_ok());

        stored.location.state = "probe-city".to_string();
        match compare(&probe, &stored) {
            Err(BindingError::SignatureMismatch { field, actual, .. }) => {
                assert_eq!(field, "location.state");
                assert_eq!(actual, "probe-city");
            }
            other => panic!("expected mismatch, got {:?}", other),
        }
    }
}
