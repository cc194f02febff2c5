//! Command handlers for CLI subcommands
//!
//! This module contains the implementation logic for each CLI subcommand.

use crate::cli::{DemoArgs, OutputFormat, VerifyArgs};
use crate::config::{load_person, Config};
use crate::error::{Error, Result};
use crate::output::OutputWriter;
use person_binding::{
    probe_person, verify_roundtrip, NewPerson, Origin, PersonLedgerStats, PersonSnapshot,
    Store, StoreApi,
};
use serde::Serialize;
use std::path::Path;

/// Everything the demo command acquired and gave back
#[derive(Debug, Serialize)]
pub struct DemoReport {
    pub person: NewPerson,
    pub info: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record: Option<PersonSnapshot>,
    pub ledger: LedgerReport,
}

/// Store allocation counters after a run
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct LedgerReport {
    pub allocated: u64,
    pub released: u64,
    pub outstanding: usize,
}

impl From<PersonLedgerStats> for LedgerReport {
    fn from(stats: PersonLedgerStats) -> Self {
        Self {
            allocated: stats.allocated,
            released: stats.released,
            outstanding: stats.outstanding(),
        }
    }
}

/// Result of the verify command
#[derive(Debug, Serialize)]
pub struct VerifyReport {
    pub origin: String,
    pub version: String,
    pub verified: bool,
    pub probe: NewPerson,
}

#[derive(Debug, Serialize)]
struct SymbolRow {
    symbol: &'static str,
    declaration: &'static str,
}

/// Open the configured store
///
/// Without a library path the store compiled into this binary is used.
pub fn open_store(library: Option<&Path>, verify: bool) -> Result<Store> {
    let Some(path) = library else {
        tracing::debug!("using linked person store");
        return Ok(Store::linked());
    };

    if path.as_os_str().is_empty() {
        return Err(Error::config("store library path is empty"));
    }
    if path.is_dir() {
        return Err(Error::config(format!(
            "store library {} is a directory",
            path.display()
        )));
    }

    // SAFETY: the path names a person store library; its exports are checked
    // by name on load and by value when `verify` is set.
    let store = unsafe {
        if verify {
            Store::load_verified(path)?
        } else {
            Store::load(path)?
        }
    };
    tracing::info!(path = %path.display(), verified = verify, "person store loaded");
    Ok(store)
}

fn describe_origin(origin: &Origin) -> String {
    match origin {
        Origin::Linked => "linked".to_string(),
        Origin::Loaded(path) => path.display().to_string(),
        Origin::Custom => "custom".to_string(),
    }
}

/// Pick the record to create: flags over `--person` over config over built-in
pub fn resolve_person(args: &DemoArgs, config: &Config) -> Result<NewPerson> {
    let mut person = match &args.person {
        Some(path) => load_person(path)?,
        None => config.default_person(),
    };

    if let Some(first_name) = &args.first_name {
        person.first_name = first_name.clone();
    }
    if let Some(last_name) = &args.last_name {
        person.last_name = last_name.clone();
    }
    if let Some(gender) = args.gender {
        person.gender = gender;
    }
    if let Some(age) = args.age {
        person.age = age;
    }
    if let Some(street_address) = &args.street_address {
        person.location.street_address = street_address.clone();
    }
    if let Some(city) = &args.city {
        person.location.city = city.clone();
    }
    if let Some(state) = &args.state {
        person.location.state = state.clone();
    }
    if let Some(country) = &args.country {
        person.location.country = country.clone();
    }

    Ok(person)
}

/// Handle the demo command
pub fn handle_demo(args: DemoArgs, config: &Config, output: &mut OutputWriter) -> Result<()> {
    let person = resolve_person(&args, config)?;
    let library = args.library.as_deref().or(config.store.library.as_deref());
    let store = open_store(library, config.store.verify_on_load)?;

    output.info(&format!(
        "Creating record for {} {}",
        person.first_name, person.last_name
    ))?;
    let record = store.create(&person)?;

    if output.allows_store_output() {
        output.section("Store rendering")?;
        record.print_info()?;
    }

    let info = record.info()?;
    let info_text = info.to_string_lossy();
    info.release()?;

    let snapshot = if args.show_json {
        Some(record.snapshot()?)
    } else {
        None
    };

    record.release()?;

    let stats = store.ledger_stats()?;
    if stats.outstanding() != 0 {
        return Err(Error::Leak {
            outstanding: stats.outstanding(),
        });
    }

    let report = DemoReport {
        person,
        info: info_text,
        record: snapshot,
        ledger: stats.into(),
    };

    if output.is_human() {
        output.section("Info string")?;
        output.writeln(&report.info)?;
        if let Some(record) = &report.record {
            output.section("Stored record")?;
            output.data(record)?;
        }
        output.writeln("")?;
        output.success(&format!(
            "Released record and info string ({} allocated, {} released, {} outstanding)",
            report.ledger.allocated, report.ledger.released, report.ledger.outstanding
        ))?;
    } else {
        output.data(&report)?;
    }

    Ok(())
}

/// Handle the verify command
pub fn handle_verify(args: VerifyArgs, config: &Config, output: &mut OutputWriter) -> Result<()> {
    let library = args.library.as_deref().or(config.store.library.as_deref());
    let store = open_store(library, false)?;

    output.info(&format!(
        "Sending probe record through {}",
        describe_origin(store.origin())
    ))?;
    verify_roundtrip(&store)?;

    let report = VerifyReport {
        origin: describe_origin(store.origin()),
        version: store.version(),
        verified: true,
        probe: probe_person(),
    };

    match output.format() {
        OutputFormat::Human => output.success(&format!(
            "✓ Every field survived the round trip ({} store {})",
            report.origin, report.version
        )),
        _ => output.data(&report),
    }
}

/// Handle the symbols command
pub fn handle_symbols(output: &mut OutputWriter) -> Result<()> {
    if output.is_human() {
        let rows: Vec<(String, String)> = StoreApi::SIGNATURES
            .iter()
            .map(|sig| (sig.symbol.to_string(), sig.declaration.to_string()))
            .collect();
        output.table(["SYMBOL", "DECLARATION"], &rows)
    } else {
        let rows: Vec<SymbolRow> = StoreApi::SIGNATURES
            .iter()
            .map(|sig| SymbolRow {
                symbol: sig.symbol,
                declaration: sig.declaration,
            })
            .collect();
        output.data(&rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Commands};
    use crate::config::builtin_person;
    use crate::output::test_support::writer;
    use clap::Parser;
    use person_binding::{BindingError, Gender};
    use serial_test::serial;

    fn demo_args(extra: &[&str]) -> DemoArgs {
        let mut argv = vec!["personctl", "demo"];
        argv.extend_from_slice(extra);
        match Cli::parse_from(argv).command {
            Commands::Demo(args) => args,
            other => panic!("expected demo, got {:?}", other),
        }
    }

    #[test]
    fn test_resolve_person_defaults_to_builtin() {
        let person = resolve_person(&demo_args(&[]), &Config::default()).unwrap();
        assert_eq!(person, builtin_person());
    }

    #[test]
    fn test_flags_override_config() {
        let mut config = Config::default();
        let mut configured = builtin_person();
        configured.first_name = "Lucy".to_string();
        configured.age = 11;
        config.person = Some(configured);

        let args = demo_args(&["--age", "12", "--gender", "7", "--city", "Other city"]);
        let person = resolve_person(&args, &config).unwrap();
        assert_eq!(person.first_name, "Lucy");
        assert_eq!(person.age, 12);
        assert_eq!(person.gender, Gender::Other(7));
        assert_eq!(person.location.city, "Other city");
        assert_eq!(person.location.country, "Nice country");
    }

    #[test]
    fn test_missing_person_file() {
        let args = demo_args(&["--person", "/nonexistent/person.json"]);
        let err = resolve_person(&args, &Config::default()).unwrap_err();
        assert!(matches!(err, Error::FileNotFound { .. }));
    }

    #[test]
    #[serial]
    fn test_demo_reports_balanced_ledger() {
        let (mut out, buffer) = writer(OutputFormat::Json, false);
        handle_demo(demo_args(&["--show-json"]), &Config::default(), &mut out).unwrap();

        let report: serde_json::Value = serde_json::from_str(&buffer.contents()).unwrap();
        assert_eq!(report["ledger"]["outstanding"], 0);
        assert_eq!(report["record"]["first_name"], "Wison");
        assert_eq!(report["record"]["gender"], 1);

        let info = report["info"].as_str().unwrap();
        assert!(info.starts_with("[ Person ]\n"));
        assert!(info.contains("First name: \"Wison\""));
        assert!(info.contains("    Country: \"Nice country\""));
    }

    #[test]
    #[serial]
    fn test_demo_rejects_interior_nul() {
        let (mut out, _buffer) = writer(OutputFormat::Json, false);
        let mut config = Config::default();
        let mut person = builtin_person();
        person.last_name = "Y\0e".to_string();
        config.person = Some(person);

        let err = handle_demo(demo_args(&[]), &config, &mut out).unwrap_err();
        assert!(matches!(
            err,
            Error::Binding(BindingError::InteriorNul {
                field: "last_name",
                ..
            })
        ));
    }

    #[test]
    #[serial]
    fn test_verify_linked_store() {
        let (mut out, buffer) = writer(OutputFormat::Json, false);
        handle_verify(VerifyArgs { library: None }, &Config::default(), &mut out).unwrap();

        let report: serde_json::Value = serde_json::from_str(&buffer.contents()).unwrap();
        assert_eq!(report["origin"], "linked");
        assert_eq!(report["verified"], true);
    }

    #[test]
    fn test_missing_library() {
        let err = open_store(Some(Path::new("/nonexistent/libperson_store.so")), true).unwrap_err();
        assert!(matches!(err, Error::Binding(BindingError::Load { .. })));
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn test_unusable_library_path() {
        let err = open_store(Some(Path::new("")), false).unwrap_err();
        assert!(matches!(err, Error::Config(_)));

        let dir = std::env::temp_dir();
        let err = open_store(Some(&dir), true).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
        assert_eq!(err.exit_code(), 5);
    }

    #[test]
    fn test_symbols_table() {
        let (mut out, buffer) = writer(OutputFormat::Human, false);
        handle_symbols(&mut out).unwrap();

        let contents = buffer.contents();
        assert!(contents.starts_with("SYMBOL"));
        assert_eq!(contents.lines().count(), StoreApi::SIGNATURES.len() + 1);
        assert!(contents.contains("person_release_record"));
        assert!(contents.lines().any(|line| line.starts_with("person_create ")
            && line.ends_with("*const c_char) -> *mut PersonHandle")));
    }
}
