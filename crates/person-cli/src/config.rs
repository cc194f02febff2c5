//! Configuration management for the CLI
//!
//! This module handles loading configuration from:
//! - Default values
//! - Configuration files (YAML/JSON)
//! - Command-line arguments, which take precedence over both

use crate::error::{Error, Result};
use person_binding::{Gender, Location, NewPerson};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Store settings
    pub store: StoreConfig,

    /// Record used by `demo` when no person file is given
    pub person: Option<NewPerson>,

    /// Logging settings
    pub logging: LoggingConfig,
}

/// Store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Shared library to load instead of the built-in store
    pub library: Option<PathBuf>,

    /// Run the round-trip check right after loading a library
    pub verify_on_load: bool,
}

/// Logging configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: Option<String>,

    /// Log format (compact, full, json)
    pub format: Option<String>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            library: None,
            verify_on_load: true,
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::FileNotFound {
                path: path.to_path_buf(),
            });
        }

        let content = std::fs::read_to_string(path)?;

        let config = if is_yaml(path) {
            serde_yaml::from_str(&content)?
        } else {
            serde_json::from_str(&content)?
        };

        Ok(config)
    }

    /// Load configuration from default locations
    pub fn load() -> Result<Self> {
        for path in Self::default_config_paths() {
            if path.exists() {
                match Self::from_file(&path) {
                    Ok(config) => {
                        tracing::debug!(path = %path.display(), "Loaded configuration");
                        return Ok(config);
                    }
                    Err(e) => {
                        tracing::warn!(path = %path.display(), error = %e, "Failed to load config");
                    }
                }
            }
        }

        // Return default config if no config file found
        Ok(Self::default())
    }

    /// Load configuration from a specific file or default locations
    pub fn load_with_file(file: Option<&Path>) -> Result<Self> {
        if let Some(path) = file {
            Self::from_file(path)
        } else {
            Self::load()
        }
    }

    /// Get default configuration file paths to check
    fn default_config_paths() -> Vec<PathBuf> {
        let mut paths = vec![
            PathBuf::from(".personctl.yaml"),
            PathBuf::from(".personctl.json"),
        ];

        if let Some(config_dir) = dirs::config_dir() {
            let personctl_dir = config_dir.join("personctl");
            paths.push(personctl_dir.join("config.yaml"));
            paths.push(personctl_dir.join("config.json"));
        }

        if let Some(home_dir) = dirs::home_dir() {
            paths.push(home_dir.join(".personctl.yaml"));
            paths.push(home_dir.join(".personctl.json"));
        }

        paths
    }

    /// The configured record, or the built-in one
    pub fn default_person(&self) -> NewPerson {
        self.person.clone().unwrap_or_else(builtin_person)
    }
}

/// Read a person record from a JSON or YAML file
pub fn load_person(path: &Path) -> Result<NewPerson> {
    if !path.exists() {
        return Err(Error::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    let content = std::fs::read_to_string(path)?;
    let expected = if is_yaml(path) { "YAML" } else { "JSON" };
    let parsed = if is_yaml(path) {
        serde_yaml::from_str(&content).map_err(|e| e.to_string())
    } else {
        serde_json::from_str(&content).map_err(|e| e.to_string())
    };

    parsed.map_err(|reason| {
        tracing::debug!(path = %path.display(), %reason, "Person file rejected");
        Error::InvalidFormat {
            path: path.to_path_buf(),
            expected: format!("{} person record", expected),
        }
    })
}

/// The record used when nothing else is configured
pub fn builtin_person() -> NewPerson {
    NewPerson {
        first_name: "Wison".to_string(),
        last_name: "Ye".to_string(),
        gender: Gender::Male,
        age: 88,
        location: Location {
            street_address: "No 10, ABC Street".to_string(),
            city: "Nice city".to_string(),
            state: "Nice state".to_string(),
            country: "Nice country".to_string(),
        },
    }
}

fn is_yaml(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|s| s.to_str()),
        Some("yaml") | Some("yml")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{Builder, NamedTempFile};

    fn temp_file(suffix: &str) -> NamedTempFile {
        Builder::new().suffix(suffix).tempfile().unwrap()
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.store.library.is_none());
        assert!(config.store.verify_on_load);
        assert_eq!(config.default_person(), builtin_person());
    }

    #[test]
    fn test_yaml_config() {
        let mut file = temp_file(".yaml");
        writeln!(
            file,
            r#"
store:
  library: /opt/person/libperson_store.so
  verify_on_load: false
person:
  first_name: Lucy
  last_name: Chen
  gender: female
  age: 11
  location:
    street_address: No 11, ABC Street
    city: Nice city
    state: Nice state
    country: Nice country
logging:
  level: debug
"#
        )
        .unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(
            config.store.library.as_deref(),
            Some(Path::new("/opt/person/libperson_store.so"))
        );
        assert!(!config.store.verify_on_load);
        assert_eq!(config.default_person().first_name, "Lucy");
        assert_eq!(config.logging.level.as_deref(), Some("debug"));
    }

    #[test]
    fn test_missing_config_file() {
        let err = Config::from_file(Path::new("/nonexistent/personctl.yaml")).unwrap_err();
        assert!(matches!(err, Error::FileNotFound { .. }));
    }

    #[test]
    fn test_load_person_json() {
        let mut file = temp_file(".json");
        let person = serde_json::to_string(&builtin_person()).unwrap();
        file.write_all(person.as_bytes()).unwrap();

        assert_eq!(load_person(file.path()).unwrap(), builtin_person());
    }

    #[test]
    fn test_load_person_rejects_garbage() {
        let mut file = temp_file(".json");
        file.write_all(b"{\"first_name\": 3}").unwrap();

        let err = load_person(file.path()).unwrap_err();
        assert!(matches!(err, Error::InvalidFormat { .. }));
    }
}
