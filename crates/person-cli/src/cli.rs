//! Command-line interface argument parsing and definitions
//!
//! This module defines the CLI structure using clap's derive API,
//! providing a type-safe and well-documented command interface.

use clap::{Parser, Subcommand, ValueEnum};
use person_binding::Gender;
use std::io::IsTerminal;
use std::path::PathBuf;

/// personctl - drive the person store across its C ABI
///
/// Creates person records through the store's exported functions, renders
/// them, and releases every handle and string it acquires.
#[derive(Parser, Debug)]
#[command(
    name = "personctl",
    version,
    author,
    about,
    long_about = None,
    propagate_version = true,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Enable verbose output (can be used multiple times for increased verbosity)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all non-essential output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(short, long, global = true, env = "PERSONCTL_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output format for results
    #[arg(short, long, value_enum, global = true, default_value = "human")]
    pub output: OutputFormat,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// The subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// Output format options
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable formatted output
    Human,
    /// JSON output
    Json,
    /// YAML output
    Yaml,
    /// Pretty-printed JSON output
    JsonPretty,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create a record, render it, and release everything
    Demo(DemoArgs),

    /// Check that values survive a round trip through the store
    Verify(VerifyArgs),

    /// List the declared signature of every store entry point
    Symbols,
}

/// Arguments for the demo command
#[derive(Parser, Debug)]
pub struct DemoArgs {
    /// Shared library to load instead of the built-in store
    #[arg(short, long, value_name = "PATH")]
    pub library: Option<PathBuf>,

    /// File with the record's fields (JSON or YAML)
    #[arg(short, long, value_name = "PERSON_FILE")]
    pub person: Option<PathBuf>,

    /// First name
    #[arg(long)]
    pub first_name: Option<String>,

    /// Last name
    #[arg(long)]
    pub last_name: Option<String>,

    /// Gender: female, male, or a raw code 0-255
    #[arg(long, value_parser = parse_gender)]
    pub gender: Option<Gender>,

    /// Age in years (0-255, not validated)
    #[arg(long)]
    pub age: Option<u8>,

    /// Street address
    #[arg(long)]
    pub street_address: Option<String>,

    /// City
    #[arg(long)]
    pub city: Option<String>,

    /// State or region
    #[arg(long)]
    pub state: Option<String>,

    /// Country
    #[arg(long)]
    pub country: Option<String>,

    /// Also read the record back as JSON
    #[arg(long)]
    pub show_json: bool,
}

/// Arguments for the verify command
#[derive(Parser, Debug)]
pub struct VerifyArgs {
    /// Shared library to check instead of the built-in store
    #[arg(short, long, value_name = "PATH")]
    pub library: Option<PathBuf>,
}

/// Parse a gender name or raw code
pub fn parse_gender(value: &str) -> Result<Gender, String> {
    match value.to_ascii_lowercase().as_str() {
        "female" | "f" => Ok(Gender::Female),
        "male" | "m" => Ok(Gender::Male),
        other => other
            .parse::<u8>()
            .map(Gender::from_code)
            .map_err(|_| format!("expected 'female', 'male' or a code 0-255, got '{}'", value)),
    }
}

impl Cli {
    /// Parse command-line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Get the effective verbosity level
    pub fn verbosity_level(&self) -> u8 {
        if self.quiet {
            0
        } else {
            self.verbose
        }
    }

    /// Check if colored output should be used
    pub fn use_color(&self) -> bool {
        !self.no_color && std::io::stdout().is_terminal()
    }
}
