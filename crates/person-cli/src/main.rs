//! personctl - command-line driver for the person store
//!
//! Creates, renders and releases person records through the store's C ABI,
//! either the store linked into this binary or one loaded from a shared
//! library, and checks that nothing is left allocated afterwards.

mod cli;
mod config;
mod error;
mod handlers;
mod logging;
mod output;

use cli::{Cli, Commands};
use colored::control;
use config::Config;
use error::Result;
use logging::{timing::Timer, LoggingConfig};
use output::OutputWriter;
use std::process;
use tracing::instrument;

fn main() {
    // Parse command-line arguments
    let cli = Cli::parse_args();

    // Set up colored output
    control::set_override(cli.use_color());

    // Run the application
    let result = run(cli);

    // Handle the result
    match result {
        Ok(()) => process::exit(0),
        Err(e) => {
            eprintln!(
                "{}",
                error::format_error(&e, control::SHOULD_COLORIZE.should_colorize())
            );
            process::exit(e.exit_code());
        }
    }
}

/// Main application logic
fn run(cli: Cli) -> Result<()> {
    // Configuration may carry logging settings, so it is read before the
    // subscriber exists.
    let config = Config::load_with_file(cli.config.as_deref())?;

    if let Err(e) = init_logging(&cli, &config) {
        eprintln!("Failed to initialize logging: {}", e);
    }

    execute(cli, &config)
}

#[instrument(skip_all, fields(command = ?cli.command))]
fn execute(cli: Cli, config: &Config) -> Result<()> {
    let _timer = Timer::new("cli_execution");

    // Create output writer
    let mut output = OutputWriter::new(cli.output, cli.use_color(), cli.quiet);

    tracing::info!(
        command = ?cli.command,
        verbosity = cli.verbosity_level(),
        "Executing command"
    );

    // Handle the subcommand
    match cli.command {
        Commands::Demo(args) => handlers::handle_demo(args, config, &mut output),
        Commands::Verify(args) => handlers::handle_verify(args, config, &mut output),
        Commands::Symbols => handlers::handle_symbols(&mut output),
    }
}

/// Initialize the logging system
fn init_logging(cli: &Cli, config: &Config) -> Result<()> {
    // Create logging configuration from CLI args, the config file and environment
    let mut logging_config = LoggingConfig::from_verbosity(cli.verbosity_level());
    if cli.verbose == 0 {
        logging_config.merge_with_file(&config.logging);
    }
    logging_config.merge_with_env();
    logging_config.ansi = cli.use_color();

    // If quiet mode, only log errors
    if cli.quiet {
        logging_config.level = "error".to_string();
    }

    logging::init_logging(logging_config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_cli_parsing() {
        let cli = Cli::parse_from(["personctl", "-vv", "demo", "--age", "30"]);
        assert_eq!(cli.verbosity_level(), 2);
        assert!(matches!(cli.command, Commands::Demo(_)));

        let cli = Cli::parse_from(["personctl", "--quiet", "-o", "json", "symbols"]);
        assert_eq!(cli.verbosity_level(), 0);
        assert_eq!(cli.output, cli::OutputFormat::Json);
    }

    #[test]
    fn test_subcommand_required() {
        assert!(Cli::try_parse_from(["personctl"]).is_err());
    }
}
