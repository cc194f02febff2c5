//! Output formatting and writing utilities
//!
//! This module provides utilities for formatting and writing output
//! in various formats (JSON, YAML, human-readable).

use crate::cli::OutputFormat;
use crate::error::Result;
use colored::Colorize;
use serde::Serialize;
use std::io::{self, Write};
use tracing::{debug, trace};

/// Trait for formatting serializable output
pub trait OutputFormatter {
    /// Format a serializable value
    fn format<T: Serialize>(&self, value: &T) -> Result<String>;
}

impl OutputFormatter for OutputFormat {
    fn format<T: Serialize>(&self, value: &T) -> Result<String> {
        match self {
            OutputFormat::Json => Ok(serde_json::to_string(value)?),
            OutputFormat::JsonPretty => Ok(serde_json::to_string_pretty(value)?),
            OutputFormat::Yaml => Ok(serde_yaml::to_string(value)?),
            OutputFormat::Human => {
                // For human format, use pretty JSON as fallback
                Ok(serde_json::to_string_pretty(value)?)
            }
        }
    }
}

/// Output writer that handles different output formats and colors
pub struct OutputWriter {
    format: OutputFormat,
    use_color: bool,
    quiet: bool,
    writer: Box<dyn Write>,
}

impl OutputWriter {
    /// Create a new output writer
    pub fn new(format: OutputFormat, use_color: bool, quiet: bool) -> Self {
        Self::with_writer(format, use_color, quiet, Box::new(io::stdout()))
    }

    /// Create an output writer with a custom writer
    pub fn with_writer(
        format: OutputFormat,
        use_color: bool,
        quiet: bool,
        writer: Box<dyn Write>,
    ) -> Self {
        Self {
            format,
            use_color,
            quiet,
            writer,
        }
    }

    /// Get the output format
    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Whether human-readable text is being written
    pub fn is_human(&self) -> bool {
        self.format == OutputFormat::Human
    }

    /// Whether the store may write its own rendering to stdout
    ///
    /// Only plain human output leaves room for it; quiet mode and machine
    /// formats keep stdout to the writer's own data.
    pub fn allows_store_output(&self) -> bool {
        self.is_human() && !self.quiet
    }

    /// Write a line of output
    pub fn writeln(&mut self, content: &str) -> Result<()> {
        writeln!(self.writer, "{}", content)?;
        self.writer.flush()?;
        Ok(())
    }

    /// Write an info message
    pub fn info(&mut self, message: &str) -> Result<()> {
        debug!("Output info: {}", message);

        if self.quiet || !self.is_human() {
            return Ok(());
        }

        if self.use_color {
            self.writeln(&format!("{} {}", "ℹ".blue(), message))
        } else {
            self.writeln(&format!("INFO: {}", message))
        }
    }

    /// Write a success message
    pub fn success(&mut self, message: &str) -> Result<()> {
        if self.quiet || !self.is_human() {
            return Ok(());
        }

        if self.use_color {
            self.writeln(&message.green().to_string())
        } else {
            self.writeln(message)
        }
    }

    /// Write a section header
    pub fn section(&mut self, title: &str) -> Result<()> {
        if self.quiet || !self.is_human() {
            return Ok(());
        }

        self.writeln("")?;
        if self.use_color {
            self.writeln(&format!("═══ {} ═══", title).bright_blue().to_string())
        } else {
            self.writeln(&format!("=== {} ===", title))
        }
    }

    /// Write data in the configured format
    pub fn data<T: Serialize>(&mut self, value: &T) -> Result<()> {
        let formatted = self.format.format(value)?;
        trace!("Outputting data: {}", formatted);

        if self.is_human() {
            self.writeln(&formatted)
        } else {
            // Machine formats end with exactly one newline
            let formatted = formatted.trim_end();
            self.writeln(formatted)
        }
    }

    /// Write a two-column table
    pub fn table(&mut self, headers: [&str; 2], rows: &[(String, String)]) -> Result<()> {
        let width = rows
            .iter()
            .map(|(left, _)| left.len())
            .chain(std::iter::once(headers[0].len()))
            .max()
            .unwrap_or(0);

        let header = format!("{:<width$}  {}", headers[0], headers[1], width = width);
        if self.use_color {
            self.writeln(&header.bold().to_string())?;
        } else {
            self.writeln(&header)?;
        }

        for (left, right) in rows {
            self.writeln(&format!("{:<width$}  {}", left, right, width = width))?;
        }
        Ok(())
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::writer;
    use super::*;

    #[test]
    fn test_human_messages() {
        let (mut out, buffer) = writer(OutputFormat::Human, false);
        out.info("creating record").unwrap();
        out.section("Info").unwrap();
        out.success("done").unwrap();
        assert_eq!(buffer.contents(), "INFO: creating record\n\n=== Info ===\ndone\n");
    }

    #[test]
    fn test_machine_format_skips_messages() {
        let (mut out, buffer) = writer(OutputFormat::Json, false);
        out.info("creating record").unwrap();
        out.section("Info").unwrap();
        out.data(&serde_json::json!({"outstanding": 0})).unwrap();
        assert_eq!(buffer.contents(), "{\"outstanding\":0}\n");
    }

    #[test]
    fn test_quiet_keeps_data() {
        let (mut out, buffer) = writer(OutputFormat::Yaml, true);
        out.success("done").unwrap();
        out.data(&serde_json::json!({"outstanding": 0})).unwrap();
        assert_eq!(buffer.contents(), "outstanding: 0\n");
    }

    #[test]
    fn test_store_output_gate() {
        assert!(writer(OutputFormat::Human, false).0.allows_store_output());
        assert!(!writer(OutputFormat::Human, true).0.allows_store_output());
        assert!(!writer(OutputFormat::Json, false).0.allows_store_output());
        assert!(!writer(OutputFormat::Yaml, true).0.allows_store_output());
    }

    #[test]
    fn test_table_alignment() {
        let (mut out, buffer) = writer(OutputFormat::Human, false);
        out.table(
            ["SYMBOL", "DECLARATION"],
            &[
                ("a".to_string(), "fn()".to_string()),
                ("longer".to_string(), "fn() -> usize".to_string()),
            ],
        )
        .unwrap();
        assert_eq!(
            buffer.contents(),
            "SYMBOL  DECLARATION\na       fn()\nlonger  fn() -> usize\n"
        );
    }
}
