//! Output formatting for command results.
//!
//! Supports a single human-readable line and a JSON object.

use std::io::{self, Write};

use serde::Serialize;

use crate::cli::Format;
use crate::session::Outcome;

/// Formats results for stdout.
#[derive(Debug, Clone, Copy)]
pub struct OutputFormat {
    format: Format,
    quiet: bool,
}

impl OutputFormat {
    /// Create a new output formatter.
    #[must_use]
    pub const fn new(format: Format) -> Self {
        Self {
            format,
            quiet: false,
        }
    }

    /// Suppress successful results.
    #[must_use]
    pub const fn quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    /// Write the outcome of an action.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails.
    pub fn write_outcome<W: Write>(&self, writer: &mut W, outcome: &Outcome) -> io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        match self.format {
            Format::Json => write_json(writer, &outcome.report()),
            Format::Text => writeln!(writer, "{outcome}"),
        }
    }
}

impl Default for OutputFormat {
    fn default() -> Self {
        Self::new(Format::Text)
    }
}

fn write_json<W: Write, T: Serialize>(writer: &mut W, value: &T) -> io::Result<()> {
    serde_json::to_writer(&mut *writer, value).map_err(io::Error::other)?;
    writeln!(writer)
}
