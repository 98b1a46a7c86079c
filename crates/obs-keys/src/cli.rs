//! Command-line argument parsing with clap.
//!
//! clap only handles the global options. The command tokens are collected
//! verbatim and validated by [`crate::action::Action::from_args`], so that
//! every malformed command takes the same usage path.

use std::path::PathBuf;

use clap::{ArgAction, Parser, ValueEnum};

use crate::config::{ConfigLayer, PortValue};

/// obs-keys - control OBS Studio from the command line.
#[derive(Parser, Debug, Clone)]
#[command(name = "obs-keys")]
#[command(version, about, long_about = None)]
#[command(override_usage = "obs-keys [OPTIONS] <COMMAND> [NAME]")]
pub struct Cli {
    /// Config file (TOML, or dotenv when named `.env`) read instead of the default location.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// OBS WebSocket host.
    #[arg(long)]
    pub host: Option<String>,

    /// OBS WebSocket port.
    #[arg(long)]
    pub port: Option<u16>,

    /// OBS WebSocket password.
    #[arg(long)]
    pub password: Option<String>,

    /// Connect and request timeout in seconds.
    #[arg(long, value_name = "SECS", value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout: Option<u64>,

    /// Output format.
    #[arg(short, long, value_enum, default_value_t = Format::Text)]
    pub format: Format,

    /// Do not print the result line.
    #[arg(short, long)]
    pub quiet: bool,

    /// Increase log verbosity (-v debug, -vv trace).
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Command tokens, validated by the dispatcher.
    #[arg(
        trailing_var_arg = true,
        value_name = "COMMAND",
        help = "record | stream | virtualcam | scene <NAME> | input_toggle <NAME>"
    )]
    pub command: Vec<String>,
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Format {
    /// One human-readable line.
    #[default]
    Text,
    /// JSON object for scripting.
    Json,
}

impl Cli {
    /// Configuration layer built from the command-line flags.
    #[must_use]
    pub fn overrides(&self) -> ConfigLayer {
        let layer = ConfigLayer {
            host: self.host.clone(),
            port: self.port.map(|p| PortValue::Number(i64::from(p))),
            password: self.password.clone(),
            ..ConfigLayer::default()
        };
        match self.timeout {
            Some(secs) => layer.with_timeout_secs(secs),
            None => layer,
        }
    }

    /// Default tracing filter for the requested verbosity.
    #[must_use]
    pub const fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "debug",
            _ => "trace",
        }
    }
}
