//! Connection configuration.
//!
//! Values come from layered sources, highest precedence first:
//!
//! 1. command-line flags
//! 2. the explicit config file (`--config`, else `<config dir>/obs-keys/config.toml`)
//! 3. `<config dir>/obs-wayland/.env`
//! 4. `./obs-keys.toml` in the working directory
//! 5. `./.env` in the working directory
//! 6. `OBS_HOST`, `OBS_PORT`, `OBS_PASSWORD` from the environment
//!
//! Files named `.env` or ending in `.env` are read as dotenv files with the
//! `OBS_*` keys; everything else is TOML.
//!
//! Each key is taken from the first layer that sets it. [`resolve`] is pure;
//! only [`load`] and the `ConfigLayer::from_*` constructors touch the
//! filesystem or the environment.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use tracing::debug;

use crate::error::ObsError;

/// Default server host.
pub const DEFAULT_HOST: &str = "localhost";

/// Default obs-websocket port.
pub const DEFAULT_PORT: u16 = 4455;

/// Default connection timeout.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Default request timeout.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Config file name looked up in the working directory.
pub const WORKING_DIR_FILE: &str = "obs-keys.toml";

/// Dotenv file name looked up in the working directory.
pub const WORKING_DIR_DOTENV: &str = ".env";

/// Config directory of the older `obs-wayland` scripts, which kept a `.env`.
pub const DOTENV_CONFIG_DIR: &str = "obs-wayland";

/// Where to reach the server and how to authenticate.
#[derive(Clone, PartialEq, Eq)]
pub struct ConnectionConfig {
    /// Server host name or address.
    pub host: String,
    /// Server port.
    pub port: u16,
    /// Server password, empty when authentication is disabled.
    pub password: String,
}

impl ConnectionConfig {
    /// Create a new connection config.
    #[must_use]
    pub fn new(host: impl Into<String>, port: u16, password: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port,
            password: password.into(),
        }
    }

    /// WebSocket URL of the server.
    #[must_use]
    pub fn url(&self) -> String {
        if self.host.contains(':') && !self.host.starts_with('[') {
            format!("ws://[{}]:{}", self.host, self.port)
        } else {
            format!("ws://{}:{}", self.host, self.port)
        }
    }
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self::new(DEFAULT_HOST, DEFAULT_PORT, "")
    }
}

impl fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("password", &if self.password.is_empty() { "" } else { "<redacted>" })
            .finish()
    }
}

/// Bounds on connection establishment and individual requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    /// Covers the TCP connect, WebSocket upgrade and identification.
    pub connect: Duration,
    /// Covers one request/response exchange.
    pub request: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            connect: DEFAULT_CONNECT_TIMEOUT,
            request: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

/// Fully resolved settings for one invocation.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Settings {
    /// Server address and credentials.
    pub connection: ConnectionConfig,
    /// Timeouts.
    pub timeouts: Timeouts,
}

/// A port given either as a number or as a quoted string.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum PortValue {
    /// `port = 4455`
    Number(i64),
    /// `OBS_PORT = "4455"`
    Text(String),
}

/// One configuration source. Unset keys fall through to the next layer.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct ConfigLayer {
    /// Server host.
    #[serde(default, alias = "OBS_HOST")]
    pub host: Option<String>,
    /// Server port.
    #[serde(default, alias = "OBS_PORT")]
    pub port: Option<PortValue>,
    /// Server password.
    #[serde(default, alias = "OBS_PASSWORD")]
    pub password: Option<String>,
    /// Connect timeout in seconds.
    #[serde(default)]
    pub connect_timeout_secs: Option<u64>,
    /// Request timeout in seconds.
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
}

impl ConfigLayer {
    /// Parse a layer from TOML.
    ///
    /// # Errors
    ///
    /// Returns a config error if the TOML is invalid.
    pub fn from_toml(content: &str) -> Result<Self, ObsError> {
        toml::from_str(content).map_err(|e| ObsError::Config(format!("invalid TOML: {e}")))
    }

    /// Parse a layer from dotenv content (`OBS_PORT=4455`, quotes optional).
    ///
    /// # Errors
    ///
    /// Returns a config error if a line cannot be parsed.
    pub fn from_dotenv(content: &str) -> Result<Self, ObsError> {
        dotenv_vars(content)
            .map(Self::from_env_vars)
            .map_err(|e| ObsError::Config(format!("invalid .env: {e}")))
    }

    /// Load a layer from a TOML or dotenv file, chosen by file name.
    ///
    /// # Errors
    ///
    /// Returns a config error if the file cannot be read or parsed.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ObsError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            ObsError::Config(format!(
                "failed to read config file '{}': {e}",
                path.display()
            ))
        })?;
        if is_dotenv(path) {
            return dotenv_vars(&content).map(Self::from_env_vars).map_err(|e| {
                ObsError::Config(format!("invalid .env in '{}': {e}", path.display()))
            });
        }
        toml::from_str(&content)
            .map_err(|e| ObsError::Config(format!("invalid TOML in '{}': {e}", path.display())))
    }

    /// Build a layer from `OBS_*` variables. Empty host and port values are
    /// treated as unset.
    pub fn from_env_vars<I, K, V>(vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut layer = Self::default();
        for (key, value) in vars {
            match key.as_ref() {
                "OBS_HOST" => layer.host = non_empty(value.into()),
                "OBS_PORT" => layer.port = non_empty(value.into()).map(PortValue::Text),
                "OBS_PASSWORD" => layer.password = Some(value.into()),
                _ => {}
            }
        }
        layer
    }

    /// Build a layer from the process environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_env_vars(std::env::vars())
    }

    /// Set both timeouts to `secs`.
    #[must_use]
    pub const fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.connect_timeout_secs = Some(secs);
        self.request_timeout_secs = Some(secs);
        self
    }
}

fn dotenv_vars(content: &str) -> Result<Vec<(String, String)>, dotenvy::Error> {
    dotenvy::from_read_iter(content.as_bytes()).collect()
}

fn is_dotenv(path: &Path) -> bool {
    path.file_name().is_some_and(|name| name == WORKING_DIR_DOTENV)
        || path.extension().is_some_and(|ext| ext == "env")
}

fn non_empty(value: String) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}

/// Merge layers (first wins per key), apply defaults and validate.
///
/// # Errors
///
/// Returns a config error for an empty host, a port outside 1-65535, or a
/// zero timeout.
pub fn resolve(layers: &[ConfigLayer]) -> Result<Settings, ObsError> {
    let host = layers
        .iter()
        .find_map(|l| l.host.clone())
        .unwrap_or_else(|| DEFAULT_HOST.to_string());
    let host = host.trim().to_string();
    if host.is_empty() {
        return Err(ObsError::Config("host cannot be empty".to_string()));
    }

    let port = match layers.iter().find_map(|l| l.port.as_ref()) {
        Some(value) => parse_port(value)?,
        None => DEFAULT_PORT,
    };

    let password = layers
        .iter()
        .find_map(|l| l.password.clone())
        .unwrap_or_default();

    let connect = timeout_from(
        layers.iter().find_map(|l| l.connect_timeout_secs),
        DEFAULT_CONNECT_TIMEOUT,
        "connect_timeout_secs",
    )?;
    let request = timeout_from(
        layers.iter().find_map(|l| l.request_timeout_secs),
        DEFAULT_REQUEST_TIMEOUT,
        "request_timeout_secs",
    )?;

    Ok(Settings {
        connection: ConnectionConfig {
            host,
            port,
            password,
        },
        timeouts: Timeouts { connect, request },
    })
}

fn parse_port(value: &PortValue) -> Result<u16, ObsError> {
    let number = match value {
        PortValue::Number(n) => *n,
        PortValue::Text(s) => s
            .trim()
            .parse::<i64>()
            .map_err(|_| ObsError::Config(format!("invalid port '{s}'")))?,
    };
    match u16::try_from(number) {
        Ok(port) if port != 0 => Ok(port),
        _ => Err(ObsError::Config(format!(
            "port must be between 1 and 65535, got {number}"
        ))),
    }
}

fn timeout_from(secs: Option<u64>, default: Duration, key: &str) -> Result<Duration, ObsError> {
    match secs {
        None => Ok(default),
        Some(0) => Err(ObsError::Config(format!("{key} must be greater than 0"))),
        Some(secs) => Ok(Duration::from_secs(secs)),
    }
}

/// Default location of the per-user config file.
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("obs-keys").join("config.toml"))
}

/// Default location of the per-user dotenv file.
#[must_use]
pub fn default_dotenv_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(DOTENV_CONFIG_DIR).join(WORKING_DIR_DOTENV))
}

fn push_if_present(layers: &mut Vec<ConfigLayer>, path: &Path) -> Result<(), ObsError> {
    if path.is_file() {
        debug!(path = %path.display(), "Loading config file");
        layers.push(ConfigLayer::from_file(path)?);
    }
    Ok(())
}

/// Read every source and resolve the settings.
///
/// `explicit` must exist when given; the default locations are optional.
///
/// # Errors
///
/// Returns a config error if a file cannot be read or parsed, or if the
/// merged values are invalid.
pub fn load(overrides: ConfigLayer, explicit: Option<&Path>) -> Result<Settings, ObsError> {
    let mut layers = vec![overrides];

    match explicit {
        Some(path) => {
            debug!(path = %path.display(), "Loading config file");
            layers.push(ConfigLayer::from_file(path)?);
        }
        None => {
            if let Some(path) = default_config_path() {
                push_if_present(&mut layers, &path)?;
            }
        }
    }
    if let Some(path) = default_dotenv_path() {
        push_if_present(&mut layers, &path)?;
    }
    push_if_present(&mut layers, Path::new(WORKING_DIR_FILE))?;
    push_if_present(&mut layers, Path::new(WORKING_DIR_DOTENV))?;

    layers.push(ConfigLayer::from_env());

    let settings = resolve(&layers)?;
    debug!(connection = ?settings.connection, timeouts = ?settings.timeouts, "Resolved configuration");
    Ok(settings)
}
