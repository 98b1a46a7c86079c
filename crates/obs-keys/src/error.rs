//! Error types and exit-code mapping.

use thiserror::Error;

/// Rejected command-line arguments.
///
/// Handled entirely by the dispatcher: the user sees the usage text and the
/// process exits with status 1. A session is never created for these.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UsageError {
    /// No command was given.
    #[error("no command given")]
    Empty,

    /// The first token is not a known command.
    #[error("unknown command '{0}'")]
    UnknownCommand(String),

    /// A command that needs a target name was given none.
    #[error("'{command}' requires a {argument}")]
    MissingArgument {
        /// Command name.
        command: &'static str,
        /// Description of the missing argument.
        argument: &'static str,
    },

    /// Extra tokens followed a complete command.
    #[error("unexpected argument '{extra}' after '{command}'")]
    UnexpectedArgument {
        /// Command name.
        command: &'static str,
        /// First surplus token.
        extra: String,
    },

    /// A global option could not be parsed.
    #[error("{0}")]
    InvalidOption(String),
}

/// Failures raised while resolving configuration or talking to OBS.
#[derive(Debug, Error)]
pub enum ObsError {
    /// Configuration could not be loaded or is invalid.
    #[error("configuration error: {0}")]
    Config(String),

    /// The server rejected the credentials.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// The server could not be reached or the handshake did not complete.
    #[error("cannot connect to OBS: {0}")]
    Network(String),

    /// The named scene or input does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Any other failure during an exchange, including malformed responses.
    #[error("transport error: {0}")]
    Transport(String),

    /// The user interrupted the operation.
    #[error("interrupted")]
    Interrupted,
}

impl ObsError {
    /// Classify this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Config(_) => ErrorKind::Config,
            Self::Auth(_) => ErrorKind::Auth,
            Self::Network(_) => ErrorKind::Network,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Transport(_) => ErrorKind::Transport,
            Self::Interrupted => ErrorKind::Interrupted,
        }
    }

    /// Process exit status for this error.
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        self.kind().exit_code()
    }
}

impl From<obs_proto::ProtoError> for ObsError {
    fn from(err: obs_proto::ProtoError) -> Self {
        Self::Transport(err.to_string())
    }
}

/// Error categories, one exit code each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Bad or missing command-line arguments.
    Usage,
    /// Invalid configuration.
    Config,
    /// Credentials rejected.
    Auth,
    /// Unreachable host or handshake timeout.
    Network,
    /// Unknown scene or input.
    NotFound,
    /// Failure during an exchange.
    Transport,
    /// User interrupt.
    Interrupted,
}

impl ErrorKind {
    /// Process exit status.
    ///
    /// Configuration, authentication and network failures share status 2
    /// since all of them prevent a connection from being established.
    #[must_use]
    pub const fn exit_code(self) -> u8 {
        match self {
            Self::Usage => 1,
            Self::Config | Self::Auth | Self::Network => 2,
            Self::NotFound => 3,
            Self::Transport => 4,
            Self::Interrupted => 130,
        }
    }
}
