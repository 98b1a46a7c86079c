//! Validated user intents.
//!
//! [`Action::from_args`] is the only way to build an [`Action`] from the
//! command line. It checks the command name and the exact argument count,
//! and never touches the network.

use std::fmt;

use crate::error::UsageError;

/// Usage text printed for any rejected command line.
pub const USAGE: &str = "\
Usage:
  obs-keys [OPTIONS] record                    # Toggle recording
  obs-keys [OPTIONS] stream                    # Toggle streaming
  obs-keys [OPTIONS] virtualcam                # Toggle virtual camera
  obs-keys [OPTIONS] scene <scene_name>        # Switch to scene
  obs-keys [OPTIONS] input_toggle <input_name> # Toggle audio source mute

Options:
  -c, --config <PATH>     Config file, TOML or .env (default: <config dir>/obs-keys/config.toml)
      --host <HOST>       OBS WebSocket host [env: OBS_HOST] (default: localhost)
      --port <PORT>       OBS WebSocket port [env: OBS_PORT] (default: 4455)
      --password <PASS>   OBS WebSocket password [env: OBS_PASSWORD]
      --timeout <SECS>    Connect and request timeout in seconds
  -f, --format <FORMAT>   Output format: text or json
  -q, --quiet             Do not print the result line
  -v, --verbose           Increase log verbosity (-v, -vv)
  -h, --help              Print help
  -V, --version           Print version
";

/// An OBS output that can be started and stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Output {
    /// Recording output.
    Record,
    /// Streaming output.
    Stream,
    /// Virtual camera output.
    VirtualCam,
}

impl Output {
    /// Request returning `{outputActive}` for this output.
    #[must_use]
    pub const fn status_request(self) -> &'static str {
        match self {
            Self::Record => "GetRecordStatus",
            Self::Stream => "GetStreamStatus",
            Self::VirtualCam => "GetVirtualCamStatus",
        }
    }

    /// Request that starts this output.
    #[must_use]
    pub const fn start_request(self) -> &'static str {
        match self {
            Self::Record => "StartRecord",
            Self::Stream => "StartStream",
            Self::VirtualCam => "StartVirtualCam",
        }
    }

    /// Request that stops this output.
    #[must_use]
    pub const fn stop_request(self) -> &'static str {
        match self {
            Self::Record => "StopRecord",
            Self::Stream => "StopStream",
            Self::VirtualCam => "StopVirtualCam",
        }
    }

    /// Human-readable name.
    #[must_use]
    pub const fn noun(self) -> &'static str {
        match self {
            Self::Record => "recording",
            Self::Stream => "streaming",
            Self::VirtualCam => "virtual camera",
        }
    }
}

/// A validated command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Start recording if stopped, stop if running.
    ToggleRecord,
    /// Start streaming if stopped, stop if running.
    ToggleStream,
    /// Start the virtual camera if stopped, stop if running.
    ToggleVirtualCam,
    /// Make `scene_name` the program scene.
    SwitchScene {
        /// Target scene.
        scene_name: String,
    },
    /// Flip the mute state of `input_name`.
    ToggleInput {
        /// Target audio input.
        input_name: String,
    },
}

impl Action {
    /// Parse the command tokens (program name and global options excluded).
    ///
    /// # Errors
    ///
    /// Returns a [`UsageError`] for an empty sequence, an unknown command, a
    /// missing or empty target name, or any surplus token.
    pub fn from_args<S: AsRef<str>>(args: &[S]) -> Result<Self, UsageError> {
        let Some((first, rest)) = args.split_first() else {
            return Err(UsageError::Empty);
        };

        match first.as_ref() {
            "record" => no_args("record", rest).map(|()| Self::ToggleRecord),
            "stream" => no_args("stream", rest).map(|()| Self::ToggleStream),
            "virtualcam" => no_args("virtualcam", rest).map(|()| Self::ToggleVirtualCam),
            "scene" => one_arg("scene", "scene name", rest)
                .map(|scene_name| Self::SwitchScene { scene_name }),
            "input_toggle" => one_arg("input_toggle", "input name", rest)
                .map(|input_name| Self::ToggleInput { input_name }),
            other => Err(UsageError::UnknownCommand(other.to_string())),
        }
    }

    /// Command name as typed on the command line.
    #[must_use]
    pub const fn command(&self) -> &'static str {
        match self {
            Self::ToggleRecord => "record",
            Self::ToggleStream => "stream",
            Self::ToggleVirtualCam => "virtualcam",
            Self::SwitchScene { .. } => "scene",
            Self::ToggleInput { .. } => "input_toggle",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SwitchScene { scene_name } => write!(f, "scene '{scene_name}'"),
            Self::ToggleInput { input_name } => write!(f, "input_toggle '{input_name}'"),
            other => f.write_str(other.command()),
        }
    }
}

fn no_args<S: AsRef<str>>(command: &'static str, rest: &[S]) -> Result<(), UsageError> {
    match rest.first() {
        None => Ok(()),
        Some(extra) => Err(UsageError::UnexpectedArgument {
            command,
            extra: extra.as_ref().to_string(),
        }),
    }
}

fn one_arg<S: AsRef<str>>(
    command: &'static str,
    argument: &'static str,
    rest: &[S],
) -> Result<String, UsageError> {
    match rest {
        [name] if !name.as_ref().trim().is_empty() => Ok(name.as_ref().to_string()),
        [_, extra, ..] => Err(UsageError::UnexpectedArgument {
            command,
            extra: extra.as_ref().to_string(),
        }),
        _ => Err(UsageError::MissingArgument { command, argument }),
    }
}
