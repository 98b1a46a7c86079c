//! Control session: executes one [`Action`] against OBS.
//!
//! The session owns the connection for the lifetime of an invocation and
//! moves through
//!
//! ```text
//! Unconnected ──► Connecting ──► Ready ──► Executing ──► Ready ──► Closed
//!                     │                        │
//!                     └──────► Closed ◄────────┘ (transport failure)
//! ```
//!
//! The connection is opened lazily by the first [`ControlSession::execute`]
//! and is never reopened once closed.
//!
//! Toggles read the current state and then write its negation as two
//! sequential requests. Nothing prevents another client from changing the
//! same state between the read and the write; the write then acts on the
//! stale read. obs-websocket offers no conditional set, so this race is
//! accepted.

use std::fmt;

use obs_proto::{ProtoError, RequestResponse};
use serde::Serialize;
use serde_json::{Value, json};
use tracing::{debug, trace};

use crate::action::{Action, Output};
use crate::config::Settings;
use crate::error::ObsError;
use crate::transport::{Connection, Connector};

/// Lifecycle of a [`ControlSession`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No connection attempted yet.
    Unconnected,
    /// Connecting and identifying.
    Connecting,
    /// Identified and idle.
    Ready,
    /// An action is in flight.
    Executing,
    /// Connection released or never established. Terminal.
    Closed,
}

/// Result of a successfully executed action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// An output was started (`active`) or stopped.
    Output {
        /// Toggled output.
        output: Output,
        /// State after the toggle.
        active: bool,
    },
    /// The program scene changed.
    SceneSwitched {
        /// New program scene.
        scene_name: String,
    },
    /// An input's mute state flipped.
    InputMute {
        /// Toggled input.
        input_name: String,
        /// State after the toggle.
        muted: bool,
    },
}

/// Serializable summary of an [`Outcome`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutcomeReport<'a> {
    /// Command that ran.
    pub action: &'static str,
    /// Scene or input name, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<&'a str>,
    /// What happened.
    pub result: &'static str,
}

impl Outcome {
    /// Command name that produced this outcome.
    #[must_use]
    pub const fn action(&self) -> &'static str {
        match self {
            Self::Output {
                output: Output::Record,
                ..
            } => "record",
            Self::Output {
                output: Output::Stream,
                ..
            } => "stream",
            Self::Output {
                output: Output::VirtualCam,
                ..
            } => "virtualcam",
            Self::SceneSwitched { .. } => "scene",
            Self::InputMute { .. } => "input_toggle",
        }
    }

    /// Summary for structured output.
    #[must_use]
    pub fn report(&self) -> OutcomeReport<'_> {
        let (target, result) = match self {
            Self::Output { active: true, .. } => (None, "started"),
            Self::Output { active: false, .. } => (None, "stopped"),
            Self::SceneSwitched { scene_name } => (Some(scene_name.as_str()), "switched"),
            Self::InputMute {
                input_name,
                muted: true,
            } => (Some(input_name.as_str()), "muted"),
            Self::InputMute {
                input_name,
                muted: false,
            } => (Some(input_name.as_str()), "unmuted"),
        };
        OutcomeReport {
            action: self.action(),
            target,
            result,
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Output { output, active } => write!(
                f,
                "{} {}",
                output.noun(),
                if *active { "started" } else { "stopped" }
            ),
            Self::SceneSwitched { scene_name } => write!(f, "switched to scene '{scene_name}'"),
            Self::InputMute { input_name, muted } => write!(
                f,
                "input '{input_name}' {}",
                if *muted { "muted" } else { "unmuted" }
            ),
        }
    }
}

/// Owns the connection and executes actions for one invocation.
pub struct ControlSession<C: Connector> {
    connector: C,
    settings: Settings,
    state: SessionState,
    connection: Option<C::Connection>,
}

impl<C: Connector> fmt::Debug for ControlSession<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ControlSession")
            .field("settings", &self.settings)
            .field("state", &self.state)
            .field("connected", &self.connection.is_some())
            .finish_non_exhaustive()
    }
}

impl<C: Connector> ControlSession<C> {
    /// Create a session. No connection is made until the first `execute`.
    #[must_use]
    pub const fn new(connector: C, settings: Settings) -> Self {
        Self {
            connector,
            settings,
            state: SessionState::Unconnected,
            connection: None,
        }
    }

    /// Current lifecycle state.
    #[must_use]
    pub const fn state(&self) -> SessionState {
        self.state
    }

    fn transition(&mut self, next: SessionState) {
        trace!(from = ?self.state, to = ?next, "Session state change");
        self.state = next;
    }

    /// Execute one action, connecting first if needed.
    ///
    /// A transport failure closes the connection; a missing scene or input
    /// leaves it usable.
    ///
    /// # Errors
    ///
    /// Returns the connection error if connecting fails, [`ObsError::NotFound`]
    /// for an unknown scene or input, and [`ObsError::Transport`] for any
    /// other failed exchange or when the session is already closed.
    pub async fn execute(&mut self, action: &Action) -> Result<Outcome, ObsError> {
        self.ensure_connected().await?;
        self.transition(SessionState::Executing);

        let Some(connection) = self.connection.as_mut() else {
            self.transition(SessionState::Closed);
            return Err(ObsError::Transport("session is closed".into()));
        };
        debug!(%action, "Executing action");

        let result = match action {
            Action::SwitchScene { scene_name } => switch_scene(connection, scene_name).await,
            Action::ToggleInput { input_name } => toggle_input(connection, input_name).await,
            Action::ToggleRecord => toggle_output(connection, Output::Record).await,
            Action::ToggleStream => toggle_output(connection, Output::Stream).await,
            Action::ToggleVirtualCam => toggle_output(connection, Output::VirtualCam).await,
        };

        match &result {
            Err(ObsError::Transport(reason)) => {
                debug!(%reason, "Exchange failed, closing connection");
                self.shutdown().await;
            }
            _ => self.transition(SessionState::Ready),
        }
        result
    }

    async fn ensure_connected(&mut self) -> Result<(), ObsError> {
        match self.state {
            SessionState::Ready => Ok(()),
            SessionState::Unconnected => {
                self.transition(SessionState::Connecting);
                match self
                    .connector
                    .connect(&self.settings.connection, self.settings.timeouts)
                    .await
                {
                    Ok(connection) => {
                        self.connection = Some(connection);
                        self.transition(SessionState::Ready);
                        Ok(())
                    }
                    Err(err) => {
                        debug!(error = %err, "Connection failed");
                        self.transition(SessionState::Closed);
                        Err(err)
                    }
                }
            }
            SessionState::Connecting | SessionState::Executing | SessionState::Closed => Err(
                ObsError::Transport(format!("session is not ready ({:?})", self.state)),
            ),
        }
    }

    /// Release the connection. Safe to call on every exit path; the
    /// connection is closed at most once.
    pub async fn shutdown(&mut self) {
        if let Some(connection) = self.connection.take() {
            debug!("Closing connection");
            if let Err(err) = connection.close().await {
                debug!(error = %err, "Error while closing connection");
            }
        }
        self.transition(SessionState::Closed);
    }
}

/// Turn a failed request status into a typed error and return the body.
fn into_data(response: RequestResponse, target: Option<&str>) -> Result<Option<Value>, ObsError> {
    let status = response.request_status;
    if status.result {
        return Ok(response.response_data);
    }

    let not_found = status.is_not_found();
    let comment = status.comment.unwrap_or_default();
    if not_found {
        let what = target.map_or_else(|| comment.clone(), ToString::to_string);
        return Err(ObsError::NotFound(what));
    }
    Err(ObsError::Transport(format!(
        "{} failed (code {}): {comment}",
        response.request_type, status.code
    )))
}

fn read_bool(
    data: Option<&Value>,
    field: &'static str,
    request_type: &str,
) -> Result<bool, ObsError> {
    data.and_then(|d| d.get(field))
        .and_then(Value::as_bool)
        .ok_or_else(|| {
            ObsError::Transport(format!(
                "malformed {request_type} response: {}",
                ProtoError::MissingField(field)
            ))
        })
}

async fn toggle_output<T: Connection>(
    connection: &mut T,
    output: Output,
) -> Result<Outcome, ObsError> {
    let status_request = output.status_request();
    let data = into_data(connection.request(status_request, None).await?, None)?;
    let active = read_bool(data.as_ref(), "outputActive", status_request)?;

    let next = if active {
        output.stop_request()
    } else {
        output.start_request()
    };
    debug!(output = output.noun(), active, request = next, "Toggling output");
    into_data(connection.request(next, None).await?, None)?;

    Ok(Outcome::Output {
        output,
        active: !active,
    })
}

async fn switch_scene<T: Connection>(
    connection: &mut T,
    scene_name: &str,
) -> Result<Outcome, ObsError> {
    let target = format!("scene '{scene_name}'");
    let response = connection
        .request(
            "SetCurrentProgramScene",
            Some(json!({ "sceneName": scene_name })),
        )
        .await?;
    into_data(response, Some(&target))?;

    Ok(Outcome::SceneSwitched {
        scene_name: scene_name.to_string(),
    })
}

async fn toggle_input<T: Connection>(
    connection: &mut T,
    input_name: &str,
) -> Result<Outcome, ObsError> {
    let target = format!("input '{input_name}'");
    let response = connection
        .request("GetInputMute", Some(json!({ "inputName": input_name })))
        .await?;
    let data = into_data(response, Some(&target))?;
    let muted = read_bool(data.as_ref(), "inputMuted", "GetInputMute")?;

    debug!(input = input_name, muted, "Toggling input mute");
    let response = connection
        .request(
            "SetInputMute",
            Some(json!({ "inputName": input_name, "inputMuted": !muted })),
        )
        .await?;
    into_data(response, Some(&target))?;

    Ok(Outcome::InputMute {
        input_name: input_name.to_string(),
        muted: !muted,
    })
}
