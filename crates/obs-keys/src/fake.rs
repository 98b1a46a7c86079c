//! In-memory OBS used by unit tests.
//!
//! Tracks connect and close calls, records every request and simulates the
//! server side state the control commands touch.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, Mutex};

use obs_proto::codes::request_status;
use obs_proto::{Request, RequestResponse};
use serde_json::{Value, json};
use tokio::sync::Notify;

use crate::config::{ConnectionConfig, Timeouts};
use crate::error::{ErrorKind, ObsError};
use crate::transport::{Connection, Connector};

#[derive(Debug, Default)]
struct FakeState {
    record_active: bool,
    stream_active: bool,
    virtualcam_active: bool,
    scenes: BTreeSet<String>,
    current_scene: Option<String>,
    inputs: BTreeMap<String, bool>,

    connect_error: Option<ErrorKind>,
    failing_request: Option<String>,
    hang_on: Option<String>,
    malformed_status: bool,
    stale_status: bool,

    connects: usize,
    closes: usize,
    requests: Vec<(String, Option<Value>)>,
}

enum Step {
    Reply(RequestResponse),
    Fail(String),
    Hang,
}

/// Shared handle; clones observe the same state.
#[derive(Debug, Clone, Default)]
pub struct FakeObs {
    state: Arc<Mutex<FakeState>>,
    hung: Arc<Notify>,
}

impl FakeObs {
    pub fn new() -> Self {
        Self::default()
    }

    fn update(self, f: impl FnOnce(&mut FakeState)) -> Self {
        f(&mut self.state.lock().unwrap());
        self
    }

    pub fn with_record_active(self, active: bool) -> Self {
        self.update(|s| s.record_active = active)
    }

    pub fn with_stream_active(self, active: bool) -> Self {
        self.update(|s| s.stream_active = active)
    }

    pub fn with_scene(self, name: &str) -> Self {
        self.update(|s| {
            s.scenes.insert(name.to_string());
        })
    }

    pub fn with_input(self, name: &str, muted: bool) -> Self {
        self.update(|s| {
            s.inputs.insert(name.to_string(), muted);
        })
    }

    /// Every connect attempt fails with an error of `kind`.
    pub fn failing_connect(self, kind: ErrorKind) -> Self {
        self.update(|s| s.connect_error = Some(kind))
    }

    /// Requests of this type fail at the socket level.
    pub fn failing_request(self, request_type: &str) -> Self {
        self.update(|s| s.failing_request = Some(request_type.to_string()))
    }

    /// Requests of this type never get a response.
    pub fn hanging_on(self, request_type: &str) -> Self {
        self.update(|s| s.hang_on = Some(request_type.to_string()))
    }

    /// Output status responses omit `outputActive`.
    pub fn with_malformed_status(self) -> Self {
        self.update(|s| s.malformed_status = true)
    }

    /// Every output flips right after its status is read, as if another
    /// client toggled it in between.
    pub fn with_stale_status(self) -> Self {
        self.update(|s| s.stale_status = true)
    }

    pub fn connect_calls(&self) -> usize {
        self.state.lock().unwrap().connects
    }

    pub fn close_calls(&self) -> usize {
        self.state.lock().unwrap().closes
    }

    pub fn requests(&self) -> Vec<(String, Option<Value>)> {
        self.state.lock().unwrap().requests.clone()
    }

    pub fn request_types(&self) -> Vec<String> {
        self.requests().into_iter().map(|(t, _)| t).collect()
    }

    pub fn input_muted(&self, name: &str) -> Option<bool> {
        self.state.lock().unwrap().inputs.get(name).copied()
    }

    pub fn current_scene(&self) -> Option<String> {
        self.state.lock().unwrap().current_scene.clone()
    }

    /// Resolves once a request has entered a hang.
    pub async fn wait_for_hang(&self) {
        self.hung.notified().await;
    }

    fn step(&self, request_type: &str, request_data: Option<Value>) -> Step {
        let mut state = self.state.lock().unwrap();
        state
            .requests
            .push((request_type.to_string(), request_data.clone()));

        if state.failing_request.as_deref() == Some(request_type) {
            return Step::Fail("connection reset by peer".into());
        }
        if state.hang_on.as_deref() == Some(request_type) {
            return Step::Hang;
        }

        let request = Request::new(request_type, request_data.clone());
        let data = request_data.unwrap_or(Value::Null);
        let name = |field: &str| data.get(field).and_then(Value::as_str).map(str::to_string);

        let reply = match request_type {
            "GetRecordStatus" | "GetStreamStatus" | "GetVirtualCamStatus" => {
                let slot = output_slot(&mut state, request_type);
                let active = *slot;
                if state.stale_status {
                    *output_slot(&mut state, request_type) = !active;
                }
                if state.malformed_status {
                    RequestResponse::ok(&request, Some(json!({})))
                } else {
                    RequestResponse::ok(&request, Some(json!({ "outputActive": active })))
                }
            }
            "StartRecord" | "StartStream" | "StartVirtualCam" => {
                let slot = output_slot(&mut state, request_type);
                if *slot {
                    RequestResponse::failed(&request, request_status::OUTPUT_RUNNING, "already running")
                } else {
                    *slot = true;
                    RequestResponse::ok(&request, None)
                }
            }
            "StopRecord" | "StopStream" | "StopVirtualCam" => {
                let slot = output_slot(&mut state, request_type);
                if *slot {
                    *slot = false;
                    RequestResponse::ok(&request, None)
                } else {
                    RequestResponse::failed(&request, request_status::OUTPUT_NOT_RUNNING, "not running")
                }
            }
            "SetCurrentProgramScene" => match name("sceneName") {
                Some(scene) if state.scenes.contains(&scene) => {
                    state.current_scene = Some(scene);
                    RequestResponse::ok(&request, None)
                }
                other => not_found(&request, other),
            },
            "GetInputMute" => match name("inputName").and_then(|n| state.inputs.get(&n).copied()) {
                Some(muted) => RequestResponse::ok(&request, Some(json!({ "inputMuted": muted }))),
                None => not_found(&request, name("inputName")),
            },
            "SetInputMute" => {
                let muted = data.get("inputMuted").and_then(Value::as_bool);
                match (name("inputName"), muted) {
                    (Some(input), Some(muted)) if state.inputs.contains_key(&input) => {
                        state.inputs.insert(input, muted);
                        RequestResponse::ok(&request, None)
                    }
                    (input, _) => not_found(&request, input),
                }
            }
            other => RequestResponse::failed(
                &request,
                request_status::UNKNOWN_REQUEST_TYPE,
                format!("unknown request type {other}"),
            ),
        };
        Step::Reply(reply)
    }
}

fn output_slot<'a>(state: &'a mut FakeState, request_type: &str) -> &'a mut bool {
    if request_type.contains("Record") {
        &mut state.record_active
    } else if request_type.contains("Stream") {
        &mut state.stream_active
    } else {
        &mut state.virtualcam_active
    }
}

fn not_found(request: &Request, name: Option<String>) -> RequestResponse {
    RequestResponse::failed(
        request,
        request_status::RESOURCE_NOT_FOUND,
        format!(
            "No source was found by the name of `{}`.",
            name.unwrap_or_default()
        ),
    )
}

fn error_of_kind(kind: ErrorKind) -> ObsError {
    match kind {
        ErrorKind::Auth => ObsError::Auth("password rejected by server".into()),
        ErrorKind::Config => ObsError::Config("bad config".into()),
        ErrorKind::NotFound => ObsError::NotFound("thing".into()),
        ErrorKind::Transport => ObsError::Transport("socket closed".into()),
        ErrorKind::Interrupted => ObsError::Interrupted,
        ErrorKind::Network | ErrorKind::Usage => {
            ObsError::Network("connection refused".into())
        }
    }
}

#[derive(Debug)]
pub struct FakeConnection {
    obs: FakeObs,
}

impl Connector for FakeObs {
    type Connection = FakeConnection;

    async fn connect(
        &self,
        _config: &ConnectionConfig,
        _timeouts: Timeouts,
    ) -> Result<FakeConnection, ObsError> {
        let error = {
            let mut state = self.state.lock().unwrap();
            state.connects += 1;
            state.connect_error
        };
        match error {
            Some(kind) => Err(error_of_kind(kind)),
            None => Ok(FakeConnection { obs: self.clone() }),
        }
    }
}

impl Connection for FakeConnection {
    async fn request(
        &mut self,
        request_type: &str,
        request_data: Option<Value>,
    ) -> Result<RequestResponse, ObsError> {
        match self.obs.step(request_type, request_data) {
            Step::Reply(response) => Ok(response),
            Step::Fail(reason) => Err(ObsError::Transport(reason)),
            Step::Hang => {
                self.obs.hung.notify_one();
                std::future::pending().await
            }
        }
    }

    async fn close(self) -> Result<(), ObsError> {
        self.obs.state.lock().unwrap().closes += 1;
        Ok(())
    }
}
