//! Mock obs-websocket server shared by the integration tests.

#![allow(dead_code, clippy::unwrap_used, clippy::expect_used)]

use std::collections::{BTreeMap, BTreeSet};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use futures::{SinkExt, StreamExt};
use obs_proto::codes::{close_code, request_status};
use obs_proto::{
    Authentication, Frame, Hello, Identified, Identify, OpCode, Request, RequestResponse,
    authentication_string,
};
use serde_json::{Value, json};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::{WebSocketStream, accept_async};

pub const SALT: &str = "lM1GncleQOaCu9lT1yeUZhFYnqhsLLP1G5lAGo3ixaI=";
pub const CHALLENGE: &str = "+IxH4CnCiqpX1rM9scsNynZzbOe4KhDeYcTNS3PDaeY=";

/// Server-side state the mock simulates.
#[derive(Debug, Default)]
pub struct MockState {
    pub password: Option<String>,
    pub record_active: bool,
    pub stream_active: bool,
    pub virtualcam_active: bool,
    pub scenes: BTreeSet<String>,
    pub current_scene: Option<String>,
    pub inputs: BTreeMap<String, bool>,
    /// Requests of this type never get a response.
    pub hang_on: Option<String>,
    /// Send an event and an unrelated response before every real response.
    pub noisy: bool,

    pub requests: Vec<String>,
    pub identified: bool,
    pub closed_by_client: bool,
}

/// A mock OBS server bound to an ephemeral port.
pub struct MockObs {
    listener: TcpListener,
    addr: SocketAddr,
    state: Arc<Mutex<MockState>>,
}

impl MockObs {
    /// Bind to an available port.
    pub async fn new() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind mock server");
        let addr = listener.local_addr().expect("no local address");
        Self {
            listener,
            addr,
            state: Arc::default(),
        }
    }

    pub fn configure(self, f: impl FnOnce(&mut MockState)) -> Self {
        f(&mut self.state.lock().unwrap());
        self
    }

    pub fn port(&self) -> u16 {
        self.addr.port()
    }

    pub fn state(&self) -> Arc<Mutex<MockState>> {
        Arc::clone(&self.state)
    }

    /// Serve a single connection in the background.
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(async move {
            let (stream, _) = self.listener.accept().await.expect("accept failed");
            let ws = accept_async(stream).await.expect("upgrade failed");
            serve(ws, &self.state).await;
        })
    }
}

async fn send(ws: &mut WebSocketStream<TcpStream>, frame: &Frame) {
    let json = frame.to_json().expect("encode failed");
    let _ = ws.send(Message::Text(json.into())).await;
}

async fn next_frame(ws: &mut WebSocketStream<TcpStream>) -> Option<Frame> {
    while let Some(Ok(message)) = ws.next().await {
        match message {
            Message::Text(text) => return Frame::from_json(text.as_str()).ok(),
            Message::Close(_) => return None,
            _ => {}
        }
    }
    None
}

async fn serve(mut ws: WebSocketStream<TcpStream>, state: &Mutex<MockState>) {
    let password = state.lock().unwrap().password.clone();
    let hello = Hello {
        obs_web_socket_version: "5.5.0".into(),
        rpc_version: 1,
        authentication: password.as_ref().map(|_| Authentication {
            challenge: CHALLENGE.into(),
            salt: SALT.into(),
        }),
    };
    send(&mut ws, &Frame::new(OpCode::Hello, &hello).unwrap()).await;

    let Some(frame) = next_frame(&mut ws).await else {
        return;
    };
    let identify: Identify = frame.into_payload(OpCode::Identify).expect("expected Identify");

    if let Some(password) = password {
        let expected = authentication_string(&password, SALT, CHALLENGE);
        if identify.authentication.as_deref() != Some(expected.as_str()) {
            let _ = ws
                .close(Some(CloseFrame {
                    code: CloseCode::from(close_code::AUTHENTICATION_FAILED),
                    reason: "Authentication failed.".into(),
                }))
                .await;
            return;
        }
    }

    let identified = Identified {
        negotiated_rpc_version: identify.rpc_version,
    };
    send(&mut ws, &Frame::new(OpCode::Identified, &identified).unwrap()).await;
    state.lock().unwrap().identified = true;

    while let Some(frame) = next_frame(&mut ws).await {
        let Ok(request) = frame.into_payload::<Request>(OpCode::Request) else {
            continue;
        };
        let (reply, noisy) = {
            let mut state = state.lock().unwrap();
            state.requests.push(request.request_type.clone());
            if state.hang_on.as_deref() == Some(request.request_type.as_str()) {
                continue;
            }
            (handle(&mut state, &request), state.noisy)
        };

        if noisy {
            let event = json!({
                "eventType": "CurrentProgramSceneChanged",
                "eventIntent": 4,
                "eventData": { "sceneName": "Elsewhere" }
            });
            send(&mut ws, &Frame::new(OpCode::Event, &event).unwrap()).await;
            let mut other = reply.clone();
            other.request_id = "someone-else".into();
            send(&mut ws, &Frame::new(OpCode::RequestResponse, &other).unwrap()).await;
        }
        send(&mut ws, &Frame::new(OpCode::RequestResponse, &reply).unwrap()).await;
    }
    state.lock().unwrap().closed_by_client = true;
}

fn handle(state: &mut MockState, request: &Request) -> RequestResponse {
    let data = request.request_data.clone().unwrap_or(Value::Null);
    let name = |field: &str| data.get(field).and_then(Value::as_str).map(str::to_string);
    let not_found = |name: Option<String>| {
        RequestResponse::failed(
            request,
            request_status::RESOURCE_NOT_FOUND,
            format!("No source was found by the name of `{}`.", name.unwrap_or_default()),
        )
    };

    match request.request_type.as_str() {
        "GetRecordStatus" => output_status(request, state.record_active),
        "GetStreamStatus" => output_status(request, state.stream_active),
        "GetVirtualCamStatus" => output_status(request, state.virtualcam_active),
        "StartRecord" => set_output(request, &mut state.record_active, true),
        "StopRecord" => set_output(request, &mut state.record_active, false),
        "StartStream" => set_output(request, &mut state.stream_active, true),
        "StopStream" => set_output(request, &mut state.stream_active, false),
        "StartVirtualCam" => set_output(request, &mut state.virtualcam_active, true),
        "StopVirtualCam" => set_output(request, &mut state.virtualcam_active, false),
        "SetCurrentProgramScene" => match name("sceneName") {
            Some(scene) if state.scenes.contains(&scene) => {
                state.current_scene = Some(scene);
                RequestResponse::ok(request, None)
            }
            other => not_found(other),
        },
        "GetInputMute" => match name("inputName").and_then(|n| state.inputs.get(&n).copied()) {
            Some(muted) => RequestResponse::ok(request, Some(json!({ "inputMuted": muted }))),
            None => not_found(name("inputName")),
        },
        "SetInputMute" => {
            let muted = data.get("inputMuted").and_then(Value::as_bool);
            match (name("inputName"), muted) {
                (Some(input), Some(muted)) if state.inputs.contains_key(&input) => {
                    state.inputs.insert(input, muted);
                    RequestResponse::ok(request, None)
                }
                (input, _) => not_found(input),
            }
        }
        other => RequestResponse::failed(
            request,
            request_status::UNKNOWN_REQUEST_TYPE,
            format!("Your request type is not valid: {other}"),
        ),
    }
}

fn output_status(request: &Request, active: bool) -> RequestResponse {
    RequestResponse::ok(request, Some(json!({ "outputActive": active })))
}

fn set_output(request: &Request, slot: &mut bool, active: bool) -> RequestResponse {
    if *slot == active {
        let code = if active {
            request_status::OUTPUT_RUNNING
        } else {
            request_status::OUTPUT_NOT_RUNNING
        };
        return RequestResponse::failed(request, code, "");
    }
    *slot = active;
    RequestResponse::ok(request, None)
}
