//! Protocol message definitions.
//!
//! Every frame on the wire is a JSON object `{"op": <opcode>, "d": {...}}`.
//! [`Frame`] carries the opcode and the raw payload; the typed payload
//! structs below are decoded from it once the opcode is known.
//!
//! # Example
//!
//! ```rust
//! use obs_proto::{Frame, Hello, OpCode};
//!
//! let frame = Frame::from_json(r#"{
//!     "op": 0,
//!     "d": { "obsWebSocketVersion": "5.1.0", "rpcVersion": 1 }
//! }"#).unwrap();
//! assert_eq!(frame.op, OpCode::Hello);
//!
//! let hello: Hello = frame.into_payload(OpCode::Hello).unwrap();
//! assert!(hello.authentication.is_none());
//! ```

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::ProtoError;
use crate::auth::authentication_string;
use crate::codes::request_status;

/// RPC version spoken by this crate.
pub const RPC_VERSION: u32 = 1;

/// Frame opcodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum OpCode {
    /// Server greeting, first frame on a new connection.
    Hello = 0,
    /// Client identification in response to `Hello`.
    Identify = 1,
    /// Server acknowledgement of a successful `Identify`.
    Identified = 2,
    /// Client update of session parameters.
    Reidentify = 3,
    /// Server event.
    Event = 5,
    /// Client request.
    Request = 6,
    /// Server response to a `Request`.
    RequestResponse = 7,
    /// Client batch request.
    RequestBatch = 8,
    /// Server response to a `RequestBatch`.
    RequestBatchResponse = 9,
}

impl From<OpCode> for u8 {
    fn from(op: OpCode) -> Self {
        op as Self
    }
}

impl TryFrom<u8> for OpCode {
    type Error = ProtoError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Hello),
            1 => Ok(Self::Identify),
            2 => Ok(Self::Identified),
            3 => Ok(Self::Reidentify),
            5 => Ok(Self::Event),
            6 => Ok(Self::Request),
            7 => Ok(Self::RequestResponse),
            8 => Ok(Self::RequestBatch),
            9 => Ok(Self::RequestBatchResponse),
            other => Err(ProtoError::Decoding(format!("unknown opcode {other}"))),
        }
    }
}

/// A single protocol frame with an undecoded payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    /// Frame opcode.
    pub op: OpCode,
    /// Raw payload.
    #[serde(rename = "d")]
    pub data: Value,
}

impl Frame {
    /// Build a frame from a typed payload.
    ///
    /// # Errors
    ///
    /// Returns an error if the payload cannot be serialized.
    pub fn new<T: Serialize>(op: OpCode, payload: &T) -> Result<Self, ProtoError> {
        let data =
            serde_json::to_value(payload).map_err(|e| ProtoError::Encoding(e.to_string()))?;
        Ok(Self { op, data })
    }

    /// Build an `Identify` frame.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn identify(identify: &Identify) -> Result<Self, ProtoError> {
        Self::new(OpCode::Identify, identify)
    }

    /// Build a `Request` frame.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn request(request: &Request) -> Result<Self, ProtoError> {
        Self::new(OpCode::Request, request)
    }

    /// Serialize to JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String, ProtoError> {
        serde_json::to_string(self).map_err(|e| ProtoError::Encoding(e.to_string()))
    }

    /// Deserialize from JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not a valid frame.
    pub fn from_json(json: &str) -> Result<Self, ProtoError> {
        serde_json::from_str(json).map_err(|e| ProtoError::Decoding(e.to_string()))
    }

    /// Decode the payload after checking the opcode.
    ///
    /// # Errors
    ///
    /// Returns [`ProtoError::UnexpectedOpCode`] if the frame carries a
    /// different opcode, or a decoding error if the payload does not match `T`.
    pub fn into_payload<T: DeserializeOwned>(self, expected: OpCode) -> Result<T, ProtoError> {
        if self.op != expected {
            return Err(ProtoError::UnexpectedOpCode {
                expected,
                actual: self.op,
            });
        }
        serde_json::from_value(self.data).map_err(|e| ProtoError::Decoding(e.to_string()))
    }
}

/// Authentication challenge offered in `Hello`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Authentication {
    /// Per-connection challenge.
    pub challenge: String,
    /// Per-server salt.
    pub salt: String,
}

/// `Hello` payload (opcode 0).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hello {
    /// Server plugin version.
    pub obs_web_socket_version: String,
    /// Latest RPC version the server supports.
    pub rpc_version: u32,
    /// Present when the server requires authentication.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authentication: Option<Authentication>,
}

impl Hello {
    /// Whether the server demands an authentication string.
    #[must_use]
    pub const fn requires_auth(&self) -> bool {
        self.authentication.is_some()
    }
}

/// `Identify` payload (opcode 1).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identify {
    /// RPC version the client wants to use.
    pub rpc_version: u32,
    /// Authentication string, required when `Hello` carried a challenge.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authentication: Option<String>,
    /// Bitmask of event categories to receive.
    pub event_subscriptions: u32,
}

impl Identify {
    /// Answer a `Hello`, deriving the authentication string if one is required.
    ///
    /// No events are subscribed to.
    #[must_use]
    pub fn respond_to(hello: &Hello, password: &str) -> Self {
        let authentication = hello
            .authentication
            .as_ref()
            .map(|auth| authentication_string(password, &auth.salt, &auth.challenge));
        Self {
            rpc_version: RPC_VERSION.min(hello.rpc_version),
            authentication,
            event_subscriptions: 0,
        }
    }
}

/// `Identified` payload (opcode 2).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identified {
    /// RPC version both sides agreed on.
    pub negotiated_rpc_version: u32,
}

/// `Request` payload (opcode 6).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Request {
    /// Request type, e.g. `GetRecordStatus`.
    pub request_type: String,
    /// Client-chosen id echoed back in the response.
    pub request_id: String,
    /// Request parameters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_data: Option<Value>,
}

impl Request {
    /// Create a request with a fresh random id.
    #[must_use]
    pub fn new(request_type: impl Into<String>, request_data: Option<Value>) -> Self {
        Self {
            request_type: request_type.into(),
            request_id: Uuid::new_v4().to_string(),
            request_data,
        }
    }
}

/// Outcome block of a `RequestResponse`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestStatus {
    /// Whether the request succeeded.
    pub result: bool,
    /// Status code, see [`crate::codes::request_status`].
    pub code: u16,
    /// Optional human-readable detail from the server.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

impl RequestStatus {
    /// Successful status.
    #[must_use]
    pub const fn success() -> Self {
        Self {
            result: true,
            code: request_status::SUCCESS,
            comment: None,
        }
    }

    /// Failed status with a code and comment.
    #[must_use]
    pub fn failure(code: u16, comment: impl Into<String>) -> Self {
        Self {
            result: false,
            code,
            comment: Some(comment.into()),
        }
    }

    /// Whether the server reported a missing scene, input or other resource.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        !self.result && self.code == request_status::RESOURCE_NOT_FOUND
    }
}

/// `RequestResponse` payload (opcode 7).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestResponse {
    /// Echo of the request type.
    pub request_type: String,
    /// Echo of the request id.
    pub request_id: String,
    /// Success flag and code.
    pub request_status: RequestStatus,
    /// Response body, absent for requests that return nothing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_data: Option<Value>,
}

impl RequestResponse {
    /// Build a successful response to `request`.
    #[must_use]
    pub fn ok(request: &Request, response_data: Option<Value>) -> Self {
        Self {
            request_type: request.request_type.clone(),
            request_id: request.request_id.clone(),
            request_status: RequestStatus::success(),
            response_data,
        }
    }

    /// Build a failed response to `request`.
    #[must_use]
    pub fn failed(request: &Request, code: u16, comment: impl Into<String>) -> Self {
        Self {
            request_type: request.request_type.clone(),
            request_id: request.request_id.clone(),
            request_status: RequestStatus::failure(code, comment),
            response_data: None,
        }
    }
}
