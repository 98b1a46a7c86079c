//! # obs-proto
//!
//! Message definitions for the OBS WebSocket v5 control protocol.
//!
//! Only the subset needed by request/response clients is modelled: the
//! identification handshake and the request/response exchange. Event
//! payloads are recognised by opcode and otherwise left opaque.
//!
//! ```text
//! ┌──────────┐  Hello (0)            ┌────────────┐
//! │          │◄──────────────────────│            │
//! │          │  Identify (1)         │            │
//! │  client  │──────────────────────►│ obs-studio │
//! │          │◄──────────────────────│            │
//! │          │  Identified (2)       │            │
//! │          │  Request (6) ───────► │            │
//! │          │◄─── RequestResponse (7)            │
//! └──────────┘                       └────────────┘
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod auth;
pub mod codes;
pub mod error;
pub mod messages;

pub use auth::authentication_string;
pub use error::ProtoError;
pub use messages::{
    Authentication, Frame, Hello, Identified, Identify, OpCode, Request, RequestResponse,
    RequestStatus, RPC_VERSION,
};
