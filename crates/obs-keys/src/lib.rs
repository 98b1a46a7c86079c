//! # obs-keys
//!
//! Command-line remote control for OBS Studio.
//!
//! Each invocation performs one action:
//! - toggle recording, streaming or the virtual camera
//! - switch the program scene
//! - toggle the mute state of an audio input
//!
//! # Architecture
//!
//! The [`dispatch::Dispatcher`] validates the command tokens into an
//! [`Action`] before anything touches the network. A [`ControlSession`]
//! then connects lazily through a [`transport::Connector`] and runs the
//! read-then-write exchange. [`client::ObsClient`] is the WebSocket
//! implementation of the transport, speaking the protocol defined in
//! `obs-proto`.
//!
//! ```text
//! ┌───────────┐   obs-websocket v5   ┌─────────────┐
//! │  obs-keys │◄────────────────────►│  OBS Studio │
//! └───────────┘     (WebSocket)      └─────────────┘
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod action;
pub mod cli;
pub mod client;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod output;
pub mod session;
pub mod transport;

#[cfg(test)]
mod fake;

pub use action::{Action, Output};
pub use cli::{Cli, Format};
pub use client::{ObsClient, WsConnector};
pub use config::{ConnectionConfig, Settings, Timeouts};
pub use dispatch::Dispatcher;
pub use error::{ErrorKind, ObsError, UsageError};
pub use output::OutputFormat;
pub use session::{ControlSession, Outcome, SessionState};
