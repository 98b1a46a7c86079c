//! Transport seam between the control session and the wire.
//!
//! The session only ever talks to these traits. [`crate::client::WsConnector`]
//! implements them over a real WebSocket; tests substitute in-memory fakes.

use std::future::Future;

use obs_proto::RequestResponse;
use serde_json::Value;

use crate::config::{ConnectionConfig, Timeouts};
use crate::error::ObsError;

/// Opens identified connections to an OBS server.
pub trait Connector: Send + Sync {
    /// Connection type produced by this connector.
    type Connection: Connection;

    /// Connect and complete the identification handshake.
    ///
    /// # Errors
    ///
    /// Returns [`ObsError::Auth`] if the credentials are rejected and
    /// [`ObsError::Network`] for unreachable hosts, handshake failures or
    /// timeouts.
    fn connect(
        &self,
        config: &ConnectionConfig,
        timeouts: Timeouts,
    ) -> impl Future<Output = Result<Self::Connection, ObsError>> + Send;
}

/// An identified connection able to run request/response exchanges.
pub trait Connection: Send {
    /// Send one request and wait for its response.
    ///
    /// A response whose status reports failure is still `Ok`; classifying
    /// it is up to the caller.
    ///
    /// # Errors
    ///
    /// Returns [`ObsError::Transport`] if the socket fails, the response is
    /// malformed or the request times out.
    fn request(
        &mut self,
        request_type: &str,
        request_data: Option<Value>,
    ) -> impl Future<Output = Result<RequestResponse, ObsError>> + Send;

    /// Close the connection.
    ///
    /// # Errors
    ///
    /// Returns [`ObsError::Transport`] if the close frame cannot be sent.
    fn close(self) -> impl Future<Output = Result<(), ObsError>> + Send;
}
