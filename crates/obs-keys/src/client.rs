//! OBS WebSocket client.
//!
//! Connects to obs-websocket (protocol v5), performs the `Hello` /
//! `Identify` / `Identified` handshake and runs request/response
//! exchanges over JSON text frames.
//!
//! # Example
//!
//! ```rust,no_run
//! use obs_keys::client::ObsClient;
//! use obs_keys::config::ConnectionConfig;
//!
//! # async fn example() -> Result<(), obs_keys::ObsError> {
//! let mut client = ObsClient::connect(&ConnectionConfig::default()).await?;
//! let response = client.request("GetRecordStatus", None).await?;
//! println!("{:?}", response.response_data);
//! client.close().await?;
//! # Ok(())
//! # }
//! ```

use std::time::Duration;

use futures::{SinkExt, StreamExt};
use obs_proto::codes::close_code;
use obs_proto::{Frame, Hello, Identified, Identify, OpCode, Request, RequestResponse};
use serde_json::Value;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::{debug, trace};

use crate::config::{ConnectionConfig, Timeouts};
use crate::error::ObsError;
use crate::transport::{Connection, Connector};

/// Why reading the next frame failed.
#[derive(Debug)]
enum ReadError {
    /// The server closed the socket, possibly with a close frame.
    Closed(Option<(u16, String)>),
    /// The socket failed.
    Socket(String),
    /// A frame could not be decoded.
    Protocol(String),
}

impl ReadError {
    /// Map a failure during identification.
    fn into_handshake_error(self) -> ObsError {
        match self {
            Self::Closed(Some((code, reason))) if code == close_code::AUTHENTICATION_FAILED => {
                ObsError::Auth(if reason.is_empty() {
                    "password rejected by server".to_string()
                } else {
                    reason
                })
            }
            Self::Closed(Some((code, reason))) => ObsError::Network(format!(
                "server closed the connection during handshake (code {code}): {reason}"
            )),
            Self::Closed(None) => {
                ObsError::Network("server closed the connection during handshake".into())
            }
            Self::Socket(msg) | Self::Protocol(msg) => ObsError::Network(msg),
        }
    }

    /// Map a failure during a request/response exchange.
    fn into_exchange_error(self) -> ObsError {
        match self {
            Self::Closed(Some((code, reason))) => ObsError::Transport(format!(
                "connection closed by server (code {code}): {reason}"
            )),
            Self::Closed(None) => ObsError::Transport("connection closed by server".into()),
            Self::Socket(msg) | Self::Protocol(msg) => ObsError::Transport(msg),
        }
    }
}

fn close_details(frame: Option<CloseFrame<'_>>) -> Option<(u16, String)> {
    frame.map(|f| (u16::from(f.code), f.reason.into_owned()))
}

/// Identified obs-websocket connection.
pub struct ObsClient {
    /// WebSocket stream.
    ws: WebSocketStream<MaybeTlsStream<TcpStream>>,
    /// obs-websocket version reported in `Hello`.
    server_version: String,
    /// Negotiated RPC version.
    rpc_version: u32,
    /// Request timeout.
    request_timeout: Duration,
}

impl std::fmt::Debug for ObsClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObsClient")
            .field("server_version", &self.server_version)
            .field("rpc_version", &self.rpc_version)
            .field("request_timeout", &self.request_timeout)
            .finish_non_exhaustive()
    }
}

impl ObsClient {
    /// Connect with the default timeouts.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection or the handshake fails.
    pub async fn connect(config: &ConnectionConfig) -> Result<Self, ObsError> {
        Self::connect_with_timeouts(config, Timeouts::default()).await
    }

    /// Connect and identify, bounding the whole handshake by `timeouts.connect`.
    ///
    /// # Errors
    ///
    /// Returns [`ObsError::Auth`] if the server rejects the password or
    /// demands one that is not configured, and [`ObsError::Network`] for
    /// every other connection or handshake failure, including timeouts.
    pub async fn connect_with_timeouts(
        config: &ConnectionConfig,
        timeouts: Timeouts,
    ) -> Result<Self, ObsError> {
        let url = config.url();
        debug!(url = %url, "Connecting to OBS");

        let (ws, _response) = timeout(timeouts.connect, connect_async(url.as_str()))
            .await
            .map_err(|_| ObsError::Network(format!("timed out connecting to {url}")))?
            .map_err(|e| ObsError::Network(format!("{url}: {e}")))?;

        debug!("WebSocket connected, waiting for Hello");

        let mut client = Self {
            ws,
            server_version: String::new(),
            rpc_version: 0,
            request_timeout: timeouts.request,
        };

        timeout(timeouts.connect, client.identify(&config.password))
            .await
            .map_err(|_| ObsError::Network(format!("handshake with {url} timed out")))??;

        Ok(client)
    }

    async fn identify(&mut self, password: &str) -> Result<(), ObsError> {
        let hello: Hello = self
            .read_frame()
            .await
            .map_err(ReadError::into_handshake_error)?
            .into_payload(OpCode::Hello)
            .map_err(|e| ObsError::Network(format!("invalid Hello: {e}")))?;

        if hello.requires_auth() && password.is_empty() {
            return Err(ObsError::Auth(
                "server requires a password but none is configured".into(),
            ));
        }

        trace!(
            server_version = %hello.obs_web_socket_version,
            auth = hello.requires_auth(),
            "Received Hello"
        );

        let identify = Frame::identify(&Identify::respond_to(&hello, password))
            .map_err(|e| ObsError::Network(e.to_string()))?;
        self.send_frame(&identify)
            .await
            .map_err(|e| ObsError::Network(e.to_string()))?;

        let identified: Identified = self
            .read_frame()
            .await
            .map_err(ReadError::into_handshake_error)?
            .into_payload(OpCode::Identified)
            .map_err(|e| ObsError::Network(format!("invalid Identified: {e}")))?;

        self.server_version = hello.obs_web_socket_version;
        self.rpc_version = identified.negotiated_rpc_version;
        debug!(
            version = %self.server_version,
            rpc_version = self.rpc_version,
            "Handshake complete"
        );
        Ok(())
    }

    /// obs-websocket version reported by the server.
    #[must_use]
    pub fn server_version(&self) -> &str {
        &self.server_version
    }

    /// Send a request and wait for the matching response.
    ///
    /// Event frames and responses to other request ids are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`ObsError::Transport`] if sending fails, the connection
    /// drops, a frame is malformed or the request times out.
    pub async fn request(
        &mut self,
        request_type: &str,
        request_data: Option<Value>,
    ) -> Result<RequestResponse, ObsError> {
        let request = Request::new(request_type, request_data);
        trace!(request_type, request_id = %request.request_id, "Sending request");

        self.send_frame(&Frame::request(&request)?).await?;

        let response = timeout(self.request_timeout, self.await_response(&request.request_id))
            .await
            .map_err(|_| ObsError::Transport(format!("request '{request_type}' timed out")))??;

        trace!(
            request_type,
            code = response.request_status.code,
            "Received response"
        );
        Ok(response)
    }

    async fn await_response(&mut self, request_id: &str) -> Result<RequestResponse, ObsError> {
        loop {
            let frame = self
                .read_frame()
                .await
                .map_err(ReadError::into_exchange_error)?;

            match frame.op {
                OpCode::RequestResponse => {
                    let response: RequestResponse = frame.into_payload(OpCode::RequestResponse)?;
                    if response.request_id == request_id {
                        return Ok(response);
                    }
                    trace!(request_id = %response.request_id, "Skipping response to another request");
                }
                other => trace!(op = ?other, "Skipping frame"),
            }
        }
    }

    async fn send_frame(&mut self, frame: &Frame) -> Result<(), ObsError> {
        let json = frame.to_json()?;
        self.ws
            .send(Message::Text(json.into()))
            .await
            .map_err(|e| ObsError::Transport(e.to_string()))
    }

    async fn read_frame(&mut self) -> Result<Frame, ReadError> {
        loop {
            let message = self
                .ws
                .next()
                .await
                .ok_or(ReadError::Closed(None))?
                .map_err(|e| ReadError::Socket(e.to_string()))?;

            match message {
                Message::Text(text) => {
                    return Frame::from_json(text.as_str())
                        .map_err(|e| ReadError::Protocol(e.to_string()));
                }
                Message::Close(frame) => return Err(ReadError::Closed(close_details(frame))),
                Message::Binary(_) => {
                    return Err(ReadError::Protocol("unexpected binary message".into()));
                }
                Message::Ping(_) | Message::Pong(_) | Message::Frame(_) => {}
            }
        }
    }

    /// Close the connection gracefully.
    ///
    /// # Errors
    ///
    /// Returns an error if the close frame cannot be sent.
    pub async fn close(mut self) -> Result<(), ObsError> {
        self.ws
            .close(None)
            .await
            .map_err(|e| ObsError::Transport(e.to_string()))
    }
}

impl Connection for ObsClient {
    async fn request(
        &mut self,
        request_type: &str,
        request_data: Option<Value>,
    ) -> Result<RequestResponse, ObsError> {
        Self::request(self, request_type, request_data).await
    }

    async fn close(self) -> Result<(), ObsError> {
        Self::close(self).await
    }
}

/// Opens [`ObsClient`] connections.
#[derive(Debug, Clone, Copy, Default)]
pub struct WsConnector;

impl Connector for WsConnector {
    type Connection = ObsClient;

    async fn connect(
        &self,
        config: &ConnectionConfig,
        timeouts: Timeouts,
    ) -> Result<ObsClient, ObsError> {
        ObsClient::connect_with_timeouts(config, timeouts).await
    }
}
