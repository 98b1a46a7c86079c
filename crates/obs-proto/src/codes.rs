//! Numeric codes defined by the OBS WebSocket v5 protocol.

/// `requestStatus.code` values carried by `RequestResponse` frames.
pub mod request_status {
    /// Unknown status, should never be returned.
    pub const UNKNOWN: u16 = 0;
    /// For internal use to signify a successful field check.
    pub const NO_ERROR: u16 = 10;
    /// The request has succeeded.
    pub const SUCCESS: u16 = 100;
    /// The `requestType` field is missing from the request data.
    pub const MISSING_REQUEST_TYPE: u16 = 203;
    /// The request type is invalid or does not exist.
    pub const UNKNOWN_REQUEST_TYPE: u16 = 204;
    /// Generic error code.
    pub const GENERIC_ERROR: u16 = 205;
    /// The server is not ready to handle the request.
    pub const NOT_READY: u16 = 207;
    /// A required request field is missing.
    pub const MISSING_REQUEST_FIELD: u16 = 300;
    /// The request does not have a valid `requestData` object.
    pub const MISSING_REQUEST_DATA: u16 = 301;
    /// Generic invalid request field message.
    pub const INVALID_REQUEST_FIELD: u16 = 400;
    /// A request field has the wrong data type.
    pub const INVALID_REQUEST_FIELD_TYPE: u16 = 401;
    /// A request field (number) is outside of the allowed range.
    pub const REQUEST_FIELD_OUT_OF_RANGE: u16 = 402;
    /// A request field (string or array) is empty and cannot be.
    pub const REQUEST_FIELD_EMPTY: u16 = 403;
    /// The output is running and cannot be in order to perform the request.
    pub const OUTPUT_RUNNING: u16 = 500;
    /// The output is not running and should be.
    pub const OUTPUT_NOT_RUNNING: u16 = 501;
    /// The output is disabled.
    pub const OUTPUT_DISABLED: u16 = 504;
    /// The resource was not found.
    pub const RESOURCE_NOT_FOUND: u16 = 600;
    /// The resource already exists.
    pub const RESOURCE_ALREADY_EXISTS: u16 = 601;
    /// The type of resource found is invalid.
    pub const INVALID_RESOURCE_TYPE: u16 = 602;
    /// The state of the resource is invalid.
    pub const INVALID_RESOURCE_STATE: u16 = 604;
    /// Performing an action on the resource failed.
    pub const RESOURCE_ACTION_FAILED: u16 = 701;
    /// Processing the request failed unexpectedly.
    pub const REQUEST_PROCESSING_FAILED: u16 = 702;
}

/// WebSocket close codes the server uses to end a session.
pub mod close_code {
    /// Unknown reason, should never be used.
    pub const UNKNOWN_REASON: u16 = 4000;
    /// The server was unable to decode the incoming message.
    pub const MESSAGE_DECODE_ERROR: u16 = 4002;
    /// A data field is required but missing from the payload.
    pub const MISSING_DATA_FIELD: u16 = 4003;
    /// The specified `op` was invalid or missing.
    pub const UNKNOWN_OP_CODE: u16 = 4006;
    /// The client sent a message before identifying.
    pub const NOT_IDENTIFIED: u16 = 4007;
    /// The client sent an `Identify` message while already identified.
    pub const ALREADY_IDENTIFIED: u16 = 4008;
    /// The authentication attempt (via `Identify`) failed.
    pub const AUTHENTICATION_FAILED: u16 = 4009;
    /// The requested `rpcVersion` is not supported by the server.
    pub const UNSUPPORTED_RPC_VERSION: u16 = 4010;
    /// The session was invalidated by the server.
    pub const SESSION_INVALIDATED: u16 = 4011;
}
