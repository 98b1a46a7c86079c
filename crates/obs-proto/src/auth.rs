//! Authentication string derivation for the `Identify` handshake.
//!
//! The server sends a `salt` and a `challenge` in `Hello`. The client
//! answers with `base64(sha256(base64(sha256(password + salt)) + challenge))`.

use base64::{Engine, engine::general_purpose::STANDARD as BASE64};
use sha2::{Digest, Sha256};

/// Derive the `authentication` value for an `Identify` message.
#[must_use]
pub fn authentication_string(password: &str, salt: &str, challenge: &str) -> String {
    let secret = BASE64.encode(Sha256::digest(format!("{password}{salt}").as_bytes()));
    BASE64.encode(Sha256::digest(format!("{secret}{challenge}").as_bytes()))
}
