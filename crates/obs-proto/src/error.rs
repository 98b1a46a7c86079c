//! Error types for the obs-proto crate.

use thiserror::Error;

use crate::messages::OpCode;

/// Errors that can occur while encoding or decoding protocol frames.
#[derive(Debug, Error)]
pub enum ProtoError {
    /// Failed to encode a message.
    #[error("encoding error: {0}")]
    Encoding(String),

    /// Failed to decode a message.
    #[error("decoding error: {0}")]
    Decoding(String),

    /// A frame arrived with a different opcode than the one expected.
    #[error("unexpected opcode: expected {expected:?}, got {actual:?}")]
    UnexpectedOpCode {
        /// Opcode the caller was waiting for.
        expected: OpCode,
        /// Opcode actually received.
        actual: OpCode,
    },

    /// Missing required field.
    #[error("missing required field: {0}")]
    MissingField(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unexpected_opcode_display_names_both_sides() {
        let err = ProtoError::UnexpectedOpCode {
            expected: OpCode::Identified,
            actual: OpCode::Event,
        };
        assert_eq!(
            err.to_string(),
            "unexpected opcode: expected Identified, got Event"
        );
    }

    #[test]
    fn missing_field_display() {
        let err = ProtoError::MissingField("outputActive");
        assert_eq!(err.to_string(), "missing required field: outputActive");
    }
}
