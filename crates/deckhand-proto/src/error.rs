//! Wire codec error types.

use thiserror::Error;

/// Errors from encoding or decoding wire messages.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtoError {
    /// Value could not be serialized.
    #[error("encode failed: {reason}")]
    Encode {
        /// Description of the serialization failure.
        reason: String,
    },

    /// Bytes are not a valid message. Unknown `type` tags land here.
    #[error("decode failed: {reason}")]
    Decode {
        /// Description of the parse failure.
        reason: String,
    },
}
