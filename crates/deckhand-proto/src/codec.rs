//! JSON wire codec.
//!
//! The log stores actions as JSON text. Signing covers the canonical
//! encoding of the bare action: its JSON serialization with fields in
//! declaration order and no signature field.

use serde::{Serialize, de::DeserializeOwned};

use crate::error::ProtoError;

/// Encodes a wire value as JSON text.
pub fn encode<T: Serialize>(value: &T) -> Result<String, ProtoError> {
    serde_json::to_string(value).map_err(|e| ProtoError::Encode { reason: e.to_string() })
}

/// Decodes JSON text into a wire value.
pub fn decode<T: DeserializeOwned>(text: &str) -> Result<T, ProtoError> {
    serde_json::from_str(text).map_err(|e| ProtoError::Decode { reason: e.to_string() })
}

/// Bytes a signature is computed over.
pub fn canonical_bytes<T: Serialize>(action: &T) -> Result<Vec<u8>, ProtoError> {
    serde_json::to_vec(action).map_err(|e| ProtoError::Encode { reason: e.to_string() })
}
