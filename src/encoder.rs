// src/encoder.rs
//! Wire encoding for hashes, reveal values and proof payloads: URL-safe
//! base64 without padding. The encoding is part of the protocol's wire form.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};

/// Encode bytes to the protocol wire form.
pub fn encode_to_string(data: impl AsRef<[u8]>) -> String {
    URL_SAFE_NO_PAD.encode(data)
}

/// Decode a wire-form string back to bytes.
pub fn decode_string(encoded: &str) -> Result<Vec<u8>, base64::DecodeError> {
    URL_SAFE_NO_PAD.decode(encoded)
}
