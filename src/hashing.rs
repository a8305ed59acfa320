// src/hashing.rs
//! Multihash primitives: self-describing hashes in the form
//! `[code (varint), length (varint), digest]`, encoded for the wire with
//! URL-safe base64.

use multihash::Multihash;
use serde::Serialize;
use sha2::{Digest, Sha256, Sha512};

use crate::canonicalizer;
use crate::encoder;
use crate::error::{Error, Result};

/// SHA2-256 multihash code.
pub const SHA2_256: u64 = 0x12;

/// SHA2-512 multihash code.
pub const SHA2_512: u64 = 0x13;

/// Compute the digest for the supplied bytes and prepend the multihash
/// header.
pub fn compute_multihash(code: u64, bytes: &[u8]) -> Result<Vec<u8>> {
    let digest = get_hash(code, bytes)?;

    let mh = Multihash::<64>::wrap(code, &digest)
        .map_err(|e| Error::InvalidMultihash(e.to_string()))?;

    Ok(mh.to_bytes())
}

/// Raw digest (no multihash header) for the supplied code.
pub fn get_hash(code: u64, bytes: &[u8]) -> Result<Vec<u8>> {
    match code {
        SHA2_256 => Ok(Sha256::digest(bytes).to_vec()),
        SHA2_512 => Ok(Sha512::digest(bytes).to_vec()),
        other => Err(Error::UnsupportedAlgorithm(other)),
    }
}

/// Return the multihash code embedded in an encoded multihash, without
/// re-hashing.
pub fn get_multihash_code(encoded_multihash: &str) -> Result<u64> {
    let bytes = encoder::decode_string(encoded_multihash)
        .map_err(|e| Error::InvalidMultihash(e.to_string()))?;

    let mh = Multihash::<64>::from_bytes(&bytes)
        .map_err(|e| Error::InvalidMultihash(e.to_string()))?;

    Ok(mh.code())
}

/// Whether the encoded hash was computed with a multihash code this node
/// supports.
pub fn is_supported_multihash(encoded_multihash: &str) -> bool {
    matches!(get_multihash_code(encoded_multihash), Ok(SHA2_256 | SHA2_512))
}

/// Whether the encoded hash was computed with the given multihash code.
pub fn is_computed_using_multihash_algorithm(encoded_multihash: &str, code: u64) -> bool {
    get_multihash_code(encoded_multihash).map(|c| c == code).unwrap_or(false)
}

/// Canonicalize the model, multihash the canonical bytes and encode the
/// result for the wire.
pub fn calculate_model_multihash<T: Serialize>(value: &T, code: u64) -> Result<String> {
    let bytes = canonicalizer::marshal_canonical(value)?;
    let mh = compute_multihash(code, &bytes)?;

    Ok(encoder::encode_to_string(mh))
}

/// Verify that the model hashes to the expected encoded multihash, using the
/// algorithm embedded in the expected value.
pub fn verify_model_multihash<T: Serialize>(value: &T, expected_multihash: &str) -> Result<()> {
    let code = get_multihash_code(expected_multihash)?;

    let computed = calculate_model_multihash(value, code)?;
    if computed != expected_multihash {
        return Err(Error::HashMismatch);
    }

    Ok(())
}
