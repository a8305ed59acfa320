// src/compression.rs
//! Batch-file decompression. The algorithm name is protocol data: it arrives
//! from the protocol parameters, and unknown names are an error rather than
//! a fallback.

use std::io::Read;

use crate::error::DecompressError;
use crate::protocol::DecompressionProvider;

/// Compression algorithm this node advertises for batch files.
pub const ALGORITHM_ZSTD: &str = "zstd";

/// Decompression provider backed by zstd.
#[derive(Debug, Clone, Copy, Default)]
pub struct Decompressor;

impl DecompressionProvider for Decompressor {
    fn decompress(&self, alg: &str, data: &[u8]) -> Result<Vec<u8>, DecompressError> {
        if alg != ALGORITHM_ZSTD {
            return Err(DecompressError::UnsupportedAlgorithm(alg.to_string()));
        }

        let mut decoder =
            zstd::Decoder::new(data).map_err(|e| DecompressError::Invalid(e.to_string()))?;

        let mut content = Vec::new();
        decoder
            .read_to_end(&mut content)
            .map_err(|e| DecompressError::Invalid(e.to_string()))?;

        Ok(content)
    }
}

/// Compress content for CAS storage. Counterpart of [`Decompressor`], used by
/// batch writers.
pub fn compress(alg: &str, data: &[u8]) -> Result<Vec<u8>, DecompressError> {
    if alg != ALGORITHM_ZSTD {
        return Err(DecompressError::UnsupportedAlgorithm(alg.to_string()));
    }

    zstd::encode_all(data, 0).map_err(|e| DecompressError::Invalid(e.to_string()))
}
