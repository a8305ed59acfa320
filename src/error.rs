// src/error.rs
//! Stable error taxonomy surfaced by the core engine.

use thiserror::Error;

use crate::batch_files::BatchFileKind;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors surfaced to callers of the core operation engine.
#[derive(Error, Debug)]
pub enum Error {
    #[error("malformed anchor string [{0}]")]
    MalformedAnchorString(String),

    #[error("retrieve CAS content at uri[{uri}]: {reason}")]
    CasUnavailable { uri: String, reason: String },

    #[error("uri[{uri}]: content size {size} exceeded maximum size {max}")]
    ContentTooLarge { uri: String, size: usize, max: usize },

    #[error("decompress CAS uri[{uri}] using '{alg}': {reason}")]
    DecompressionFailed {
        uri: String,
        alg: String,
        reason: String,
    },

    /// A batch file failed parsing or its validation pass. `index` is the
    /// offending entry when the failure is entry-level.
    #[error("{file} file invalid: {reason}")]
    BatchFileInvalid {
        file: BatchFileKind,
        index: Option<usize>,
        reason: String,
    },

    #[error("duplicate suffixes found in batch: {0:?}")]
    DuplicateSuffixInBatch(Vec<String>),

    #[error("number of txn ops [{actual}] doesn't match anchor string num of ops [{expected}]")]
    OperationCountMismatch { expected: usize, actual: usize },

    #[error("store write failed: {0}")]
    StoreWriteFailed(StoreError),

    #[error("store read failed: {0}")]
    StoreReadFailed(StoreError),

    #[error("store cleanup failed: {0}")]
    StoreCleanupFailed(StoreError),

    #[error("protocol version [{0}] not found")]
    VersionNotFound(u64),

    #[error("create operation not found")]
    NoCreateOperation,

    #[error("valid create operation not found")]
    NoValidCreate,

    #[error("supplied hash doesn't match original content")]
    HashMismatch,

    #[error("multihash algorithm [{0:#x}] not supported")]
    UnsupportedAlgorithm(u64),

    #[error("invalid multihash: {0}")]
    InvalidMultihash(String),

    #[error("canonicalization failed: {0}")]
    Canonicalization(String),

    #[error("published flag is required for creating document metadata")]
    MissingPublishedFlag,

    #[error("resolution model with document is required for creating document metadata")]
    MissingDocument,

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Apply(#[from] ApplyError),

    #[error("operation cancelled")]
    Cancelled,
}

/// Errors returned by content-addressable storage implementations.
#[derive(Error, Debug)]
pub enum CasError {
    #[error("content not found")]
    NotFound,

    #[error("operation cancelled")]
    Cancelled,

    #[error("{0}")]
    Backend(String),
}

/// Errors returned by operation store implementations. `NotFound` is a typed
/// variant so callers never have to match on message text.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("not found")]
    NotFound,

    #[error("operation cancelled")]
    Cancelled,

    #[error("{0}")]
    Backend(String),
}

/// Errors returned by version-dispatched operation parsers.
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("invalid JSON: {0}")]
    Json(String),

    #[error("missing field `{0}`")]
    MissingField(&'static str),

    #[error("invalid compact JWS")]
    InvalidJws,

    #[error("{0}")]
    Invalid(String),
}

/// Errors returned by version-dispatched operation appliers. Never fatal to
/// the replay engine; the offending operation is skipped.
#[derive(Error, Debug)]
pub enum ApplyError {
    #[error("reveal value doesn't match last commitment")]
    BadReveal,

    #[error("signature verification failed")]
    BadSignature,

    #[error("invalid delta: {0}")]
    DeltaInvalid(String),

    #[error("{0}")]
    Other(String),
}

/// Errors returned by decompression providers.
#[derive(Error, Debug)]
pub enum DecompressError {
    #[error("compression algorithm '{0}' not supported")]
    UnsupportedAlgorithm(String),

    #[error("{0}")]
    Invalid(String),
}
