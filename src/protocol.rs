// src/protocol.rs
//! Collaborator capabilities consumed by the core: content-addressable
//! storage, operation stores, decompression, and the per-version protocol
//! bundle with its parser and applier. All mutable state lives behind these
//! traits; the core itself is stateless.

use std::sync::Arc;

use crate::error::{ApplyError, CasError, DecompressError, Error, ParseError, Result, StoreError};
use crate::operations::{AnchoredOperation, DeltaModel, OperationRequest, SuffixDataModel};
use crate::resolver::ResolutionModel;

/// Read-only content-addressable storage. URIs are opaque to the core.
pub trait Cas: Send + Sync {
    fn read(&self, uri: &str) -> Result<Vec<u8>, CasError>;
}

/// Durable store of anchored operations, keyed by DID unique suffix.
pub trait OperationStore: Send + Sync {
    /// Retrieve all operations related to the document.
    fn get(&self, unique_suffix: &str) -> Result<Vec<AnchoredOperation>, StoreError>;

    /// Persist a batch of operations. The store merges duplicates by
    /// `(unique_suffix, transaction_time, transaction_number)`.
    fn put(&self, ops: Vec<AnchoredOperation>) -> Result<(), StoreError>;
}

/// Short-lived mailbox of locally-known operations not yet anchored.
pub trait UnpublishedOperationStore: Send + Sync {
    fn get(&self, unique_suffix: &str) -> Result<Vec<AnchoredOperation>, StoreError>;

    /// Delete unpublished operations for the provided suffixes.
    fn delete_all(&self, suffixes: &[String]) -> Result<(), StoreError>;
}

/// Decompresses batch files with the algorithm the protocol advertises.
pub trait DecompressionProvider: Send + Sync {
    fn decompress(&self, alg: &str, data: &[u8]) -> Result<Vec<u8>, DecompressError>;
}

/// Version-dispatched operation parsing and validation.
pub trait OperationParser: Send + Sync {
    /// Parse a raw operation request received under the given DID namespace.
    fn parse_operation(
        &self,
        namespace: &str,
        operation_buffer: &[u8],
    ) -> Result<OperationRequest, ParseError>;

    fn validate_suffix_data(&self, suffix_data: &SuffixDataModel) -> Result<(), ParseError>;

    fn validate_delta(&self, delta: &DeltaModel) -> Result<(), ParseError>;

    fn parse_signed_data_for_update(&self, compact_jws: &str) -> Result<(), ParseError>;

    fn parse_signed_data_for_recover(&self, compact_jws: &str) -> Result<(), ParseError>;

    fn parse_signed_data_for_deactivate(&self, compact_jws: &str) -> Result<(), ParseError>;

    /// Reveal value disclosed by the operation request.
    fn get_reveal_value(&self, operation_request: &[u8]) -> Result<String, ParseError>;

    /// Commitment the operation request declares for its successor.
    fn get_commitment(&self, operation_request: &[u8]) -> Result<String, ParseError>;
}

/// Applies one operation to a resolution state, producing a fresh state.
///
/// Implementations must verify the reveal value against the state's
/// commitment, verify signed data against the key material committed by the
/// prior operation, apply the delta, rotate the commitments it declares, and
/// bump the last-operation coordinates. Inputs are never mutated.
pub trait OperationApplier: Send + Sync {
    fn apply(
        &self,
        op: &AnchoredOperation,
        state: &ResolutionModel,
    ) -> Result<ResolutionModel, ApplyError>;
}

/// Parameters of one protocol version.
#[derive(Debug, Clone)]
pub struct ProtocolParameters {
    /// Ledger time at which this protocol version takes effect.
    pub genesis_time: u64,
    /// Multihash code used for suffixes, reveal values and commitments.
    pub multihash_algorithm: u64,
    /// Compression algorithm for batch files in CAS.
    pub compression_algorithm: String,
    pub max_core_index_file_size: usize,
    pub max_provisional_index_file_size: usize,
    pub max_proof_file_size: usize,
    pub max_chunk_file_size: usize,
}

/// Per-version bundle of parameters and pluggable collaborators.
#[derive(Clone)]
pub struct Protocol {
    pub parameters: ProtocolParameters,
    pub parser: Arc<dyn OperationParser>,
    pub applier: Arc<dyn OperationApplier>,
}

/// Versioned dispatcher yielding the protocol bundle for a protocol-version
/// identifier (its genesis time). Read-only after init.
pub trait ProtocolRegistry: Send + Sync {
    fn get(&self, version: u64) -> Result<Protocol, Error>;
}
