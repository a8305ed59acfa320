// src/batch_files.rs
//! Wire models for the five batch files referenced from an anchor string.
//! Field names are fixed by the protocol; unknown fields are ignored and
//! missing required fields fail parse.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ParseError;
use crate::operations::{DeltaModel, SuffixDataModel};

/// Which batch file a parse or validation failure refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchFileKind {
    CoreIndex,
    CoreProof,
    ProvisionalIndex,
    ProvisionalProof,
    Chunk,
}

impl fmt::Display for BatchFileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BatchFileKind::CoreIndex => "core index",
            BatchFileKind::CoreProof => "core proof",
            BatchFileKind::ProvisionalIndex => "provisional index",
            BatchFileKind::ProvisionalProof => "provisional proof",
            BatchFileKind::Chunk => "chunk",
        };
        write!(f, "{}", s)
    }
}

/// Reference to a create operation: just its suffix data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateReference {
    pub suffix_data: SuffixDataModel,
}

/// Reference to an operation on an existing DID, with the reveal value
/// authorizing it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationReference {
    pub did_suffix: String,
    pub reveal_value: String,
}

/// Top of a batch.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoreIndexFile {
    /// Absent iff the batch has only deactivate operations.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub provisional_index_file_uri: String,

    /// Present iff the batch has at least one recover or deactivate.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub core_proof_file_uri: String,

    #[serde(default)]
    pub operations: CoreOperations,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CoreOperations {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub create: Vec<CreateReference>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub recover: Vec<OperationReference>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub deactivate: Vec<OperationReference>,
}

/// Update index.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProvisionalIndexFile {
    /// Present iff the batch has at least one update.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub provisional_proof_file_uri: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub chunks: Vec<ChunkReference>,

    #[serde(default)]
    pub operations: ProvisionalOperations,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChunkReference {
    pub chunk_file_uri: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProvisionalOperations {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub update: Vec<OperationReference>,
}

/// Compact-JWS proofs for recover and deactivate operations, positionally
/// matching the core index file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoreProofFile {
    pub operations: CoreProofOperations,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CoreProofOperations {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub recover: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub deactivate: Vec<String>,
}

/// Compact-JWS proofs for update operations, positionally matching the
/// provisional index file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProvisionalProofFile {
    pub operations: ProvisionalProofOperations,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProvisionalProofOperations {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub update: Vec<String>,
}

/// Deltas for every create, recover and update in the batch, in that order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkFile {
    pub deltas: Vec<DeltaModel>,
}

pub fn parse_core_index_file(content: &[u8]) -> Result<CoreIndexFile, ParseError> {
    sonic_rs::from_slice(content).map_err(|e| ParseError::Json(e.to_string()))
}

pub fn parse_provisional_index_file(content: &[u8]) -> Result<ProvisionalIndexFile, ParseError> {
    sonic_rs::from_slice(content).map_err(|e| ParseError::Json(e.to_string()))
}

pub fn parse_core_proof_file(content: &[u8]) -> Result<CoreProofFile, ParseError> {
    sonic_rs::from_slice(content).map_err(|e| ParseError::Json(e.to_string()))
}

pub fn parse_provisional_proof_file(content: &[u8]) -> Result<ProvisionalProofFile, ParseError> {
    sonic_rs::from_slice(content).map_err(|e| ParseError::Json(e.to_string()))
}

pub fn parse_chunk_file(content: &[u8]) -> Result<ChunkFile, ParseError> {
    sonic_rs::from_slice(content).map_err(|e| ParseError::Json(e.to_string()))
}
