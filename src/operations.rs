// src/operations.rs
//! Data model for anchored DID operations.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

// ============================================================================
// Operation kinds and wire models
// ============================================================================

/// Operation kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationKind {
    Create,
    Update,
    Recover,
    Deactivate,
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            OperationKind::Create => "create",
            OperationKind::Update => "update",
            OperationKind::Recover => "recover",
            OperationKind::Deactivate => "deactivate",
        };
        write!(f, "{}", s)
    }
}

/// Suffix data of a create operation. The DID's unique suffix is the
/// multihash of this model's canonical form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuffixDataModel {
    pub delta_hash: String,
    pub recovery_commitment: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anchor_origin: Option<Value>,
}

/// Document mutation carried in a chunk file, paired positionally with its
/// create/recover/update operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeltaModel {
    pub patches: Vec<Value>,
    pub update_commitment: String,
}

/// Wire form of an operation request, as rebuilt from batch files. This is
/// what version-dispatched parsers re-extract reveal values and commitments
/// from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationRequest {
    #[serde(rename = "type")]
    pub kind: OperationKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub did_suffix: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reveal_value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suffix_data: Option<SuffixDataModel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delta: Option<DeltaModel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signed_data: Option<String>,
}

// ============================================================================
// Anchored operations
// ============================================================================

/// Type-specific portion of an anchored operation.
#[derive(Debug, Clone, PartialEq)]
pub enum OperationPayload {
    Create {
        suffix_data: SuffixDataModel,
        delta: Option<DeltaModel>,
    },
    Update {
        signed_data: String,
        delta: Option<DeltaModel>,
        reveal_value: String,
    },
    Recover {
        signed_data: String,
        delta: Option<DeltaModel>,
        reveal_value: String,
    },
    Deactivate {
        signed_data: String,
        reveal_value: String,
    },
}

impl OperationPayload {
    pub fn kind(&self) -> OperationKind {
        match self {
            OperationPayload::Create { .. } => OperationKind::Create,
            OperationPayload::Update { .. } => OperationKind::Update,
            OperationPayload::Recover { .. } => OperationKind::Recover,
            OperationPayload::Deactivate { .. } => OperationKind::Deactivate,
        }
    }

    /// Reveal value disclosed by the operation; create operations have none.
    pub fn reveal_value(&self) -> Option<&str> {
        match self {
            OperationPayload::Create { .. } => None,
            OperationPayload::Update { reveal_value, .. }
            | OperationPayload::Recover { reveal_value, .. }
            | OperationPayload::Deactivate { reveal_value, .. } => Some(reveal_value),
        }
    }

    pub fn signed_data(&self) -> Option<&str> {
        match self {
            OperationPayload::Create { .. } => None,
            OperationPayload::Update { signed_data, .. }
            | OperationPayload::Recover { signed_data, .. }
            | OperationPayload::Deactivate { signed_data, .. } => Some(signed_data),
        }
    }

    pub fn delta(&self) -> Option<&DeltaModel> {
        match self {
            OperationPayload::Create { delta, .. }
            | OperationPayload::Update { delta, .. }
            | OperationPayload::Recover { delta, .. } => delta.as_ref(),
            OperationPayload::Deactivate { .. } => None,
        }
    }
}

/// One operation bound to its ledger position.
#[derive(Debug, Clone, PartialEq)]
pub struct AnchoredOperation {
    /// Unique portion of the DID this operation applies to.
    pub unique_suffix: String,

    pub payload: OperationPayload,

    /// Genesis time of the protocol version used for this operation. Stamped
    /// by the transaction processor.
    pub protocol_version: u64,

    /// Logical anchoring time. Stamped by the transaction processor.
    pub transaction_time: u64,

    /// Number of the transaction this operation was batched within. Stamped
    /// by the transaction processor.
    pub transaction_number: u64,

    /// Original operation request (canonical JSON), re-parsed by the
    /// version-dispatched parser.
    pub operation_request: Vec<u8>,

    /// Canonical reference to the batch the operation was anchored in.
    /// Empty iff the operation is unpublished.
    pub canonical_reference: String,

    pub equivalent_references: Vec<String>,

    pub anchor_origin: Option<Value>,
}

impl AnchoredOperation {
    pub fn kind(&self) -> OperationKind {
        self.payload.kind()
    }
}

/// Ledger record pointing at one anchored batch. Produced by the observer,
/// consumed once by the transaction processor.
#[derive(Debug, Clone, PartialEq)]
pub struct SidetreeTxn {
    pub anchor_string: String,
    pub transaction_time: u64,
    pub transaction_number: u64,
    pub namespace: String,
    pub protocol_genesis_time: u64,
}

/// Stable sort by ledger coordinates. Ties within the same transaction keep
/// the order the batch assembler emitted.
pub fn sort_operations(ops: &mut [AnchoredOperation]) {
    ops.sort_by_key(|op| (op.transaction_time, op.transaction_number));
}
