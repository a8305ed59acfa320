// src/metadata.rs
//! Document-metadata transformer: publishes method-specific metadata for
//! resolution responses.

use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

use crate::encoder;
use crate::error::{Error, Result};
use crate::operations::{sort_operations, AnchoredOperation, OperationKind};
use crate::resolver::ResolutionModel;

// Document metadata property names.
pub const PUBLISHED_PROPERTY: &str = "published";
pub const CANONICAL_ID_PROPERTY: &str = "canonicalId";
pub const EQUIVALENT_ID_PROPERTY: &str = "equivalentId";
pub const METHOD_PROPERTY: &str = "method";
pub const DEACTIVATED_PROPERTY: &str = "deactivated";
pub const RECOVERY_COMMITMENT_PROPERTY: &str = "recoveryCommitment";
pub const UPDATE_COMMITMENT_PROPERTY: &str = "updateCommitment";
pub const ANCHOR_ORIGIN_PROPERTY: &str = "anchorOrigin";
pub const VERSION_ID_PROPERTY: &str = "versionId";
pub const PUBLISHED_OPERATIONS_PROPERTY: &str = "publishedOperations";
pub const UNPUBLISHED_OPERATIONS_PROPERTY: &str = "unpublishedOperations";

/// Method-specific hints supplied by the caller ("published", "canonicalId",
/// "equivalentId").
pub type TransformationInfo = Map<String, Value>;

pub type DocumentMetadata = Map<String, Value>;

#[derive(Debug, Clone, Copy, Default)]
pub struct MetadataOptions {
    pub include_published_operations: bool,
    pub include_unpublished_operations: bool,
}

/// Builds document metadata from a resolution model.
#[derive(Debug, Default)]
pub struct MetadataTransformer {
    options: MetadataOptions,
}

impl MetadataTransformer {
    pub fn new(options: MetadataOptions) -> Self {
        Self { options }
    }

    pub fn create_document_metadata(
        &self,
        rm: &ResolutionModel,
        info: &TransformationInfo,
    ) -> Result<DocumentMetadata> {
        if rm.doc.is_none() {
            return Err(Error::MissingDocument);
        }

        let Some(published) = info.get(PUBLISHED_PROPERTY) else {
            return Err(Error::MissingPublishedFlag);
        };

        let mut method_metadata = Map::new();
        method_metadata.insert(PUBLISHED_PROPERTY.to_string(), published.clone());

        if !rm.recovery_commitment.is_empty() {
            method_metadata.insert(
                RECOVERY_COMMITMENT_PROPERTY.to_string(),
                Value::String(rm.recovery_commitment.clone()),
            );
        }

        if !rm.update_commitment.is_empty() {
            method_metadata.insert(
                UPDATE_COMMITMENT_PROPERTY.to_string(),
                Value::String(rm.update_commitment.clone()),
            );
        }

        if let Some(anchor_origin) = &rm.anchor_origin {
            method_metadata.insert(ANCHOR_ORIGIN_PROPERTY.to_string(), anchor_origin.clone());
        }

        if self.options.include_unpublished_operations && !rm.unpublished_operations.is_empty() {
            let projections = unpublished_projections(&rm.unpublished_operations);
            method_metadata.insert(
                UNPUBLISHED_OPERATIONS_PROPERTY.to_string(),
                to_json(&projections)?,
            );
        }

        if self.options.include_published_operations && !rm.published_operations.is_empty() {
            let projections = published_projections(&rm.published_operations);
            method_metadata.insert(
                PUBLISHED_OPERATIONS_PROPERTY.to_string(),
                to_json(&projections)?,
            );
        }

        let mut doc_metadata = Map::new();
        doc_metadata.insert(METHOD_PROPERTY.to_string(), Value::Object(method_metadata));

        if rm.deactivated {
            doc_metadata.insert(DEACTIVATED_PROPERTY.to_string(), Value::Bool(true));
        }

        if let Some(canonical_id) = info.get(CANONICAL_ID_PROPERTY) {
            doc_metadata.insert(CANONICAL_ID_PROPERTY.to_string(), canonical_id.clone());
        }

        if let Some(equivalent_id) = info.get(EQUIVALENT_ID_PROPERTY) {
            doc_metadata.insert(EQUIVALENT_ID_PROPERTY.to_string(), equivalent_id.clone());
        }

        if !rm.version_id.is_empty() {
            doc_metadata.insert(
                VERSION_ID_PROPERTY.to_string(),
                Value::String(rm.version_id.clone()),
            );
        }

        Ok(doc_metadata)
    }
}

fn to_json<T: Serialize>(value: &T) -> Result<Value> {
    serde_json::to_value(value).map_err(|e| Error::Canonicalization(e.to_string()))
}

/// Published-operation projection for metadata. A subset of the anchored
/// operation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishedOperation {
    #[serde(rename = "type")]
    pub kind: OperationKind,
    #[serde(serialize_with = "encoded_bytes")]
    pub operation_request: Vec<u8>,
    pub transaction_time: u64,
    pub transaction_number: u64,
    pub protocol_version: u64,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub canonical_reference: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub equivalent_references: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub anchor_origin: Option<Value>,
}

/// Unpublished-operation projection for metadata.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnpublishedOperation {
    #[serde(rename = "type")]
    pub kind: OperationKind,
    #[serde(serialize_with = "encoded_bytes")]
    pub operation_request: Vec<u8>,
    pub transaction_time: u64,
    pub protocol_version: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub anchor_origin: Option<Value>,
}

fn encoded_bytes<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&encoder::encode_to_string(bytes))
}

/// Sort by anchoring time and deduplicate by canonical reference, first
/// occurrence wins.
fn published_projections(ops: &[AnchoredOperation]) -> Vec<PublishedOperation> {
    let mut sorted = ops.to_vec();
    sort_operations(&mut sorted);

    let mut seen_refs = std::collections::HashSet::new();
    let mut projections = Vec::with_capacity(sorted.len());

    for op in sorted {
        if !seen_refs.insert(op.canonical_reference.clone()) {
            continue;
        }

        projections.push(PublishedOperation {
            kind: op.kind(),
            operation_request: op.operation_request,
            transaction_time: op.transaction_time,
            transaction_number: op.transaction_number,
            protocol_version: op.protocol_version,
            canonical_reference: op.canonical_reference,
            equivalent_references: op.equivalent_references,
            anchor_origin: op.anchor_origin,
        });
    }

    projections
}

fn unpublished_projections(ops: &[AnchoredOperation]) -> Vec<UnpublishedOperation> {
    let mut sorted = ops.to_vec();
    sort_operations(&mut sorted);

    sorted
        .into_iter()
        .map(|op| UnpublishedOperation {
            kind: op.kind(),
            operation_request: op.operation_request,
            transaction_time: op.transaction_time,
            protocol_version: op.protocol_version,
            anchor_origin: op.anchor_origin,
        })
        .collect()
}
