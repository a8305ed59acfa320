// Shared fixtures: in-memory collaborators and a reference protocol version
// used to exercise the engine end to end.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use serde_json::{json, Value};

use sidetree_core::batch_files::{
    ChunkFile, ChunkReference, CoreIndexFile, CoreProofFile, CoreProofOperations,
    CreateReference, OperationReference, ProvisionalIndexFile, ProvisionalProofFile,
    ProvisionalProofOperations,
};
use sidetree_core::compression::{compress, ALGORITHM_ZSTD};
use sidetree_core::error::{ApplyError, CasError, Error, ParseError, StoreError};
use sidetree_core::hashing::{self, SHA2_256};
use sidetree_core::operations::{
    AnchoredOperation, DeltaModel, OperationKind, OperationPayload, OperationRequest,
    SidetreeTxn, SuffixDataModel,
};
use sidetree_core::protocol::{
    Cas, OperationApplier, OperationParser, OperationStore, Protocol, ProtocolParameters,
    ProtocolRegistry, UnpublishedOperationStore,
};
use sidetree_core::resolver::ResolutionModel;
use sidetree_core::{commitment, encoder, Decompressor, OperationProvider};

/// Genesis time of the reference protocol version.
pub const GENESIS_TIME: u64 = 1;

pub const NAMESPACE: &str = "did:sidetree";

pub fn protocol_parameters() -> ProtocolParameters {
    ProtocolParameters {
        genesis_time: GENESIS_TIME,
        multihash_algorithm: SHA2_256,
        compression_algorithm: ALGORITHM_ZSTD.to_string(),
        max_core_index_file_size: 1 << 20,
        max_provisional_index_file_size: 1 << 20,
        max_proof_file_size: 1 << 20,
        max_chunk_file_size: 1 << 22,
    }
}

// ============================================================================
// In-memory collaborators
// ============================================================================

/// Content-addressable store keyed by the hash of the stored bytes. Records
/// every read so tests can assert which files were fetched.
#[derive(Default)]
pub struct MockCas {
    blobs: Mutex<HashMap<String, Vec<u8>>>,
    reads: Mutex<Vec<String>>,
}

impl MockCas {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Store raw bytes, returning their content address.
    pub fn write(&self, bytes: Vec<u8>) -> String {
        let digest = hashing::get_hash(SHA2_256, &bytes).unwrap();
        let uri = encoder::encode_to_string(digest);
        self.blobs.lock().unwrap().insert(uri.clone(), bytes);
        uri
    }

    /// Compress a batch file and store it.
    pub fn write_batch_file(&self, content: &[u8]) -> String {
        self.write(compress(ALGORITHM_ZSTD, content).unwrap())
    }

    pub fn reads(&self) -> Vec<String> {
        self.reads.lock().unwrap().clone()
    }
}

impl Cas for MockCas {
    fn read(&self, uri: &str) -> Result<Vec<u8>, CasError> {
        self.reads.lock().unwrap().push(uri.to_string());
        self.blobs
            .lock()
            .unwrap()
            .get(uri)
            .cloned()
            .ok_or(CasError::NotFound)
    }
}

/// Operation store that merges duplicates by suffix and ledger coordinates.
#[derive(Default)]
pub struct MemOperationStore {
    ops: Mutex<HashMap<String, Vec<AnchoredOperation>>>,
}

impl MemOperationStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn with_ops(ops: Vec<AnchoredOperation>) -> Arc<Self> {
        let store = Self::default();
        store.put(ops).unwrap();
        Arc::new(store)
    }

    pub fn count(&self, unique_suffix: &str) -> usize {
        self.ops
            .lock()
            .unwrap()
            .get(unique_suffix)
            .map(|ops| ops.len())
            .unwrap_or(0)
    }
}

impl OperationStore for MemOperationStore {
    fn get(&self, unique_suffix: &str) -> Result<Vec<AnchoredOperation>, StoreError> {
        self.ops
            .lock()
            .unwrap()
            .get(unique_suffix)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    fn put(&self, ops: Vec<AnchoredOperation>) -> Result<(), StoreError> {
        let mut stored = self.ops.lock().unwrap();
        for op in ops {
            let entry = stored.entry(op.unique_suffix.clone()).or_default();
            let duplicate = entry.iter().any(|existing| {
                existing.transaction_time == op.transaction_time
                    && existing.transaction_number == op.transaction_number
            });
            if !duplicate {
                entry.push(op);
            }
        }
        Ok(())
    }
}

/// Operation store that fails every call.
pub struct FailingOperationStore(pub StoreError);

impl FailingOperationStore {
    fn error(&self) -> StoreError {
        match &self.0 {
            StoreError::NotFound => StoreError::NotFound,
            StoreError::Cancelled => StoreError::Cancelled,
            StoreError::Backend(msg) => StoreError::Backend(msg.clone()),
        }
    }
}

impl OperationStore for FailingOperationStore {
    fn get(&self, _unique_suffix: &str) -> Result<Vec<AnchoredOperation>, StoreError> {
        Err(self.error())
    }

    fn put(&self, _ops: Vec<AnchoredOperation>) -> Result<(), StoreError> {
        Err(self.error())
    }
}

#[derive(Default)]
pub struct MemUnpublishedStore {
    ops: Mutex<HashMap<String, Vec<AnchoredOperation>>>,
    deleted: Mutex<Vec<String>>,
}

impl MemUnpublishedStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn add(&self, op: AnchoredOperation) {
        self.ops
            .lock()
            .unwrap()
            .entry(op.unique_suffix.clone())
            .or_default()
            .push(op);
    }

    pub fn deleted(&self) -> Vec<String> {
        self.deleted.lock().unwrap().clone()
    }
}

impl UnpublishedOperationStore for MemUnpublishedStore {
    fn get(&self, unique_suffix: &str) -> Result<Vec<AnchoredOperation>, StoreError> {
        self.ops
            .lock()
            .unwrap()
            .get(unique_suffix)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    fn delete_all(&self, suffixes: &[String]) -> Result<(), StoreError> {
        let mut ops = self.ops.lock().unwrap();
        for suffix in suffixes {
            ops.remove(suffix);
            self.deleted.lock().unwrap().push(suffix.clone());
        }
        Ok(())
    }
}

/// Unpublished store that fails every call.
pub struct FailingUnpublishedStore;

impl UnpublishedOperationStore for FailingUnpublishedStore {
    fn get(&self, _unique_suffix: &str) -> Result<Vec<AnchoredOperation>, StoreError> {
        Err(StoreError::Backend("unpublished store down".to_string()))
    }

    fn delete_all(&self, _suffixes: &[String]) -> Result<(), StoreError> {
        Err(StoreError::Backend("unpublished store down".to_string()))
    }
}

// ============================================================================
// Reference protocol version
// ============================================================================

/// Parser over the canonical operation-request wire form.
pub struct TestParser;

impl TestParser {
    fn parse(&self, operation_buffer: &[u8]) -> Result<OperationRequest, ParseError> {
        sonic_rs::from_slice(operation_buffer).map_err(|e| ParseError::Json(e.to_string()))
    }
}

fn check_compact_jws(compact_jws: &str) -> Result<(), ParseError> {
    let parts: Vec<&str> = compact_jws.split('.').collect();
    if parts.len() != 3 || parts.iter().any(|p| p.is_empty()) {
        return Err(ParseError::InvalidJws);
    }
    Ok(())
}

impl OperationParser for TestParser {
    fn parse_operation(
        &self,
        _namespace: &str,
        operation_buffer: &[u8],
    ) -> Result<OperationRequest, ParseError> {
        self.parse(operation_buffer)
    }

    fn validate_suffix_data(&self, suffix_data: &SuffixDataModel) -> Result<(), ParseError> {
        if suffix_data.delta_hash.is_empty() {
            return Err(ParseError::MissingField("deltaHash"));
        }
        if suffix_data.recovery_commitment.is_empty() {
            return Err(ParseError::MissingField("recoveryCommitment"));
        }
        Ok(())
    }

    fn validate_delta(&self, delta: &DeltaModel) -> Result<(), ParseError> {
        if delta.update_commitment.is_empty() {
            return Err(ParseError::MissingField("updateCommitment"));
        }
        Ok(())
    }

    fn parse_signed_data_for_update(&self, compact_jws: &str) -> Result<(), ParseError> {
        check_compact_jws(compact_jws)
    }

    fn parse_signed_data_for_recover(&self, compact_jws: &str) -> Result<(), ParseError> {
        check_compact_jws(compact_jws)?;
        signed_payload(compact_jws)
            .ok_or(ParseError::InvalidJws)
            .map(|_| ())
    }

    fn parse_signed_data_for_deactivate(&self, compact_jws: &str) -> Result<(), ParseError> {
        check_compact_jws(compact_jws)
    }

    fn get_reveal_value(&self, operation_request: &[u8]) -> Result<String, ParseError> {
        let request = self.parse(operation_request)?;
        request
            .reveal_value
            .ok_or(ParseError::MissingField("revealValue"))
    }

    fn get_commitment(&self, operation_request: &[u8]) -> Result<String, ParseError> {
        let request = self.parse(operation_request)?;
        match request.kind {
            OperationKind::Update => request
                .delta
                .map(|delta| delta.update_commitment)
                .ok_or(ParseError::MissingField("delta")),
            OperationKind::Recover => {
                let signed_data = request.signed_data.ok_or(ParseError::MissingField("signedData"))?;
                let payload = signed_payload(&signed_data).ok_or(ParseError::InvalidJws)?;
                payload["recoveryCommitment"]
                    .as_str()
                    .map(str::to_string)
                    .ok_or(ParseError::MissingField("recoveryCommitment"))
            }
            OperationKind::Deactivate => Ok(String::new()),
            OperationKind::Create => Err(ParseError::Invalid(
                "create operation doesn't declare a commitment".to_string(),
            )),
        }
    }
}

/// Applier implementing the reference semantics: reveal verification against
/// the state's commitment, delta-hash verification against the signed data,
/// document patching and commitment rotation.
pub struct TestApplier;

impl TestApplier {
    fn verify_reveal(reveal_value: &str, expected_commitment: &str) -> Result<(), ApplyError> {
        let actual = commitment::get_commitment_from_reveal_value(reveal_value)
            .map_err(|e| ApplyError::Other(e.to_string()))?;
        if actual != expected_commitment {
            return Err(ApplyError::BadReveal);
        }
        Ok(())
    }

    fn verify_delta(delta: &DeltaModel, expected_hash: &str) -> Result<(), ApplyError> {
        hashing::verify_model_multihash(delta, expected_hash)
            .map_err(|e| ApplyError::DeltaInvalid(e.to_string()))
    }

    fn apply_patches(delta: &DeltaModel, doc: Option<Value>) -> Option<Value> {
        let mut doc = doc;
        for patch in &delta.patches {
            if patch["action"] == json!("replace") {
                doc = Some(patch["document"].clone());
            }
        }
        doc
    }
}

impl OperationApplier for TestApplier {
    fn apply(
        &self,
        op: &AnchoredOperation,
        state: &ResolutionModel,
    ) -> Result<ResolutionModel, ApplyError> {
        let mut new_state = ResolutionModel {
            doc: state.doc.clone(),
            update_commitment: state.update_commitment.clone(),
            recovery_commitment: state.recovery_commitment.clone(),
            anchor_origin: state.anchor_origin.clone(),
            version_id: state.version_id.clone(),
            ..Default::default()
        };

        match &op.payload {
            OperationPayload::Create { suffix_data, delta } => {
                if let Some(delta) = delta {
                    Self::verify_delta(delta, &suffix_data.delta_hash)?;
                    new_state.doc = Self::apply_patches(delta, None);
                    new_state.update_commitment = delta.update_commitment.clone();
                } else {
                    new_state.doc = Some(json!({}));
                    new_state.update_commitment = String::new();
                }
                new_state.recovery_commitment = suffix_data.recovery_commitment.clone();
                new_state.anchor_origin = suffix_data.anchor_origin.clone();
            }
            OperationPayload::Update {
                signed_data,
                delta,
                reveal_value,
            } => {
                Self::verify_reveal(reveal_value, &state.update_commitment)?;
                let payload = signed_payload(signed_data).ok_or(ApplyError::BadSignature)?;
                let delta = delta.as_ref().ok_or_else(|| {
                    ApplyError::DeltaInvalid("update operation is missing delta".to_string())
                })?;
                if let Some(expected) = payload["deltaHash"].as_str() {
                    Self::verify_delta(delta, expected)?;
                }
                new_state.doc = Self::apply_patches(delta, state.doc.clone());
                new_state.update_commitment = delta.update_commitment.clone();
            }
            OperationPayload::Recover {
                signed_data,
                delta,
                reveal_value,
            } => {
                Self::verify_reveal(reveal_value, &state.recovery_commitment)?;
                let payload = signed_payload(signed_data).ok_or(ApplyError::BadSignature)?;
                let delta = delta.as_ref().ok_or_else(|| {
                    ApplyError::DeltaInvalid("recover operation is missing delta".to_string())
                })?;
                if let Some(expected) = payload["deltaHash"].as_str() {
                    Self::verify_delta(delta, expected)?;
                }
                new_state.doc = Self::apply_patches(delta, None);
                new_state.update_commitment = delta.update_commitment.clone();
                new_state.recovery_commitment = payload["recoveryCommitment"]
                    .as_str()
                    .unwrap_or_default()
                    .to_string();
            }
            OperationPayload::Deactivate {
                signed_data,
                reveal_value,
            } => {
                Self::verify_reveal(reveal_value, &state.recovery_commitment)?;
                check_compact_jws(signed_data).map_err(|_| ApplyError::BadSignature)?;
                new_state.doc = None;
                new_state.update_commitment = String::new();
                new_state.recovery_commitment = String::new();
                new_state.deactivated = true;
            }
        }

        new_state.last_operation_transaction_time = op.transaction_time;
        new_state.last_operation_transaction_number = op.transaction_number;

        Ok(new_state)
    }
}

/// Registry holding the single reference protocol version.
pub struct TestRegistry {
    protocol: Protocol,
}

impl TestRegistry {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            protocol: Protocol {
                parameters: protocol_parameters(),
                parser: Arc::new(TestParser),
                applier: Arc::new(TestApplier),
            },
        })
    }
}

impl ProtocolRegistry for TestRegistry {
    fn get(&self, version: u64) -> Result<Protocol, Error> {
        if version != GENESIS_TIME {
            return Err(Error::VersionNotFound(version));
        }
        Ok(self.protocol.clone())
    }
}

pub fn operation_provider(cas: Arc<MockCas>) -> OperationProvider {
    init_logging();
    OperationProvider::new(
        protocol_parameters(),
        Arc::new(TestParser),
        cas,
        Arc::new(Decompressor),
    )
}

/// Capture engine logs in test output.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

// ============================================================================
// Operation builders
// ============================================================================

/// Reveal value derived from a key seed: an encoded multihash, as the
/// protocol requires.
pub fn reveal(seed: &str) -> String {
    hashing::calculate_model_multihash(&seed, SHA2_256).unwrap()
}

/// Commitment a future operation must target so that `reveal(seed)`
/// satisfies it.
pub fn commitment_for(seed: &str) -> String {
    commitment::get_commitment_from_reveal_value(&reveal(seed)).unwrap()
}

/// Compact JWS with the given JSON payload; header and signature are
/// placeholders.
pub fn compact_jws(payload: &Value) -> String {
    format!(
        "e30.{}.c2ln",
        encoder::encode_to_string(payload.to_string().as_bytes())
    )
}

pub fn signed_payload(compact_jws: &str) -> Option<Value> {
    let payload_b64 = compact_jws.split('.').nth(1)?;
    let bytes = encoder::decode_string(payload_b64).ok()?;
    serde_json::from_slice(&bytes).ok()
}

pub fn delta(doc: &Value, next_update_seed: &str) -> DeltaModel {
    DeltaModel {
        patches: vec![json!({"action": "replace", "document": doc})],
        update_commitment: commitment_for(next_update_seed),
    }
}

pub fn suffix_data(delta: &DeltaModel, recovery_seed: &str) -> SuffixDataModel {
    SuffixDataModel {
        delta_hash: hashing::calculate_model_multihash(delta, SHA2_256).unwrap(),
        recovery_commitment: commitment_for(recovery_seed),
        anchor_origin: None,
    }
}

fn anchored(
    unique_suffix: &str,
    payload: OperationPayload,
    time: u64,
    number: u64,
    canonical_reference: &str,
) -> AnchoredOperation {
    let request = match &payload {
        OperationPayload::Create { suffix_data, delta } => OperationRequest {
            kind: OperationKind::Create,
            did_suffix: None,
            reveal_value: None,
            suffix_data: Some(suffix_data.clone()),
            delta: delta.clone(),
            signed_data: None,
        },
        OperationPayload::Update {
            signed_data,
            delta,
            reveal_value,
        }
        | OperationPayload::Recover {
            signed_data,
            delta,
            reveal_value,
        } => OperationRequest {
            kind: payload.kind(),
            did_suffix: Some(unique_suffix.to_string()),
            reveal_value: Some(reveal_value.clone()),
            suffix_data: None,
            delta: delta.clone(),
            signed_data: Some(signed_data.clone()),
        },
        OperationPayload::Deactivate {
            signed_data,
            reveal_value,
        } => OperationRequest {
            kind: OperationKind::Deactivate,
            did_suffix: Some(unique_suffix.to_string()),
            reveal_value: Some(reveal_value.clone()),
            suffix_data: None,
            delta: None,
            signed_data: Some(signed_data.clone()),
        },
    };

    AnchoredOperation {
        unique_suffix: unique_suffix.to_string(),
        payload,
        protocol_version: GENESIS_TIME,
        transaction_time: time,
        transaction_number: number,
        operation_request: sidetree_core::canonicalizer::marshal_canonical(&request).unwrap(),
        canonical_reference: canonical_reference.to_string(),
        equivalent_references: Vec::new(),
        anchor_origin: None,
    }
}

/// Build a create operation; returns the operation and the DID's unique
/// suffix.
pub fn create_op(
    doc: &Value,
    update_seed: &str,
    recovery_seed: &str,
    time: u64,
) -> (AnchoredOperation, String) {
    let delta = delta(doc, update_seed);
    let suffix_data = suffix_data(&delta, recovery_seed);
    let suffix = hashing::calculate_model_multihash(&suffix_data, SHA2_256).unwrap();

    let op = anchored(
        &suffix,
        OperationPayload::Create {
            suffix_data,
            delta: Some(delta),
        },
        time,
        0,
        &format!("canonical-{}-0", time),
    );

    (op, suffix)
}

/// Update authorized by `prev_update_seed`, declaring a commitment for
/// `next_update_seed`.
pub fn update_op(
    suffix: &str,
    doc: &Value,
    prev_update_seed: &str,
    next_update_seed: &str,
    time: u64,
) -> AnchoredOperation {
    let delta = delta(doc, next_update_seed);
    let delta_hash = hashing::calculate_model_multihash(&delta, SHA2_256).unwrap();

    anchored(
        suffix,
        OperationPayload::Update {
            signed_data: compact_jws(&json!({"deltaHash": delta_hash})),
            delta: Some(delta),
            reveal_value: reveal(prev_update_seed),
        },
        time,
        0,
        &format!("canonical-{}-0", time),
    )
}

/// Recover authorized by `prev_recovery_seed`, rotating both commitment
/// chains.
pub fn recover_op(
    suffix: &str,
    doc: &Value,
    prev_recovery_seed: &str,
    next_recovery_seed: &str,
    next_update_seed: &str,
    time: u64,
) -> AnchoredOperation {
    let delta = delta(doc, next_update_seed);
    let delta_hash = hashing::calculate_model_multihash(&delta, SHA2_256).unwrap();

    anchored(
        suffix,
        OperationPayload::Recover {
            signed_data: compact_jws(&json!({
                "deltaHash": delta_hash,
                "recoveryCommitment": commitment_for(next_recovery_seed),
            })),
            delta: Some(delta),
            reveal_value: reveal(prev_recovery_seed),
        },
        time,
        0,
        &format!("canonical-{}-0", time),
    )
}

pub fn deactivate_op(suffix: &str, prev_recovery_seed: &str, time: u64) -> AnchoredOperation {
    anchored(
        suffix,
        OperationPayload::Deactivate {
            signed_data: compact_jws(&json!({"didSuffix": suffix})),
            reveal_value: reveal(prev_recovery_seed),
        },
        time,
        0,
        &format!("canonical-{}-0", time),
    )
}

/// Strip the anchoring stamp from an operation, turning it into an
/// unpublished one.
pub fn unpublished(mut op: AnchoredOperation) -> AnchoredOperation {
    op.canonical_reference = String::new();
    op.transaction_time = 0;
    op.transaction_number = 0;
    op
}

// ============================================================================
// Batch builders
// ============================================================================

/// Specification of one anchored batch; `anchor` writes the batch files to
/// CAS and returns the transaction pointing at them.
#[derive(Default)]
pub struct TestBatch {
    pub creates: Vec<SuffixDataModel>,
    pub recovers: Vec<(String, String, String)>, // suffix, reveal, jws
    pub updates: Vec<(String, String, String)>,  // suffix, reveal, jws
    pub deactivates: Vec<(String, String, String)>, // suffix, reveal, jws
    pub deltas: Vec<DeltaModel>,
}

impl TestBatch {
    pub fn anchor(&self, cas: &MockCas, time: u64, number: u64) -> SidetreeTxn {
        let deactivate_only =
            self.creates.is_empty() && self.recovers.is_empty() && self.updates.is_empty();

        let core_proof_file_uri = if !self.recovers.is_empty() || !self.deactivates.is_empty() {
            let file = CoreProofFile {
                operations: CoreProofOperations {
                    recover: self.recovers.iter().map(|(_, _, jws)| jws.clone()).collect(),
                    deactivate: self
                        .deactivates
                        .iter()
                        .map(|(_, _, jws)| jws.clone())
                        .collect(),
                },
            };
            cas.write_batch_file(&sonic_rs::to_vec(&file).unwrap())
        } else {
            String::new()
        };

        let provisional_index_file_uri = if deactivate_only {
            String::new()
        } else {
            let provisional_proof_file_uri = if !self.updates.is_empty() {
                let file = ProvisionalProofFile {
                    operations: ProvisionalProofOperations {
                        update: self.updates.iter().map(|(_, _, jws)| jws.clone()).collect(),
                    },
                };
                cas.write_batch_file(&sonic_rs::to_vec(&file).unwrap())
            } else {
                String::new()
            };

            let chunk = ChunkFile {
                deltas: self.deltas.clone(),
            };
            let chunk_file_uri = cas.write_batch_file(&sonic_rs::to_vec(&chunk).unwrap());

            let file = ProvisionalIndexFile {
                provisional_proof_file_uri,
                chunks: vec![ChunkReference { chunk_file_uri }],
                operations: sidetree_core::batch_files::ProvisionalOperations {
                    update: self
                        .updates
                        .iter()
                        .map(|(suffix, reveal, _)| OperationReference {
                            did_suffix: suffix.clone(),
                            reveal_value: reveal.clone(),
                        })
                        .collect(),
                },
            };
            cas.write_batch_file(&sonic_rs::to_vec(&file).unwrap())
        };

        let core_index = CoreIndexFile {
            provisional_index_file_uri,
            core_proof_file_uri,
            operations: sidetree_core::batch_files::CoreOperations {
                create: self
                    .creates
                    .iter()
                    .map(|suffix_data| CreateReference {
                        suffix_data: suffix_data.clone(),
                    })
                    .collect(),
                recover: self
                    .recovers
                    .iter()
                    .map(|(suffix, reveal, _)| OperationReference {
                        did_suffix: suffix.clone(),
                        reveal_value: reveal.clone(),
                    })
                    .collect(),
                deactivate: self
                    .deactivates
                    .iter()
                    .map(|(suffix, reveal, _)| OperationReference {
                        did_suffix: suffix.clone(),
                        reveal_value: reveal.clone(),
                    })
                    .collect(),
            },
        };

        let core_index_uri = cas.write_batch_file(&sonic_rs::to_vec(&core_index).unwrap());
        let num_ops = self.creates.len()
            + self.recovers.len()
            + self.updates.len()
            + self.deactivates.len();

        SidetreeTxn {
            anchor_string: format!("{}.{}", num_ops, core_index_uri),
            transaction_time: time,
            transaction_number: number,
            namespace: NAMESPACE.to_string(),
            protocol_genesis_time: GENESIS_TIME,
        }
    }
}

/// One-create batch used by several tests; returns the txn and the DID's
/// unique suffix.
pub fn single_create_batch(cas: &MockCas, time: u64) -> (SidetreeTxn, String) {
    let create_delta = delta(&json!({"id": "doc"}), "update-0");
    let create_suffix_data = suffix_data(&create_delta, "recovery-0");
    let suffix = hashing::calculate_model_multihash(&create_suffix_data, SHA2_256).unwrap();

    let batch = TestBatch {
        creates: vec![create_suffix_data],
        deltas: vec![create_delta],
        ..Default::default()
    };

    (batch.anchor(cas, time, 0), suffix)
}
