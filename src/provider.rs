// src/provider.rs
//! Batch-file fetcher and assembler: given an anchored transaction, download
//! the batch files it references from CAS and produce the ordered list of
//! anchored operations the transaction carries.

use std::collections::HashSet;
use std::sync::Arc;

use log::debug;

use crate::batch_files::{
    self, BatchFileKind, ChunkFile, CoreIndexFile, CoreProofFile, ProvisionalIndexFile,
    ProvisionalProofFile,
};
use crate::canonicalizer;
use crate::error::{CasError, Error, Result};
use crate::hashing;
use crate::operations::{
    AnchoredOperation, OperationPayload, OperationRequest, SidetreeTxn,
};
use crate::protocol::{Cas, DecompressionProvider, OperationParser, ProtocolParameters};

/// Parsed anchor string: `"<numOps>.<coreIndexURI>"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnchorData {
    pub number_of_operations: usize,
    pub core_index_file_uri: String,
}

/// Parse the ledger-embedded anchor string.
pub fn parse_anchor_string(anchor: &str) -> Result<AnchorData> {
    let Some((num, uri)) = anchor.split_once('.') else {
        return Err(Error::MalformedAnchorString(anchor.to_string()));
    };

    // strictly digits: no sign, no whitespace
    if num.is_empty() || !num.bytes().all(|b| b.is_ascii_digit()) {
        return Err(Error::MalformedAnchorString(anchor.to_string()));
    }

    let number_of_operations = num
        .parse::<usize>()
        .map_err(|_| Error::MalformedAnchorString(anchor.to_string()))?;

    if uri.is_empty() {
        return Err(Error::MalformedAnchorString(anchor.to_string()));
    }

    Ok(AnchorData {
        number_of_operations,
        core_index_file_uri: uri.to_string(),
    })
}

/// Content of all batch files referenced from one core index file.
struct BatchFiles {
    core_index: CoreIndexFile,
    provisional_index: ProvisionalIndexFile,
    core_proof: Option<CoreProofFile>,
    provisional_proof: Option<ProvisionalProofFile>,
    chunk: ChunkFile,
}

/// Operation provider for one protocol version.
pub struct OperationProvider {
    protocol: ProtocolParameters,
    parser: Arc<dyn OperationParser>,
    cas: Arc<dyn Cas>,
    decompressor: Arc<dyn DecompressionProvider>,
}

impl OperationProvider {
    pub fn new(
        protocol: ProtocolParameters,
        parser: Arc<dyn OperationParser>,
        cas: Arc<dyn Cas>,
        decompressor: Arc<dyn DecompressionProvider>,
    ) -> Self {
        Self {
            protocol,
            parser,
            cas,
            decompressor,
        }
    }

    /// Read the batch files referenced by the transaction's anchor string and
    /// assemble the anchored operations in batch order: creates, recovers,
    /// updates, deactivates.
    ///
    /// Emitted operations carry still-empty ledger coordinates; the
    /// transaction processor stamps them.
    pub fn get_txn_operations(&self, txn: &SidetreeTxn) -> Result<Vec<AnchoredOperation>> {
        let anchor_data = parse_anchor_string(&txn.anchor_string)?;

        let core_index = self.get_core_index_file(&anchor_data.core_index_file_uri)?;

        let ops = if core_index.provisional_index_file_uri.is_empty() {
            // no provisional index file means the batch has only deactivates
            self.process_deactivate_only(core_index)?
        } else {
            let files = self.get_batch_files(core_index)?;
            self.assemble_anchored_operations(files)?
        };

        if ops.len() != anchor_data.number_of_operations {
            return Err(Error::OperationCountMismatch {
                expected: anchor_data.number_of_operations,
                actual: ops.len(),
            });
        }

        debug!(
            "assembled {} operation(s) for anchor string [{}]",
            ops.len(),
            txn.anchor_string
        );

        Ok(ops)
    }

    /// Fast path for batches that carry only deactivate operations: no
    /// provisional index, no chunk file.
    fn process_deactivate_only(&self, core_index: CoreIndexFile) -> Result<Vec<AnchoredOperation>> {
        let core_proof = self.get_core_proof_file(&core_index.core_proof_file_uri)?;

        let deactivate_refs = &core_index.operations.deactivate;
        if core_proof.operations.deactivate.len() != deactivate_refs.len() {
            return Err(Error::BatchFileInvalid {
                file: BatchFileKind::CoreProof,
                index: None,
                reason: format!(
                    "number of deactivate proofs[{}] doesn't match number of deactivate operations[{}]",
                    core_proof.operations.deactivate.len(),
                    deactivate_refs.len()
                ),
            });
        }

        let mut suffixes = Vec::with_capacity(deactivate_refs.len());
        let mut ops = Vec::with_capacity(deactivate_refs.len());

        for (entry, signed_data) in deactivate_refs.iter().zip(&core_proof.operations.deactivate) {
            suffixes.push(entry.did_suffix.clone());
            ops.push(self.create_anchored_operation(
                entry.did_suffix.clone(),
                OperationPayload::Deactivate {
                    signed_data: signed_data.clone(),
                    reveal_value: entry.reveal_value.clone(),
                },
            )?);
        }

        check_for_duplicates(&suffixes)?;

        Ok(ops)
    }

    /// Retrieve all batch files referenced from the core index file, applying
    /// the conditional-fetch rules.
    fn get_batch_files(&self, core_index: CoreIndexFile) -> Result<BatchFiles> {
        // core proof file will not exist if the batch has only creates/updates
        let core_proof = if !core_index.core_proof_file_uri.is_empty() {
            Some(self.get_core_proof_file(&core_index.core_proof_file_uri)?)
        } else {
            None
        };

        let provisional_index =
            self.get_provisional_index_file(&core_index.provisional_index_file_uri)?;

        // provisional proof file will not exist if the batch has no updates
        let provisional_proof = if !provisional_index.provisional_proof_file_uri.is_empty() {
            Some(self.get_provisional_proof_file(&provisional_index.provisional_proof_file_uri)?)
        } else {
            None
        };

        let Some(chunk_ref) = provisional_index.chunks.first() else {
            return Err(Error::BatchFileInvalid {
                file: BatchFileKind::ProvisionalIndex,
                index: None,
                reason: "provisional index file is missing chunk file URI".to_string(),
            });
        };

        let chunk = self.get_chunk_file(&chunk_ref.chunk_file_uri)?;

        debug!("successfully downloaded batch files");

        Ok(BatchFiles {
            core_index,
            provisional_index,
            core_proof,
            provisional_proof,
            chunk,
        })
    }

    /// Assemble anchored operations from the downloaded batch files. The
    /// positional joins (proof `i` to operation `i`, delta `i` to operation
    /// `i`) are load-bearing.
    fn assemble_anchored_operations(&self, files: BatchFiles) -> Result<Vec<AnchoredOperation>> {
        let mut suffixes: Vec<String> = Vec::new();
        let mut pending: Vec<(String, OperationPayload)> = Vec::new();

        for entry in &files.core_index.operations.create {
            let suffix = hashing::calculate_model_multihash(
                &entry.suffix_data,
                self.protocol.multihash_algorithm,
            )?;

            suffixes.push(suffix.clone());
            pending.push((
                suffix,
                OperationPayload::Create {
                    suffix_data: entry.suffix_data.clone(),
                    delta: None,
                },
            ));
        }

        let recover_refs = &files.core_index.operations.recover;
        let deactivate_refs = &files.core_index.operations.deactivate;

        if !recover_refs.is_empty() || !deactivate_refs.is_empty() {
            let core_proof = files.core_proof.as_ref().ok_or_else(|| Error::BatchFileInvalid {
                file: BatchFileKind::CoreIndex,
                index: None,
                reason: "core proof file URI is required for recover/deactivate operations"
                    .to_string(),
            })?;

            if core_proof.operations.recover.len() != recover_refs.len()
                || core_proof.operations.deactivate.len() != deactivate_refs.len()
            {
                return Err(Error::BatchFileInvalid {
                    file: BatchFileKind::CoreProof,
                    index: None,
                    reason: format!(
                        "number of proofs (recover[{}], deactivate[{}]) doesn't match number of operations (recover[{}], deactivate[{}])",
                        core_proof.operations.recover.len(),
                        core_proof.operations.deactivate.len(),
                        recover_refs.len(),
                        deactivate_refs.len()
                    ),
                });
            }
        }

        if let Some(core_proof) = &files.core_proof {
            // counts were checked above, so the zip is total
            for (entry, signed_data) in recover_refs.iter().zip(&core_proof.operations.recover) {
                suffixes.push(entry.did_suffix.clone());
                pending.push((
                    entry.did_suffix.clone(),
                    OperationPayload::Recover {
                        signed_data: signed_data.clone(),
                        delta: None,
                        reveal_value: entry.reveal_value.clone(),
                    },
                ));
            }
        }

        let update_refs = &files.provisional_index.operations.update;

        if !update_refs.is_empty() {
            let provisional_proof =
                files
                    .provisional_proof
                    .as_ref()
                    .ok_or_else(|| Error::BatchFileInvalid {
                        file: BatchFileKind::ProvisionalIndex,
                        index: None,
                        reason: "provisional proof file URI is required for update operations"
                            .to_string(),
                    })?;

            if provisional_proof.operations.update.len() != update_refs.len() {
                return Err(Error::BatchFileInvalid {
                    file: BatchFileKind::ProvisionalProof,
                    index: None,
                    reason: format!(
                        "number of update proofs[{}] doesn't match number of update operations[{}]",
                        provisional_proof.operations.update.len(),
                        update_refs.len()
                    ),
                });
            }

            for (i, entry) in update_refs.iter().enumerate() {
                suffixes.push(entry.did_suffix.clone());
                pending.push((
                    entry.did_suffix.clone(),
                    OperationPayload::Update {
                        signed_data: provisional_proof.operations.update[i].clone(),
                        delta: None,
                        reveal_value: entry.reveal_value.clone(),
                    },
                ));
            }
        }

        if files.chunk.deltas.len() != pending.len() {
            return Err(Error::BatchFileInvalid {
                file: BatchFileKind::Chunk,
                index: None,
                reason: format!(
                    "number of create+recover+update operations[{}] doesn't match number of deltas[{}]",
                    pending.len(),
                    files.chunk.deltas.len()
                ),
            });
        }

        for ((_, payload), chunk_delta) in pending.iter_mut().zip(files.chunk.deltas) {
            match payload {
                OperationPayload::Create { delta, .. }
                | OperationPayload::Update { delta, .. }
                | OperationPayload::Recover { delta, .. } => *delta = Some(chunk_delta),
                OperationPayload::Deactivate { .. } => {}
            }
        }

        if let Some(core_proof) = &files.core_proof {
            for (entry, signed_data) in deactivate_refs.iter().zip(&core_proof.operations.deactivate)
            {
                suffixes.push(entry.did_suffix.clone());
                pending.push((
                    entry.did_suffix.clone(),
                    OperationPayload::Deactivate {
                        signed_data: signed_data.clone(),
                        reveal_value: entry.reveal_value.clone(),
                    },
                ));
            }
        }

        check_for_duplicates(&suffixes)?;

        pending
            .into_iter()
            .map(|(suffix, payload)| self.create_anchored_operation(suffix, payload))
            .collect()
    }

    /// Build the anchored operation envelope, serializing the original
    /// request form so version-dispatched parsers can re-extract reveal
    /// values and commitments later.
    fn create_anchored_operation(
        &self,
        unique_suffix: String,
        payload: OperationPayload,
    ) -> Result<AnchoredOperation> {
        let request = operation_request(&unique_suffix, &payload);
        let operation_request = canonicalizer::marshal_canonical(&request)?;

        let anchor_origin = match &payload {
            OperationPayload::Create { suffix_data, .. } => suffix_data.anchor_origin.clone(),
            _ => None,
        };

        Ok(AnchoredOperation {
            unique_suffix,
            payload,
            protocol_version: 0,
            transaction_time: 0,
            transaction_number: 0,
            operation_request,
            canonical_reference: String::new(),
            equivalent_references: Vec::new(),
            anchor_origin,
        })
    }

    fn get_core_index_file(&self, uri: &str) -> Result<CoreIndexFile> {
        let content = self.read_from_cas(uri, self.protocol.max_core_index_file_size)?;

        let file = batch_files::parse_core_index_file(&content).map_err(|e| {
            Error::BatchFileInvalid {
                file: BatchFileKind::CoreIndex,
                index: None,
                reason: format!("failed to parse content for core index file[{}]: {}", uri, e),
            }
        })?;

        self.validate_core_index_file(&file)?;

        Ok(file)
    }

    fn validate_core_index_file(&self, file: &CoreIndexFile) -> Result<()> {
        for (i, op) in file.operations.create.iter().enumerate() {
            self.parser
                .validate_suffix_data(&op.suffix_data)
                .map_err(|e| Error::BatchFileInvalid {
                    file: BatchFileKind::CoreIndex,
                    index: Some(i),
                    reason: format!("failed to validate suffix data for create[{}]: {}", i, e),
                })?;
        }

        Ok(())
    }

    fn get_core_proof_file(&self, uri: &str) -> Result<CoreProofFile> {
        let content = self.read_from_cas(uri, self.protocol.max_proof_file_size)?;

        let file = batch_files::parse_core_proof_file(&content).map_err(|e| {
            Error::BatchFileInvalid {
                file: BatchFileKind::CoreProof,
                index: None,
                reason: format!("failed to parse content for core proof file[{}]: {}", uri, e),
            }
        })?;

        self.validate_core_proof_file(&file)?;

        Ok(file)
    }

    fn validate_core_proof_file(&self, file: &CoreProofFile) -> Result<()> {
        for (i, signed_data) in file.operations.recover.iter().enumerate() {
            self.parser
                .parse_signed_data_for_recover(signed_data)
                .map_err(|e| Error::BatchFileInvalid {
                    file: BatchFileKind::CoreProof,
                    index: Some(i),
                    reason: format!("failed to validate signed data for recover[{}]: {}", i, e),
                })?;
        }

        for (i, signed_data) in file.operations.deactivate.iter().enumerate() {
            self.parser
                .parse_signed_data_for_deactivate(signed_data)
                .map_err(|e| Error::BatchFileInvalid {
                    file: BatchFileKind::CoreProof,
                    index: Some(i),
                    reason: format!("failed to validate signed data for deactivate[{}]: {}", i, e),
                })?;
        }

        Ok(())
    }

    fn get_provisional_index_file(&self, uri: &str) -> Result<ProvisionalIndexFile> {
        let content = self.read_from_cas(uri, self.protocol.max_provisional_index_file_size)?;

        batch_files::parse_provisional_index_file(&content).map_err(|e| Error::BatchFileInvalid {
            file: BatchFileKind::ProvisionalIndex,
            index: None,
            reason: format!(
                "failed to parse content for provisional index file[{}]: {}",
                uri, e
            ),
        })
    }

    fn get_provisional_proof_file(&self, uri: &str) -> Result<ProvisionalProofFile> {
        let content = self.read_from_cas(uri, self.protocol.max_proof_file_size)?;

        let file = batch_files::parse_provisional_proof_file(&content).map_err(|e| {
            Error::BatchFileInvalid {
                file: BatchFileKind::ProvisionalProof,
                index: None,
                reason: format!(
                    "failed to parse content for provisional proof file[{}]: {}",
                    uri, e
                ),
            }
        })?;

        self.validate_provisional_proof_file(&file)?;

        Ok(file)
    }

    fn validate_provisional_proof_file(&self, file: &ProvisionalProofFile) -> Result<()> {
        for (i, signed_data) in file.operations.update.iter().enumerate() {
            self.parser
                .parse_signed_data_for_update(signed_data)
                .map_err(|e| Error::BatchFileInvalid {
                    file: BatchFileKind::ProvisionalProof,
                    index: Some(i),
                    reason: format!("failed to validate signed data for update[{}]: {}", i, e),
                })?;
        }

        Ok(())
    }

    fn get_chunk_file(&self, uri: &str) -> Result<ChunkFile> {
        let content = self.read_from_cas(uri, self.protocol.max_chunk_file_size)?;

        let file = batch_files::parse_chunk_file(&content).map_err(|e| Error::BatchFileInvalid {
            file: BatchFileKind::Chunk,
            index: None,
            reason: format!("failed to parse content for chunk file[{}]: {}", uri, e),
        })?;

        self.validate_chunk_file(&file)?;

        Ok(file)
    }

    fn validate_chunk_file(&self, file: &ChunkFile) -> Result<()> {
        for (i, delta) in file.deltas.iter().enumerate() {
            self.parser
                .validate_delta(delta)
                .map_err(|e| Error::BatchFileInvalid {
                    file: BatchFileKind::Chunk,
                    index: Some(i),
                    reason: format!("failed to validate delta[{}]: {}", i, e),
                })?;
        }

        Ok(())
    }

    /// Fetch one file from CAS: size-check the compressed bytes against the
    /// protocol cap, then decompress.
    fn read_from_cas(&self, uri: &str, max_size: usize) -> Result<Vec<u8>> {
        if uri.is_empty() {
            return Err(Error::CasUnavailable {
                uri: String::new(),
                reason: "no CAS URI provided".to_string(),
            });
        }

        let bytes = self.cas.read(uri).map_err(|e| match e {
            CasError::Cancelled => Error::Cancelled,
            other => Error::CasUnavailable {
                uri: uri.to_string(),
                reason: other.to_string(),
            },
        })?;

        if bytes.len() > max_size {
            return Err(Error::ContentTooLarge {
                uri: uri.to_string(),
                size: bytes.len(),
                max: max_size,
            });
        }

        self.decompressor
            .decompress(&self.protocol.compression_algorithm, &bytes)
            .map_err(|e| Error::DecompressionFailed {
                uri: uri.to_string(),
                alg: self.protocol.compression_algorithm.clone(),
                reason: e.to_string(),
            })
    }
}

fn operation_request(unique_suffix: &str, payload: &OperationPayload) -> OperationRequest {
    match payload {
        OperationPayload::Create { suffix_data, delta } => OperationRequest {
            kind: payload.kind(),
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
            kind: payload.kind(),
            did_suffix: Some(unique_suffix.to_string()),
            reveal_value: Some(reveal_value.clone()),
            suffix_data: None,
            delta: None,
            signed_data: Some(signed_data.clone()),
        },
    }
}

fn check_for_duplicates(suffixes: &[String]) -> Result<()> {
    let mut seen = HashSet::new();
    let mut duplicates = Vec::new();

    for suffix in suffixes {
        if !seen.insert(suffix.as_str()) {
            duplicates.push(suffix.clone());
        }
    }

    if !duplicates.is_empty() {
        return Err(Error::DuplicateSuffixInBatch(duplicates));
    }

    Ok(())
}
