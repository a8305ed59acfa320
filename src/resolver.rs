// src/resolver.rs
//! Operation replay engine. Reconstructs the current state of a DID by
//! replaying its operations in canonical order while verifying the chain of
//! cryptographic commitments: every non-create operation must consume a
//! commitment that has not been consumed before in the same resolution.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use log::{debug, info, warn};
use serde_json::Value;

use crate::commitment;
use crate::error::{ApplyError, Error, Result, StoreError};
use crate::operations::{sort_operations, AnchoredOperation, OperationKind};
use crate::protocol::{OperationStore, ProtocolRegistry, UnpublishedOperationStore};

/// Materialized DID state produced by resolution. Reconstructed per resolve
/// call; never persisted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolutionModel {
    pub doc: Option<Value>,
    pub last_operation_transaction_time: u64,
    pub last_operation_transaction_number: u64,
    pub update_commitment: String,
    pub recovery_commitment: String,
    pub deactivated: bool,
    pub anchor_origin: Option<Value>,
    pub version_id: String,
    /// Operations gathered from the operation store (plus anchored
    /// additional operations), not the subset actually applied.
    pub published_operations: Vec<AnchoredOperation>,
    /// Operations gathered from the unpublished-operation store (plus
    /// unanchored additional operations).
    pub unpublished_operations: Vec<AnchoredOperation>,
}

/// Which commitment chain a class of operations consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitmentKind {
    /// Update operations chain on the update commitment.
    Update,
    /// Recover and deactivate operations chain on the recovery commitment.
    Recovery,
}

impl CommitmentKind {
    /// Commitment of this kind currently held by the state.
    fn of<'a>(&self, state: &'a ResolutionModel) -> &'a str {
        match self {
            CommitmentKind::Update => &state.update_commitment,
            CommitmentKind::Recovery => &state.recovery_commitment,
        }
    }
}

/// Configuration for the resolver.
#[derive(Default, Clone)]
pub struct ResolverOptions {
    pub unpublished_store: Option<Arc<dyn UnpublishedOperationStore>>,
}

/// Replays document operations in chronological order to produce the final
/// document state during resolution.
pub struct Resolver {
    name: String,
    store: Arc<dyn OperationStore>,
    registry: Arc<dyn ProtocolRegistry>,
    unpublished_store: Option<Arc<dyn UnpublishedOperationStore>>,
}

impl Resolver {
    /// `name` is only used for logging.
    pub fn new(
        name: impl Into<String>,
        store: Arc<dyn OperationStore>,
        registry: Arc<dyn ProtocolRegistry>,
        options: ResolverOptions,
    ) -> Self {
        Self {
            name: name.into(),
            store,
            registry,
            unpublished_store: options.unpublished_store,
        }
    }

    /// Resolve the document with the given unique suffix ("abc123" in
    /// "did:sidetree:abc123"). `additional_ops` join the gathered operations:
    /// anchored ones (non-empty canonical reference) count as published
    /// unless already known, the rest as unpublished.
    pub fn resolve(
        &self,
        unique_suffix: &str,
        additional_ops: &[AnchoredOperation],
    ) -> Result<ResolutionModel> {
        let mut published = match self.store.get(unique_suffix) {
            Ok(ops) => ops,
            Err(StoreError::NotFound) => Vec::new(),
            Err(StoreError::Cancelled) => return Err(Error::Cancelled),
            Err(other) => return Err(Error::StoreReadFailed(other)),
        };

        let mut unpublished = match &self.unpublished_store {
            Some(store) => match store.get(unique_suffix) {
                Ok(ops) => {
                    debug!(
                        "[{}] found {} unpublished operation(s) for unique suffix [{}]",
                        self.name,
                        ops.len(),
                        unique_suffix
                    );
                    ops
                }
                Err(StoreError::Cancelled) => return Err(Error::Cancelled),
                Err(e) => {
                    debug!(
                        "[{}] unpublished operation store failed for unique suffix [{}], treating as empty: {}",
                        self.name, unique_suffix, e
                    );
                    Vec::new()
                }
            },
            None => Vec::new(),
        };

        add_additional_operations(&mut published, &mut unpublished, additional_ops);

        let mut ops: Vec<AnchoredOperation> = published
            .iter()
            .cloned()
            .chain(unpublished.iter().cloned())
            .collect();
        sort_operations(&mut ops);

        debug!(
            "[{}] found {} operation(s) for unique suffix [{}]",
            self.name,
            ops.len(),
            unique_suffix
        );

        let (create_ops, update_ops, full_ops) = split_operations(ops);
        if create_ops.is_empty() {
            return Err(Error::NoCreateOperation);
        }

        // a DID has one effective genesis: the first create that applies
        let mut state = self
            .apply_first_valid_create_operation(&create_ops)
            .ok_or(Error::NoValidCreate)?;

        if !full_ops.is_empty() {
            debug!(
                "[{}] applying {} full operation(s) for unique suffix [{}]",
                self.name,
                full_ops.len(),
                unique_suffix
            );

            state = self.apply_operations(&full_ops, state, CommitmentKind::Recovery);
        }

        if !state.deactivated {
            // apply updates anchored after the last full operation;
            // unpublished updates are always eligible
            let filtered_update_ops: Vec<AnchoredOperation> = update_ops
                .into_iter()
                .filter(|op| {
                    is_op_with_txn_greater_than_or_unpublished(
                        op,
                        state.last_operation_transaction_time,
                        state.last_operation_transaction_number,
                    )
                })
                .collect();

            if !filtered_update_ops.is_empty() {
                debug!(
                    "[{}] applying {} update operation(s) after last full operation for unique suffix [{}]",
                    self.name,
                    filtered_update_ops.len(),
                    unique_suffix
                );

                state = self.apply_operations(&filtered_update_ops, state, CommitmentKind::Update);
            }
        }

        state.published_operations = published;
        state.unpublished_operations = unpublished;

        Ok(state)
    }

    fn apply_first_valid_create_operation(
        &self,
        create_ops: &[AnchoredOperation],
    ) -> Option<ResolutionModel> {
        let seed = ResolutionModel::default();

        for op in create_ops {
            match self.apply_operation(op, &seed) {
                Ok(state) => {
                    debug!(
                        "[{}] applied create operation {}, recovery commitment[{}], update commitment[{}]",
                        self.name,
                        describe(op),
                        state.recovery_commitment,
                        state.update_commitment
                    );
                    return Some(state);
                }
                Err(e) => {
                    info!(
                        "[{}] skipped bad operation {}: {}",
                        self.name,
                        describe(op),
                        e
                    );
                }
            }
        }

        None
    }

    /// Walk one commitment chain: starting from the state's current
    /// commitment, repeatedly apply the first valid operation revealing it,
    /// then advance to the commitment the new state holds. Each commitment is
    /// consumed at most once.
    fn apply_operations(
        &self,
        ops: &[AnchoredOperation],
        state: ResolutionModel,
        kind: CommitmentKind,
    ) -> ResolutionModel {
        let unique_suffix = ops
            .first()
            .map(|op| op.unique_suffix.clone())
            .unwrap_or_default();

        let op_map = self.create_operation_hash_map(ops);

        let mut consumed: HashSet<String> = HashSet::new();
        let mut state = state;
        let mut commitment = kind.of(&state).to_string();

        while !commitment.is_empty() {
            let Some(candidates) = op_map.get(&commitment) else {
                break;
            };

            debug!(
                "[{}] found {} operation(s) for commitment [{}] {{unique_suffix: {}}}",
                self.name,
                candidates.len(),
                commitment,
                unique_suffix
            );

            let Some(new_state) =
                self.apply_first_valid_operation(candidates, &state, &commitment, &consumed)
            else {
                info!(
                    "[{}] unable to apply valid operation for commitment [{}] {{unique_suffix: {}}}",
                    self.name, commitment, unique_suffix
                );
                break;
            };

            consumed.insert(commitment);
            state = new_state;
            commitment = kind.of(&state).to_string();

            debug!(
                "[{}] next commitment to process is [{}] {{unique_suffix: {}}}",
                self.name, commitment, unique_suffix
            );
        }

        if consumed.len() != ops.len() {
            debug!(
                "[{}] number of commitments consumed [{}] doesn't match number of operations [{}] {{unique_suffix: {}}}",
                self.name,
                consumed.len(),
                ops.len(),
                unique_suffix
            );
        }

        state
    }

    /// Bucket operations by the commitment their reveal value satisfies.
    /// Operations whose reveal value or commitment cannot be computed are
    /// dropped.
    fn create_operation_hash_map<'a>(
        &self,
        ops: &'a [AnchoredOperation],
    ) -> HashMap<String, Vec<&'a AnchoredOperation>> {
        let mut op_map: HashMap<String, Vec<&AnchoredOperation>> = HashMap::new();

        for op in ops {
            let reveal_value = match self.get_reveal_value(op) {
                Ok(rv) => rv,
                Err(e) => {
                    info!(
                        "[{}] skipped operation while creating operation hash map {}: {}",
                        self.name,
                        describe(op),
                        e
                    );
                    continue;
                }
            };

            let commitment = match commitment::get_commitment_from_reveal_value(&reveal_value) {
                Ok(c) => c,
                Err(e) => {
                    info!(
                        "[{}] skipped calculating commitment while creating operation hash map {}: {}",
                        self.name,
                        describe(op),
                        e
                    );
                    continue;
                }
            };

            op_map.entry(commitment).or_default().push(op);
        }

        op_map
    }

    /// Apply the first candidate that passes the chain rules: its declared
    /// next commitment must differ from the commitment it consumes (no
    /// self-loop) and must not have been consumed already (no reuse).
    fn apply_first_valid_operation(
        &self,
        ops: &[&AnchoredOperation],
        state: &ResolutionModel,
        current_commitment: &str,
        consumed: &HashSet<String>,
    ) -> Option<ResolutionModel> {
        for op in ops {
            let next_commitment = match self.get_commitment(op) {
                Ok(c) => c,
                Err(e) => {
                    info!(
                        "[{}] skipped bad operation {}: {}",
                        self.name,
                        describe(op),
                        e
                    );
                    continue;
                }
            };

            if next_commitment == current_commitment {
                // an operation committing to its own reveal value would make
                // the DID irrevocable
                info!(
                    "[{}] skipped bad operation {}: operation commitment equals next operation commitment",
                    self.name,
                    describe(op)
                );
                continue;
            }

            if !next_commitment.is_empty() && consumed.contains(&next_commitment) {
                info!(
                    "[{}] skipped bad operation {}: next operation commitment has already been used",
                    self.name,
                    describe(op)
                );
                continue;
            }

            match self.apply_operation(op, state) {
                Ok(new_state) => {
                    debug!(
                        "[{}] applied operation {}, recovery commitment[{}], update commitment[{}], deactivated[{}]",
                        self.name,
                        describe(op),
                        new_state.recovery_commitment,
                        new_state.update_commitment,
                        new_state.deactivated
                    );
                    return Some(new_state);
                }
                Err(e) => {
                    info!(
                        "[{}] skipped bad operation {}: {}",
                        self.name,
                        describe(op),
                        e
                    );
                }
            }
        }

        None
    }

    fn apply_operation(
        &self,
        op: &AnchoredOperation,
        state: &ResolutionModel,
    ) -> Result<ResolutionModel> {
        let protocol = self.registry.get(op.protocol_version)?;

        Ok(protocol.applier.apply(op, state)?)
    }

    fn get_reveal_value(&self, op: &AnchoredOperation) -> Result<String> {
        if op.kind() == OperationKind::Create {
            return Err(Error::Apply(ApplyError::Other(
                "create operation doesn't have reveal value".to_string(),
            )));
        }

        let protocol = self.registry.get(op.protocol_version)?;

        Ok(protocol.parser.get_reveal_value(&op.operation_request)?)
    }

    fn get_commitment(&self, op: &AnchoredOperation) -> Result<String> {
        let protocol = self.registry.get(op.protocol_version)?;

        Ok(protocol.parser.get_commitment(&op.operation_request)?)
    }
}

/// Merge caller-provided operations into the gathered lists, then restore
/// order. Anchored additional operations with a canonical reference already
/// present are dropped.
fn add_additional_operations(
    published: &mut Vec<AnchoredOperation>,
    unpublished: &mut Vec<AnchoredOperation>,
    additional: &[AnchoredOperation],
) {
    let mut canonical_refs: HashSet<String> = published
        .iter()
        .map(|op| op.canonical_reference.clone())
        .collect();

    for op in additional {
        if op.canonical_reference.is_empty() {
            unpublished.push(op.clone());
        } else if canonical_refs.insert(op.canonical_reference.clone()) {
            published.push(op.clone());
        } else {
            warn!(
                "dropping additional operation with duplicate canonical reference [{}]",
                op.canonical_reference
            );
        }
    }

    sort_operations(published);
    sort_operations(unpublished);
}

type SplitOps = (
    Vec<AnchoredOperation>,
    Vec<AnchoredOperation>,
    Vec<AnchoredOperation>,
);

/// Split into create, update and full (recover/deactivate) operations,
/// preserving order.
fn split_operations(ops: Vec<AnchoredOperation>) -> SplitOps {
    let mut create_ops = Vec::new();
    let mut update_ops = Vec::new();
    let mut full_ops = Vec::new();

    for op in ops {
        match op.kind() {
            OperationKind::Create => create_ops.push(op),
            OperationKind::Update => update_ops.push(op),
            OperationKind::Recover | OperationKind::Deactivate => full_ops.push(op),
        }
    }

    (create_ops, update_ops, full_ops)
}

fn is_op_with_txn_greater_than_or_unpublished(
    op: &AnchoredOperation,
    txn_time: u64,
    txn_number: u64,
) -> bool {
    if op.canonical_reference.is_empty() {
        return true;
    }

    (op.transaction_time, op.transaction_number) > (txn_time, txn_number)
}

fn describe(op: &AnchoredOperation) -> String {
    format!(
        "{{unique_suffix: {}, type: {}, transaction_time: {}, transaction_number: {}}}",
        op.unique_suffix, op.kind(), op.transaction_time, op.transaction_number
    )
}
