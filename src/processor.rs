// src/processor.rs
//! Transaction processor: persists the operations carried by one anchored
//! transaction, stamping each with its ledger coordinates.

use std::collections::HashSet;
use std::sync::Arc;

use log::{debug, warn};

use crate::error::{Error, Result, StoreError};
use crate::operations::{AnchoredOperation, OperationKind, SidetreeTxn};
use crate::protocol::{OperationStore, UnpublishedOperationStore};
use crate::provider::OperationProvider;

/// Configuration for the transaction processor.
#[derive(Default, Clone)]
pub struct TxnProcessorOptions {
    /// Mailbox of locally-known operations awaiting anchoring. When set,
    /// operations of the configured kinds are removed from it once anchored.
    pub unpublished_store: Option<Arc<dyn UnpublishedOperationStore>>,
    pub unpublished_operation_types: Vec<OperationKind>,
}

/// Processes anchored transactions by persisting their operations to the
/// operation store.
pub struct TxnProcessor {
    op_store: Arc<dyn OperationStore>,
    provider: OperationProvider,
    unpublished_store: Option<Arc<dyn UnpublishedOperationStore>>,
    unpublished_operation_types: Vec<OperationKind>,
}

impl TxnProcessor {
    pub fn new(
        op_store: Arc<dyn OperationStore>,
        provider: OperationProvider,
        options: TxnProcessorOptions,
    ) -> Self {
        Self {
            op_store,
            provider,
            unpublished_store: options.unpublished_store,
            unpublished_operation_types: options.unpublished_operation_types,
        }
    }

    /// Persist all operations anchored by the given transaction. `suffixes`
    /// restricts processing to the listed DIDs; empty means all.
    pub fn process(&self, txn: &SidetreeTxn, suffixes: &[String]) -> Result<()> {
        debug!(
            "processing sidetree txn time[{}] number[{}] anchor string[{}]",
            txn.transaction_time, txn.transaction_number, txn.anchor_string
        );

        let txn_ops = self.provider.get_txn_operations(txn)?;

        self.process_txn_operations(txn_ops, txn, suffixes)
    }

    fn process_txn_operations(
        &self,
        txn_ops: Vec<AnchoredOperation>,
        txn: &SidetreeTxn,
        wanted: &[String],
    ) -> Result<()> {
        debug!("processing {} transaction operation(s)", txn_ops.len());

        let mut batch_suffixes: HashSet<String> = HashSet::new();
        let mut unpublished_suffixes: Vec<String> = Vec::new();
        let mut ops: Vec<AnchoredOperation> = Vec::with_capacity(txn_ops.len());

        for mut op in txn_ops {
            if !wanted.is_empty() && !wanted.contains(&op.unique_suffix) {
                continue;
            }

            // duplicates at this layer are recoverable: keep the first, drop
            // the rest
            if !batch_suffixes.insert(op.unique_suffix.clone()) {
                warn!(
                    "[{}] duplicate suffix[{}] found in transaction operations: discarding operation",
                    txn.namespace, op.unique_suffix
                );
                continue;
            }

            op.transaction_time = txn.transaction_time;
            op.transaction_number = txn.transaction_number;
            op.protocol_version = txn.protocol_genesis_time;

            if self.unpublished_operation_types.contains(&op.kind()) {
                unpublished_suffixes.push(op.unique_suffix.clone());
            }

            ops.push(op);
        }

        self.op_store.put(ops).map_err(|e| match e {
            StoreError::Cancelled => Error::Cancelled,
            other => Error::StoreWriteFailed(other),
        })?;

        if let Some(store) = &self.unpublished_store {
            if !unpublished_suffixes.is_empty() {
                store.delete_all(&unpublished_suffixes).map_err(|e| match e {
                    StoreError::Cancelled => Error::Cancelled,
                    other => Error::StoreCleanupFailed(other),
                })?;
            }
        }

        Ok(())
    }
}
