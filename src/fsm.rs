//! Key-value state machine
//!
//! Applies committed log entries to a `Store` and encodes the outcome that
//! travels back to the submitting request.

use std::sync::Arc;

use crate::consensus::{ApplyFailure, ApplyOutcome, LogEntry, Operation, StateMachine};
use crate::error::{QuorumError, Result};
use crate::storage::Store;

/// State machine backed by a key-value `Store`
pub struct KvStateMachine {
    store: Arc<dyn Store>,
}

impl KvStateMachine {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    fn apply_entry(&self, entry: LogEntry) -> Result<()> {
        match (entry.op, entry.value) {
            (Operation::Put, Some(value)) => self.store.put(entry.key, value),
            (Operation::Delete, _) => self.store.delete(&entry.key),
            (Operation::Put, None) => Err(QuorumError::Rejected(
                "put entry carries no value".to_string(),
            )),
        }
    }
}

impl StateMachine for KvStateMachine {
    fn apply(&self, index: u64, data: &[u8]) -> Vec<u8> {
        let outcome = match LogEntry::decode(data).and_then(|entry| self.apply_entry(entry)) {
            Ok(()) => ApplyOutcome::applied(),
            Err(QuorumError::KeyNotFound) => ApplyOutcome::Failed(ApplyFailure::KeyNotFound),
            Err(e) => {
                tracing::warn!("Entry {} rejected by state machine: {}", index, e);
                ApplyOutcome::Failed(ApplyFailure::Rejected(e.to_string()))
            }
        };

        match outcome.encode() {
            Ok(bytes) => bytes,
            Err(e) => {
                // The submitter sees an undecodable response and reports it
                tracing::error!("Failed to encode outcome of entry {}: {}", index, e);
                Vec::new()
            }
        }
    }
}
