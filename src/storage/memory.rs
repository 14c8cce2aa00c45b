//! In-memory store
//!
//! BTreeMap-based store with RwLock for concurrency.

use std::collections::BTreeMap;

use parking_lot::RwLock;

use super::Store;
use crate::error::{QuorumError, Result};

/// In-memory key-value store
///
/// Reads take the read lock and run concurrently; the apply worker is the
/// only writer in practice.
#[derive(Default)]
pub struct MemStore {
    data: RwLock<BTreeMap<Vec<u8>, Vec<u8>>>,
}

impl MemStore {
    /// Create a new empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of every key-value pair in key order
    pub fn snapshot(&self) -> BTreeMap<Vec<u8>, Vec<u8>> {
        self.data.read().clone()
    }
}

impl Store for MemStore {
    fn get(&self, key: &[u8]) -> Result<Vec<u8>> {
        self.data
            .read()
            .get(key)
            .cloned()
            .ok_or(QuorumError::KeyNotFound)
    }

    fn put(&self, key: Vec<u8>, value: Vec<u8>) -> Result<()> {
        self.data.write().insert(key, value);
        Ok(())
    }

    fn delete(&self, key: &[u8]) -> Result<()> {
        self.data
            .write()
            .remove(key)
            .map(|_| ())
            .ok_or(QuorumError::KeyNotFound)
    }

    fn len(&self) -> usize {
        self.data.read().len()
    }
}
