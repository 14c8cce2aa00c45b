//! Storage Module
//!
//! The key-value state behind reads and applied writes.
//!
//! ## Responsibilities
//! - Point lookups for `GET`, served without going through the log
//! - Mutations, called only by the state machine while applying entries
//! - Report absent keys as `KeyNotFound`, distinct from other failures

mod memory;

pub use memory::MemStore;

use crate::error::Result;

/// Storage engine contract
///
/// Implementations synchronise internally; every method takes `&self`.
pub trait Store: Send + Sync {
    /// Current value of `key`, or `KeyNotFound`
    fn get(&self, key: &[u8]) -> Result<Vec<u8>>;

    /// Insert or overwrite `key`
    fn put(&self, key: Vec<u8>, value: Vec<u8>) -> Result<()>;

    /// Remove `key`, or `KeyNotFound` if it was absent
    fn delete(&self, key: &[u8]) -> Result<()>;

    /// Number of live keys
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
