//! Node metadata
//!
//! Maps consensus node ids to the address RESP clients should dial. The
//! consensus engine only knows peer addresses, so redirects resolve through
//! here.

use std::collections::HashMap;

use parking_lot::RwLock;

use crate::consensus::NodeId;
use crate::error::{QuorumError, Result};

/// Stable metadata store contract
pub trait MetadataStore: Send + Sync {
    /// Client-facing address advertised by `id`
    fn client_address(&self, id: &NodeId) -> Result<String>;

    /// Record (or replace) the client-facing address of `id`
    fn register_client_address(&self, id: NodeId, addr: String) -> Result<()>;
}

/// In-memory metadata store
#[derive(Default)]
pub struct MemMetadata {
    client_addrs: RwLock<HashMap<NodeId, String>>,
}

impl MemMetadata {
    pub fn new() -> Self {
        Self::default()
    }
}

impl MetadataStore for MemMetadata {
    fn client_address(&self, id: &NodeId) -> Result<String> {
        self.client_addrs
            .read()
            .get(id)
            .cloned()
            .ok_or_else(|| QuorumError::AddressNotFound(id.clone()))
    }

    fn register_client_address(&self, id: NodeId, addr: String) -> Result<()> {
        tracing::debug!("Node {} advertises client address {}", id, addr);
        self.client_addrs.write().insert(id, addr);
        Ok(())
    }
}
