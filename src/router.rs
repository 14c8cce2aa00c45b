//! Leadership routing
//!
//! Decides whether this node may serve a command and, when it may not,
//! where the client should go instead.

use std::sync::Arc;

use crate::consensus::{Consensus, Role};
use crate::error::{QuorumError, Result};
use crate::metadata::MetadataStore;

/// Answers "am I the leader, and if not, who is?"
///
/// Nothing is cached: every redirect reads the leader pointer and the
/// metadata store again.
#[derive(Clone)]
pub struct LeadershipRouter {
    consensus: Arc<dyn Consensus>,
    metadata: Arc<dyn MetadataStore>,
}

impl LeadershipRouter {
    pub fn new(consensus: Arc<dyn Consensus>, metadata: Arc<dyn MetadataStore>) -> Self {
        Self {
            consensus,
            metadata,
        }
    }

    pub fn is_leader(&self) -> bool {
        self.consensus.role() == Role::Leader
    }

    /// Client address of the current leader
    pub fn resolve_leader_address(&self) -> Result<String> {
        let leader = self.consensus.leader().ok_or(QuorumError::LeaderUnknown)?;
        self.metadata.client_address(&leader.id)
    }
}
