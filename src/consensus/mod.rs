//! Consensus Module
//!
//! The seam between request dispatch and whatever orders writes.
//!
//! ## Responsibilities
//! - Report this node's role and the current leader
//! - Accept serialized write intents and resolve them once applied
//! - Hand committed entries to a `StateMachine` in log order
//!
//! The dispatcher only sees the `Consensus` trait. `LocalRaft` is an
//! in-process engine with a statically assigned role, used by the server
//! binary and the tests.

mod entry;
mod local;

use std::fmt;
use std::time::{Duration, Instant};

use crossbeam::channel::{bounded, Receiver, RecvTimeoutError, Sender};
use serde::{Deserialize, Serialize};

use crate::error::{QuorumError, Result};

pub use entry::{
    decode_outcome, ApplyFailure, ApplyOutcome, LogEntry, Operation, ENTRY_VERSION, HEADER_SIZE,
};
pub use local::LocalRaft;

/// Identifier of a node in the consensus group
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(String);

impl NodeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for NodeId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Role of the local node in the current term
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Leader,
    Follower,
    Candidate,
}

/// The leader as known by the consensus engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeaderInfo {
    pub id: NodeId,

    /// Peer-to-peer address of the leader (not its client address)
    pub addr: String,
}

/// Ordering and replication of write intents
pub trait Consensus: Send + Sync {
    /// Current role of this node
    fn role(&self) -> Role;

    /// Current leader, or `None` while no leader is known (e.g. mid-election)
    fn leader(&self) -> Option<LeaderInfo>;

    /// Submit a serialized entry. The returned future waits at most `timeout`
    /// for commit+apply; expiry does not withdraw the entry.
    fn submit(&self, data: Vec<u8>, timeout: Duration) -> ApplyFuture;
}

/// Receives committed entries in log order
pub trait StateMachine: Send + Sync {
    /// Apply one committed entry and return the raw response for its submitter
    fn apply(&self, index: u64, data: &[u8]) -> Vec<u8>;
}

// =============================================================================
// Apply Future
// =============================================================================

/// Pending result of a submitted entry
pub struct ApplyFuture {
    state: FutureState,
    timeout: Duration,
}

enum FutureState {
    Ready(Result<Vec<u8>>),
    Pending {
        rx: Receiver<Result<Vec<u8>>>,
        deadline: Instant,
    },
}

/// Completion side of an `ApplyFuture`
pub struct ApplyPromise {
    tx: Sender<Result<Vec<u8>>>,
}

impl ApplyFuture {
    /// A future that is already resolved
    pub fn ready(result: Result<Vec<u8>>) -> Self {
        Self {
            state: FutureState::Ready(result),
            timeout: Duration::ZERO,
        }
    }

    /// A linked promise/future pair; the clock starts now
    pub fn channel(timeout: Duration) -> (ApplyPromise, ApplyFuture) {
        let (tx, rx) = bounded(1);
        let future = Self {
            state: FutureState::Pending {
                rx,
                deadline: Instant::now() + timeout,
            },
            timeout,
        };
        (ApplyPromise { tx }, future)
    }

    /// Block until the entry is applied, the engine fails it, or the timeout
    /// elapses. Returns the raw apply response.
    pub fn wait(self) -> Result<Vec<u8>> {
        match self.state {
            FutureState::Ready(result) => result,
            FutureState::Pending { rx, deadline } => match rx.recv_deadline(deadline) {
                Ok(result) => result,
                Err(RecvTimeoutError::Timeout) => Err(QuorumError::ApplyTimeout(self.timeout)),
                Err(RecvTimeoutError::Disconnected) => Err(QuorumError::Replication(
                    "entry dropped before it was applied".to_string(),
                )),
            },
        }
    }
}

impl ApplyPromise {
    /// Deliver the result; a waiter that already timed out is ignored
    pub fn resolve(self, result: Result<Vec<u8>>) {
        let _ = self.tx.send(result);
    }
}
