//! In-process consensus engine
//!
//! A single ordered log with one apply worker. There is no election or
//! replication: role and leader are assigned by the operator (or a test).
//! Payloads live only in the worker queue; once applied, nothing of an entry
//! is retained beyond the log position.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam::channel::{unbounded, Receiver, Sender};
use parking_lot::{Mutex, RwLock};

use super::{ApplyFuture, ApplyPromise, Consensus, LeaderInfo, NodeId, Role, StateMachine};
use crate::error::{QuorumError, Result};

/// Index and term of the last appended entry
#[derive(Debug, Clone, Copy, Default)]
struct LogPosition {
    index: u64,
    term: u64,
}

struct Proposal {
    index: u64,
    term: u64,
    data: Vec<u8>,
    promise: ApplyPromise,
}

struct NodeState {
    role: Role,
    term: u64,
    leader: Option<LeaderInfo>,
}

/// State shared with the apply worker
struct Shared {
    last: Mutex<LogPosition>,
    applied_index: AtomicU64,
    commit_delay: RwLock<Duration>,
}

/// In-process consensus engine
///
/// ## Concurrency:
/// - `state`: RwLock, read on every request, written on role changes
/// - `shared.last`: held while an entry is numbered and queued, so apply order
///   equals log order
/// - The worker thread is the only caller of the state machine
pub struct LocalRaft {
    id: NodeId,
    addr: String,
    state: RwLock<NodeState>,
    shared: Arc<Shared>,
    tx: Mutex<Option<Sender<Proposal>>>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl LocalRaft {
    /// Start an engine as a follower with no known leader
    pub fn new(id: impl Into<NodeId>, addr: impl Into<String>, fsm: Arc<dyn StateMachine>) -> Result<Self> {
        let shared = Arc::new(Shared {
            last: Mutex::new(LogPosition::default()),
            applied_index: AtomicU64::new(0),
            commit_delay: RwLock::new(Duration::ZERO),
        });

        let (tx, rx) = unbounded();
        let worker_shared = Arc::clone(&shared);
        let worker = thread::Builder::new()
            .name("quorumkv-apply".to_string())
            .spawn(move || apply_loop(rx, worker_shared, fsm))?;

        Ok(Self {
            id: id.into(),
            addr: addr.into(),
            state: RwLock::new(NodeState {
                role: Role::Follower,
                term: 0,
                leader: None,
            }),
            shared,
            tx: Mutex::new(Some(tx)),
            worker: Mutex::new(Some(worker)),
        })
    }

    /// Start a new term with this node as leader
    pub fn become_leader(&self) {
        let mut state = self.state.write();
        state.term += 1;
        state.role = Role::Leader;
        state.leader = Some(LeaderInfo {
            id: self.id.clone(),
            addr: self.addr.clone(),
        });
        tracing::info!("Node {} became leader for term {}", self.id, state.term);
    }

    /// Step down to follower of `leader` (or of nobody)
    pub fn become_follower(&self, leader: Option<LeaderInfo>) {
        let mut state = self.state.write();
        state.role = Role::Follower;
        state.leader = leader;
        tracing::info!(
            "Node {} following {}",
            self.id,
            state.leader.as_ref().map(|l| l.id.as_str()).unwrap_or("<unknown>")
        );
    }

    /// Set the role without touching the leader pointer
    pub fn set_role(&self, role: Role) {
        self.state.write().role = role;
    }

    /// Replace the leader pointer without touching the role
    pub fn set_leader(&self, leader: Option<LeaderInfo>) {
        self.state.write().leader = leader;
    }

    /// Delay inserted between append and apply
    pub fn set_commit_delay(&self, delay: Duration) {
        *self.shared.commit_delay.write() = delay;
    }

    pub fn id(&self) -> &NodeId {
        &self.id
    }

    pub fn term(&self) -> u64 {
        self.state.read().term
    }

    /// Index of the last appended entry (0 when the log is empty)
    pub fn last_index(&self) -> u64 {
        self.shared.last.lock().index
    }

    /// Term of the last appended entry (0 when the log is empty)
    pub fn last_term(&self) -> u64 {
        self.shared.last.lock().term
    }

    /// Index of the last applied entry
    pub fn applied_index(&self) -> u64 {
        self.shared.applied_index.load(Ordering::Acquire)
    }

    /// Entries appended but not yet applied
    pub fn pending(&self) -> u64 {
        self.last_index().saturating_sub(self.applied_index())
    }

    /// Stop accepting entries, drain the queue, and join the worker
    pub fn shutdown(&self) {
        drop(self.tx.lock().take());
        if let Some(worker) = self.worker.lock().take() {
            if worker.join().is_err() {
                tracing::error!("Apply worker for node {} panicked", self.id);
            }
        }
    }
}

impl Consensus for LocalRaft {
    fn role(&self) -> Role {
        self.state.read().role
    }

    fn leader(&self) -> Option<LeaderInfo> {
        self.state.read().leader.clone()
    }

    fn submit(&self, data: Vec<u8>, timeout: Duration) -> ApplyFuture {
        let term = {
            let state = self.state.read();
            if state.role != Role::Leader {
                return ApplyFuture::ready(Err(QuorumError::NotLeader));
            }
            state.term
        };

        let tx = match self.tx.lock().as_ref() {
            Some(tx) => tx.clone(),
            None => {
                return ApplyFuture::ready(Err(QuorumError::Replication(
                    "consensus engine is shut down".to_string(),
                )))
            }
        };

        let (promise, future) = ApplyFuture::channel(timeout);

        let mut last = self.shared.last.lock();
        let index = last.index + 1;

        let proposal = Proposal {
            index,
            term,
            data,
            promise,
        };
        if let Err(err) = tx.send(proposal) {
            err.into_inner().promise.resolve(Err(QuorumError::Replication(
                "consensus engine is shut down".to_string(),
            )));
        } else {
            *last = LogPosition { index, term };
            tracing::trace!("Appended entry {} (term {})", index, term);
        }

        future
    }
}

impl Drop for LocalRaft {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Apply committed entries one at a time, in log order
fn apply_loop(rx: Receiver<Proposal>, shared: Arc<Shared>, fsm: Arc<dyn StateMachine>) {
    for proposal in rx.iter() {
        let delay = *shared.commit_delay.read();
        if !delay.is_zero() {
            thread::sleep(delay);
        }

        let response = fsm.apply(proposal.index, &proposal.data);
        shared.applied_index.store(proposal.index, Ordering::Release);
        tracing::debug!("Applied entry {} (term {})", proposal.index, proposal.term);

        proposal.promise.resolve(Ok(response));
    }

    tracing::debug!("Apply worker stopped");
}
