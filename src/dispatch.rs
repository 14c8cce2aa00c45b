//! Dispatch Module
//!
//! Per-request orchestration between the protocol and the replicated state.
//!
//! ## Request Flow
//! ```text
//! Validating ─▶ RoutingDecision ─┬─▶ redirect (not leader)
//!                                ├─▶ LocalRead  (GET)
//!                                └─▶ SubmitWrite (SET / DEL)
//!                                            │
//!                                            ▼
//!                                       Responding
//! ```
//!
//! ## Responsibilities
//! - Gate every command, reads included, on leadership
//! - Serve reads from the local store
//! - Encode writes, submit them to consensus, and wait for the apply result
//! - Produce exactly one reply per command

use std::sync::Arc;
use std::time::Duration;

use crate::consensus::{decode_outcome, Consensus, LogEntry};
use crate::error::{QuorumError, Result};
use crate::metadata::MetadataStore;
use crate::protocol::{validate, Command, Reply, Request};
use crate::router::LeadershipRouter;
use crate::storage::Store;

/// Stateless request dispatcher
///
/// ## Concurrency Model
/// Holds only shared handles. Each call works on its own locals, so any
/// number of connection threads may dispatch at once; ordering of writes is
/// left entirely to the consensus engine. Reads are leader-only: this trades
/// read throughput for never serving a follower's stale view.
pub struct Dispatcher {
    /// Orders and applies writes
    consensus: Arc<dyn Consensus>,

    /// Serves reads
    store: Arc<dyn Store>,

    /// Leadership checks and leader address lookups
    router: LeadershipRouter,

    /// How long a write waits for commit+apply
    apply_timeout: Duration,
}

impl Dispatcher {
    pub fn new(
        consensus: Arc<dyn Consensus>,
        store: Arc<dyn Store>,
        metadata: Arc<dyn MetadataStore>,
        apply_timeout: Duration,
    ) -> Self {
        let router = LeadershipRouter::new(Arc::clone(&consensus), metadata);
        Self {
            consensus,
            store,
            router,
            apply_timeout,
        }
    }

    /// Validate and execute a raw command
    pub fn handle(&self, command: Command) -> Reply {
        match validate(command) {
            Ok(request) => self.dispatch(request),
            Err(e) => Reply::from(e),
        }
    }

    /// Execute a validated request
    pub fn dispatch(&self, request: Request) -> Reply {
        if !self.router.is_leader() {
            return self.redirect();
        }

        match request {
            Request::Get { key } => self.get(&key),
            Request::Set { key, value } => self.set(key, value),
            Request::Del { key } => self.del(key),
        }
    }

    /// The router this dispatcher consults
    pub fn router(&self) -> &LeadershipRouter {
        &self.router
    }

    pub fn apply_timeout(&self) -> Duration {
        self.apply_timeout
    }

    fn redirect(&self) -> Reply {
        match self.router.resolve_leader_address() {
            Ok(addr) => Reply::moved(&addr),
            Err(e) => {
                tracing::debug!("Cannot redirect client: {}", e);
                Reply::from(e)
            }
        }
    }

    fn get(&self, key: &[u8]) -> Reply {
        match self.store.get(key) {
            Ok(value) => Reply::Bulk(value),
            Err(QuorumError::KeyNotFound) => Reply::Null,
            Err(e) => Reply::from(e),
        }
    }

    fn set(&self, key: Vec<u8>, value: Vec<u8>) -> Reply {
        match self.submit(LogEntry::put(key, value)) {
            Ok(_) => Reply::ok(),
            Err(e) => self.write_failed("SET", e),
        }
    }

    fn del(&self, key: Vec<u8>) -> Reply {
        match self.submit(LogEntry::delete(key)) {
            Ok(_) => Reply::Integer(1),
            Err(e) => self.write_failed("DEL", e),
        }
    }

    /// Submit an entry and unwrap the state machine's verdict
    fn submit(&self, entry: LogEntry) -> Result<Option<Vec<u8>>> {
        let data = entry.encode()?;
        let raw = self.consensus.submit(data, self.apply_timeout).wait()?;
        decode_outcome(&raw)
    }

    fn write_failed(&self, command: &str, err: QuorumError) -> Reply {
        if err.is_ambiguous() {
            tracing::warn!("{} outcome unknown: {}", command, err);
        } else if !matches!(err, QuorumError::KeyNotFound) {
            tracing::debug!("{} failed: {}", command, err);
        }
        Reply::from(err)
    }
}
