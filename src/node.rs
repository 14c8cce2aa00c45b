//! Node Module
//!
//! Wires one QuorumKV node together.
//!
//! ## Startup
//! 1. Create the store and the state machine over it
//! 2. Start the consensus engine (follower, no leader)
//! 3. Build the dispatcher over consensus, store and metadata
//! 4. `serve` binds the RESP listener and advertises its address

use std::sync::Arc;

use crate::config::Config;
use crate::consensus::{LeaderInfo, LocalRaft};
use crate::dispatch::Dispatcher;
use crate::error::Result;
use crate::fsm::KvStateMachine;
use crate::metadata::{MemMetadata, MetadataStore};
use crate::network::{Server, ServerHandle};
use crate::storage::MemStore;

/// One node: consensus engine, store, metadata and dispatcher
pub struct Node {
    config: Config,
    raft: Arc<LocalRaft>,
    store: Arc<MemStore>,
    metadata: Arc<MemMetadata>,
    dispatcher: Arc<Dispatcher>,
}

impl Node {
    /// Open a node with its own metadata store
    pub fn open(config: Config) -> Result<Self> {
        Self::open_with_metadata(config, Arc::new(MemMetadata::new()))
    }

    /// Open a node over a metadata store shared with other nodes
    pub fn open_with_metadata(config: Config, metadata: Arc<MemMetadata>) -> Result<Self> {
        config.validate()?;

        let store = Arc::new(MemStore::new());
        let fsm = Arc::new(KvStateMachine::new(store.clone()));
        let raft = Arc::new(LocalRaft::new(
            config.node_id.clone(),
            config.raft_addr.clone(),
            fsm,
        )?);

        let dispatcher = Arc::new(Dispatcher::new(
            raft.clone(),
            store.clone(),
            metadata.clone(),
            config.apply_timeout(),
        ));

        Ok(Self {
            config,
            raft,
            store,
            metadata,
            dispatcher,
        })
    }

    /// Bind the RESP listener, advertise it, and serve in the background
    pub fn serve(&self) -> Result<ServerHandle> {
        let server = Server::bind(self.config.clone(), Arc::clone(&self.dispatcher))?;
        let advertised = self
            .config
            .advertise_addr
            .clone()
            .unwrap_or_else(|| server.local_addr().to_string());

        self.metadata
            .register_client_address(self.config.node_id.clone(), advertised)?;
        server.spawn()
    }

    /// Leader pointer naming this node
    pub fn leader_info(&self) -> LeaderInfo {
        LeaderInfo {
            id: self.config.node_id.clone(),
            addr: self.config.raft_addr.clone(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn raft(&self) -> &Arc<LocalRaft> {
        &self.raft
    }

    pub fn store(&self) -> &Arc<MemStore> {
        &self.store
    }

    pub fn metadata(&self) -> &Arc<MemMetadata> {
        &self.metadata
    }

    pub fn dispatcher(&self) -> &Arc<Dispatcher> {
        &self.dispatcher
    }
}
