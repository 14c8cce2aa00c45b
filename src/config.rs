//! Configuration for QuorumKV
//!
//! Centralized configuration with sensible defaults.

use std::time::Duration;

use crate::consensus::NodeId;
use crate::error::{QuorumError, Result};

/// Main configuration for a QuorumKV node
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Node Identity
    // -------------------------------------------------------------------------
    /// Identifier of this node inside the consensus group
    pub node_id: NodeId,

    /// Peer-to-peer address reported in leader pointers
    pub raft_addr: String,

    /// Client address other nodes hand out in redirects
    /// (defaults to the bound listen address)
    pub advertise_addr: Option<String>,

    // -------------------------------------------------------------------------
    // Write Path Configuration
    // -------------------------------------------------------------------------
    /// How long a write waits for commit+apply (milliseconds)
    pub apply_timeout_ms: u64,

    // -------------------------------------------------------------------------
    // Network Configuration
    // -------------------------------------------------------------------------
    /// TCP listen address for RESP clients
    pub listen_addr: String,

    /// Max concurrent client connections
    pub max_connections: usize,

    /// Connection read timeout (milliseconds, 0 disables)
    pub read_timeout_ms: u64,

    /// Connection write timeout (milliseconds, 0 disables)
    pub write_timeout_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            node_id: NodeId::from("node-1"),
            raft_addr: "127.0.0.1:7379".to_string(),
            advertise_addr: None,
            apply_timeout_ms: 1000,
            listen_addr: "127.0.0.1:6379".to_string(),
            max_connections: 1024,
            read_timeout_ms: 0,
            write_timeout_ms: 5000,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Apply timeout as a `Duration`
    pub fn apply_timeout(&self) -> Duration {
        Duration::from_millis(self.apply_timeout_ms)
    }

    /// Reject settings the server cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.apply_timeout_ms == 0 {
            return Err(QuorumError::Config(
                "apply_timeout_ms must be greater than zero".to_string(),
            ));
        }
        if self.max_connections == 0 {
            return Err(QuorumError::Config(
                "max_connections must be greater than zero".to_string(),
            ));
        }
        if self.node_id.as_str().is_empty() {
            return Err(QuorumError::Config("node_id must not be empty".to_string()));
        }
        Ok(())
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the node identifier
    pub fn node_id(mut self, id: impl Into<NodeId>) -> Self {
        self.config.node_id = id.into();
        self
    }

    /// Set the peer-to-peer address
    pub fn raft_addr(mut self, addr: impl Into<String>) -> Self {
        self.config.raft_addr = addr.into();
        self
    }

    /// Set the client address advertised to other nodes
    pub fn advertise_addr(mut self, addr: impl Into<String>) -> Self {
        self.config.advertise_addr = Some(addr.into());
        self
    }

    /// Set how long writes wait for commit+apply (in milliseconds)
    pub fn apply_timeout_ms(mut self, ms: u64) -> Self {
        self.config.apply_timeout_ms = ms;
        self
    }

    /// Set the TCP listen address
    pub fn listen_addr(mut self, addr: impl Into<String>) -> Self {
        self.config.listen_addr = addr.into();
        self
    }

    /// Set the maximum number of concurrent connections
    pub fn max_connections(mut self, count: usize) -> Self {
        self.config.max_connections = count;
        self
    }

    /// Set the read timeout (in milliseconds)
    pub fn read_timeout_ms(mut self, ms: u64) -> Self {
        self.config.read_timeout_ms = ms;
        self
    }

    /// Set the write timeout (in milliseconds)
    pub fn write_timeout_ms(mut self, ms: u64) -> Self {
        self.config.write_timeout_ms = ms;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
