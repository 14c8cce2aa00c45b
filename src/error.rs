//! Error types for QuorumKV
//!
//! Provides a unified error type for all operations. The `Display` text of
//! each variant is what a client sees after the `ERR ` token, so messages are
//! written for the wire.

use std::time::Duration;

use thiserror::Error;

use crate::consensus::NodeId;

/// Result type alias using QuorumError
pub type Result<T> = std::result::Result<T, QuorumError>;

/// Unified error type for QuorumKV operations
#[derive(Debug, Error)]
pub enum QuorumError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Protocol Errors (never retried, always answered directly)
    // -------------------------------------------------------------------------
    #[error("no command provided")]
    EmptyCommand,

    #[error("unknown command '{0}'")]
    UnknownCommand(String),

    #[error("wrong number of arguments for '{0}' command")]
    ArityMismatch(String),

    /// Malformed RESP framing
    #[error("Protocol error: {0}")]
    Protocol(String),

    // -------------------------------------------------------------------------
    // Routing Errors
    // -------------------------------------------------------------------------
    #[error("leader is unknown")]
    LeaderUnknown,

    #[error("no client address recorded for node '{0}'")]
    AddressNotFound(NodeId),

    #[error("node is not the leader")]
    NotLeader,

    // -------------------------------------------------------------------------
    // Apply Errors
    // -------------------------------------------------------------------------
    /// The wait for the apply result expired. The entry stays in the log and
    /// may still commit, so the caller must not assume it was dropped.
    #[error("apply timed out after {}ms; write outcome is unknown", .0.as_millis())]
    ApplyTimeout(Duration),

    #[error("replication failed: {0}")]
    Replication(String),

    #[error("{0}")]
    Rejected(String),

    // -------------------------------------------------------------------------
    // Storage Errors
    // -------------------------------------------------------------------------
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("key not found")]
    KeyNotFound,

    // -------------------------------------------------------------------------
    // Serialization Errors
    // -------------------------------------------------------------------------
    #[error("Serialization error: {0}")]
    Serialization(String),

    // -------------------------------------------------------------------------
    // Network Errors
    // -------------------------------------------------------------------------
    #[error("Network error: {0}")]
    Network(String),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

impl QuorumError {
    /// Whether the write this error belongs to may or may not have taken effect
    pub fn is_ambiguous(&self) -> bool {
        matches!(self, QuorumError::ApplyTimeout(_))
    }

    /// Whether the error came from malformed or unsupported client input
    pub fn is_protocol(&self) -> bool {
        matches!(
            self,
            QuorumError::EmptyCommand
                | QuorumError::UnknownCommand(_)
                | QuorumError::ArityMismatch(_)
                | QuorumError::Protocol(_)
        )
    }
}

impl From<bincode::Error> for QuorumError {
    fn from(err: bincode::Error) -> Self {
        QuorumError::Serialization(err.to_string())
    }
}
