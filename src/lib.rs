//! # QuorumKV
//!
//! A RESP (Redis protocol) front end for a replicated key-value store:
//! - Reads served from the local store, on the leader only
//! - Writes ordered and applied through a consensus log
//! - Followers redirect clients with `MOVED -1 <leader-address>`
//! - Application errors carried back through the log as replies
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      TCP Server                             │
//! │              (one thread per connection)                    │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │ RESP frame → Command
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │            Validator  →  Dispatcher  →  Router              │
//! └──────────┬──────────────────────────────┬───────────────────┘
//!            │ GET                          │ SET / DEL
//!            ▼                              ▼
//!   ┌─────────────────┐            ┌─────────────────┐
//!   │      Store      │◀───apply───│    Consensus    │
//!   │   (MemStore)    │            │   (LocalRaft)   │
//!   └─────────────────┘            └─────────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod protocol;
pub mod consensus;
pub mod storage;
pub mod metadata;
pub mod fsm;
pub mod router;
pub mod dispatch;
pub mod network;
pub mod node;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{QuorumError, Result};
pub use config::Config;
pub use dispatch::Dispatcher;
pub use node::Node;

// =============================================================================
// Version Info
// =============================================================================

/// Current version of QuorumKV
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
