//! Network Module
//!
//! TCP server and client handling.
//!
//! ## Architecture
//! - Single acceptor thread blocked in `accept`, woken at shutdown
//! - One thread per client connection
//! - Commands within a connection are handled in order; connections are
//!   independent of each other
//! - Commands routed through the Dispatcher

mod server;
mod connection;

pub use server::{Server, ServerHandle, ShutdownHandle};
pub use connection::Connection;
