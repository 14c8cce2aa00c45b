//! QuorumKV Server Binary
//!
//! Starts a single-node QuorumKV cluster speaking RESP.

use clap::Parser;
use quorumkv::{Config, Node};
use tracing_subscriber::{fmt, EnvFilter};

/// QuorumKV Server
#[derive(Parser, Debug)]
#[command(name = "quorumkv-server")]
#[command(about = "RESP front end for a Raft-replicated key-value store")]
#[command(version)]
struct Args {
    /// Node identifier inside the consensus group
    #[arg(short, long, default_value = "node-1")]
    node_id: String,

    /// Listen address for RESP clients (host:port)
    #[arg(short, long, default_value = "127.0.0.1:6379")]
    listen: String,

    /// Peer-to-peer address reported in leader pointers
    #[arg(short, long, default_value = "127.0.0.1:7379")]
    raft_addr: String,

    /// Client address to advertise (defaults to the bound address)
    #[arg(long)]
    advertise: Option<String>,

    /// How long a write waits for commit+apply, in milliseconds
    #[arg(short, long, default_value = "1000")]
    apply_timeout_ms: u64,

    /// Maximum concurrent connections
    #[arg(short, long, default_value = "1024")]
    max_connections: usize,

    /// Idle read timeout in milliseconds (0 disables)
    #[arg(long, default_value = "0")]
    read_timeout_ms: u64,

    /// Write timeout in milliseconds (0 disables)
    #[arg(long, default_value = "5000")]
    write_timeout_ms: u64,
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,quorumkv=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .init();

    let args = Args::parse();

    tracing::info!("QuorumKV Server v{}", quorumkv::VERSION);
    tracing::info!("Node id: {}", args.node_id);
    tracing::info!("Listen address: {}", args.listen);

    let mut builder = Config::builder()
        .node_id(args.node_id.as_str())
        .listen_addr(&args.listen)
        .raft_addr(&args.raft_addr)
        .apply_timeout_ms(args.apply_timeout_ms)
        .max_connections(args.max_connections)
        .read_timeout_ms(args.read_timeout_ms)
        .write_timeout_ms(args.write_timeout_ms);
    if let Some(addr) = &args.advertise {
        builder = builder.advertise_addr(addr);
    }
    let config = builder.build();

    let node = match Node::open(config) {
        Ok(n) => n,
        Err(e) => {
            tracing::error!("Failed to open node: {}", e);
            std::process::exit(1);
        }
    };

    // No election in a single-node group: take leadership directly
    node.raft().become_leader();

    let handle = match node.serve() {
        Ok(h) => h,
        Err(e) => {
            tracing::error!("Failed to start server: {}", e);
            std::process::exit(1);
        }
    };

    tracing::info!("Serving on {}", handle.local_addr());

    if let Err(e) = handle.join() {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }

    node.raft().shutdown();
    tracing::info!("Server stopped");
}
