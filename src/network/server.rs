//! TCP Server
//!
//! Accepts connections and hands each one to its own thread.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr, TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::config::Config;
use crate::dispatch::Dispatcher;
use crate::error::{QuorumError, Result};
use crate::protocol::{write_reply, Reply};

use super::Connection;

/// Pause after a failed accept so a persistent error cannot spin the loop
const ACCEPT_RETRY_DELAY: Duration = Duration::from_millis(20);

/// Bound on the connection that wakes a blocked accept at shutdown
const WAKE_TIMEOUT: Duration = Duration::from_millis(500);

/// TCP server for QuorumKV
pub struct Server {
    config: Config,
    dispatcher: Arc<Dispatcher>,
    listener: TcpListener,
    local_addr: SocketAddr,
    shutdown: Arc<AtomicBool>,
    active_connections: Arc<AtomicUsize>,
}

impl Server {
    /// Bind the listener described by `config`
    pub fn bind(config: Config, dispatcher: Arc<Dispatcher>) -> Result<Self> {
        config.validate()?;

        let listener = TcpListener::bind(&config.listen_addr)?;
        let local_addr = listener.local_addr()?;

        Ok(Self {
            config,
            dispatcher,
            listener,
            local_addr,
            shutdown: Arc::new(AtomicBool::new(false)),
            active_connections: Arc::new(AtomicUsize::new(0)),
        })
    }

    /// Address the listener is bound to
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Handle that stops the accept loop from another thread
    pub fn shutdown_handle(&self) -> ShutdownHandle {
        ShutdownHandle {
            flag: Arc::clone(&self.shutdown),
            addr: self.local_addr,
        }
    }

    /// Number of connections currently being served
    pub fn active_connections(&self) -> usize {
        self.active_connections.load(Ordering::Acquire)
    }

    /// Accept connections until shutdown (blocking)
    ///
    /// The listener is closed when this returns. Connections already accepted
    /// keep running on their own threads until the client leaves.
    pub fn run(self) -> Result<()> {
        tracing::info!("Listening for RESP clients on {}", self.local_addr);

        loop {
            let accepted = self.listener.accept();

            // `ShutdownHandle::shutdown` connects once to wake this call
            if self.shutdown.load(Ordering::Acquire) {
                break;
            }

            match accepted {
                Ok((stream, peer)) => self.accept(stream, peer),
                Err(ref e) if e.kind() == std::io::ErrorKind::Interrupted => {}
                Err(e) => {
                    // Transport errors never take the listener down
                    tracing::warn!("Accept failed on {}: {}", self.local_addr, e);
                    thread::sleep(ACCEPT_RETRY_DELAY);
                }
            }
        }

        tracing::info!(
            "Stopped accepting on {} ({} connections still open)",
            self.local_addr,
            self.active_connections()
        );
        Ok(())
    }

    /// Run the accept loop on a background thread
    pub fn spawn(self) -> Result<ServerHandle> {
        let local_addr = self.local_addr;
        let shutdown = self.shutdown_handle();
        let thread = thread::Builder::new()
            .name("quorumkv-accept".to_string())
            .spawn(move || self.run())?;

        Ok(ServerHandle {
            local_addr,
            shutdown,
            thread: Some(thread),
        })
    }

    fn accept(&self, mut stream: TcpStream, peer: SocketAddr) {
        let guard = ConnectionGuard::acquire(&self.active_connections);
        if guard.count > self.config.max_connections {
            tracing::warn!("Rejecting {}: connection limit reached", peer);
            let _ = write_reply(&mut stream, &Reply::error("max number of clients reached"));
            return;
        }

        let dispatcher = Arc::clone(&self.dispatcher);
        let read_ms = self.config.read_timeout_ms;
        let write_ms = self.config.write_timeout_ms;

        let spawned = thread::Builder::new()
            .name(format!("quorumkv-conn-{}", peer))
            .spawn(move || {
                let _guard = guard;
                let mut connection = match Connection::new(stream, dispatcher) {
                    Ok(c) => c,
                    Err(e) => {
                        tracing::warn!("Failed to set up connection from {}: {}", peer, e);
                        return;
                    }
                };
                if let Err(e) = connection.set_timeouts(read_ms, write_ms) {
                    tracing::warn!("Failed to set timeouts for {}: {}", peer, e);
                }
                if let Err(e) = connection.handle() {
                    tracing::debug!("Connection {} closed with error: {}", peer, e);
                }
            });

        if let Err(e) = spawned {
            tracing::error!("Failed to spawn handler for {}: {}", peer, e);
        }
    }
}

/// Counts a live connection for as long as it is held
struct ConnectionGuard {
    counter: Arc<AtomicUsize>,
    count: usize,
}

impl ConnectionGuard {
    fn acquire(counter: &Arc<AtomicUsize>) -> Self {
        let count = counter.fetch_add(1, Ordering::AcqRel) + 1;
        Self {
            counter: Arc::clone(counter),
            count,
        }
    }
}

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        self.counter.fetch_sub(1, Ordering::AcqRel);
    }
}

/// Stops a server's accept loop
#[derive(Clone)]
pub struct ShutdownHandle {
    flag: Arc<AtomicBool>,
    addr: SocketAddr,
}

impl ShutdownHandle {
    /// Signal the server to stop accepting new connections
    ///
    /// The accept loop blocks in `accept`, so a throwaway connection is made
    /// to wake it. Only the first call connects.
    pub fn shutdown(&self) {
        if self.flag.swap(true, Ordering::AcqRel) {
            return;
        }

        let target = SocketAddr::new(wake_ip(self.addr.ip()), self.addr.port());
        if let Err(e) = TcpStream::connect_timeout(&target, WAKE_TIMEOUT) {
            tracing::warn!("Failed to wake accept loop on {}: {}", self.addr, e);
        }
    }

    pub fn is_shutdown(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }
}

/// A server running on a background thread
pub struct ServerHandle {
    local_addr: SocketAddr,
    shutdown: ShutdownHandle,
    thread: Option<JoinHandle<Result<()>>>,
}

impl ServerHandle {
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Signal the accept loop to stop (does not wait)
    pub fn shutdown(&self) {
        self.shutdown.shutdown();
    }

    /// Wait for the accept loop to exit; the listener is closed afterwards
    pub fn join(mut self) -> Result<()> {
        self.join_inner()
    }

    /// Signal shutdown and wait for the listener to close
    pub fn stop(self) -> Result<()> {
        self.shutdown();
        self.join()
    }

    fn join_inner(&mut self) -> Result<()> {
        match self.thread.take() {
            Some(thread) => thread
                .join()
                .map_err(|_| QuorumError::Network("accept thread panicked".to_string()))?,
            None => Ok(()),
        }
    }
}

impl Drop for ServerHandle {
    fn drop(&mut self) {
        self.shutdown.shutdown();
        if let Err(e) = self.join_inner() {
            tracing::error!("Server on {} stopped with error: {}", self.local_addr, e);
        }
    }
}

/// A wildcard bind address is reached through loopback
fn wake_ip(ip: IpAddr) -> IpAddr {
    match ip {
        IpAddr::V4(v4) if v4.is_unspecified() => IpAddr::V4(Ipv4Addr::LOCALHOST),
        IpAddr::V6(v6) if v6.is_unspecified() => IpAddr::V6(Ipv6Addr::LOCALHOST),
        other => other,
    }
}
