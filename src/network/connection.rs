//! Connection Handler
//!
//! Handles individual client connections.

use std::io::{BufReader, BufWriter, Write};
use std::net::TcpStream;
use std::sync::Arc;
use std::time::Duration;

use crate::dispatch::Dispatcher;
use crate::error::{QuorumError, Result};
use crate::protocol::{read_command, write_reply, Reply};

/// Handles a single client connection
pub struct Connection {
    /// TCP stream reader (buffered, so pipelined commands are framed in order)
    reader: BufReader<TcpStream>,

    /// TCP stream writer (buffered for efficiency)
    writer: BufWriter<TcpStream>,

    /// Shared request dispatcher
    dispatcher: Arc<Dispatcher>,

    /// Peer address for logging
    peer_addr: String,
}

impl Connection {
    /// Create a new connection handler
    ///
    /// Sets up buffered I/O
    pub fn new(stream: TcpStream, dispatcher: Arc<Dispatcher>) -> Result<Self> {
        let peer_addr = stream
            .peer_addr()
            .map(|a| a.to_string())
            .unwrap_or_else(|_| "unknown".to_string());

        // Disable Nagle's algorithm for low latency
        stream.set_nodelay(true)?;

        let read_stream = stream.try_clone()?;
        let write_stream = stream;

        Ok(Self {
            reader: BufReader::new(read_stream),
            writer: BufWriter::new(write_stream),
            dispatcher,
            peer_addr,
        })
    }

    /// Configure connection timeouts (0 leaves a direction unbounded)
    pub fn set_timeouts(&mut self, read_ms: u64, write_ms: u64) -> Result<()> {
        let read_stream = self.reader.get_ref();
        let write_stream = self.writer.get_ref();

        if read_ms > 0 {
            read_stream.set_read_timeout(Some(Duration::from_millis(read_ms)))?;
        }
        if write_ms > 0 {
            write_stream.set_write_timeout(Some(Duration::from_millis(write_ms)))?;
        }

        Ok(())
    }

    /// Handle the connection (blocking until closed)
    ///
    /// Reads commands in a loop and writes one reply per command, in order.
    /// Returns when the client disconnects or an error occurs.
    pub fn handle(&mut self) -> Result<()> {
        tracing::debug!("Connection established from {}", self.peer_addr);

        loop {
            let command = match read_command(&mut self.reader) {
                Ok(cmd) => cmd,
                Err(QuorumError::Io(ref e)) => match e.kind() {
                    std::io::ErrorKind::UnexpectedEof
                    | std::io::ErrorKind::ConnectionReset
                    | std::io::ErrorKind::ConnectionAborted => {
                        tracing::debug!("Client {} disconnected", self.peer_addr);
                        return Ok(());
                    }
                    // Windows reports a read timeout as TimedOut, Unix as WouldBlock
                    std::io::ErrorKind::WouldBlock | std::io::ErrorKind::TimedOut => {
                        tracing::debug!("Read timeout for client {}", self.peer_addr);
                        return Ok(());
                    }
                    _ => {
                        tracing::warn!("Error reading from {}: {}", self.peer_addr, e);
                        return Err(QuorumError::Network(e.to_string()));
                    }
                },
                Err(e) => {
                    // Framing is lost; answer once and hang up
                    tracing::warn!("Error reading from {}: {}", self.peer_addr, e);
                    let _ = self.send_reply(&Reply::from(&e));
                    let _ = self.writer.flush();
                    return Err(e);
                }
            };

            tracing::trace!("Received command from {}: {:?}", self.peer_addr, command.name());

            let reply = self.dispatcher.handle(command);

            if let Err(e) = self.send_reply(&reply) {
                if let QuorumError::Io(ref io_err) = e {
                    match io_err.kind() {
                        std::io::ErrorKind::ConnectionAborted
                        | std::io::ErrorKind::ConnectionReset
                        | std::io::ErrorKind::BrokenPipe => {
                            tracing::debug!(
                                "Client {} disconnected before reply could be sent: {}",
                                self.peer_addr, e
                            );
                            return Ok(());
                        }
                        _ => {}
                    }
                }
                tracing::warn!("Error writing to {}: {}", self.peer_addr, e);
                return Err(e);
            }
        }
    }

    /// Buffer a reply; flush once no pipelined command is waiting
    fn send_reply(&mut self, reply: &Reply) -> Result<()> {
        write_reply(&mut self.writer, reply)?;
        if self.reader.buffer().is_empty() {
            self.writer.flush()?;
        }
        Ok(())
    }

    /// Get the peer address string
    pub fn peer_addr(&self) -> &str {
        &self.peer_addr
    }
}
