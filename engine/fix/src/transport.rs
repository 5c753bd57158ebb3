//! Pluggable FIX transports
//!
//! The session depends only on [`FixTransport`]; the concrete transport is
//! injected at construction. [`SimulatedTransport`] never leaves the
//! process and lets the session synthesize immediate fills for the
//! downstream pipeline; [`WireTransport`] speaks TCP to a real
//! counterparty.

use crate::error::{SessionError, SessionResult};
use engine_common::FixConfig;
use parking_lot::Mutex;
use std::io::{ErrorKind, Read, Write};
use std::net::{Shutdown, TcpStream};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Transport abstraction the session writes to and reads from
pub trait FixTransport: Send {
    /// Establish the connection to the counterparty
    fn connect(&mut self, config: &FixConfig) -> SessionResult<()>;

    /// Send one encoded FIX message
    fn send(&mut self, message: &[u8]) -> SessionResult<()>;

    /// Receive one complete inbound message, waiting at most `timeout`.
    /// Returns `Ok(None)` when nothing arrived in time.
    fn recv_timeout(&mut self, timeout: Duration) -> SessionResult<Option<Vec<u8>>>;

    /// Tear the connection down; safe to call repeatedly
    fn close(&mut self);

    /// Whether the session should synthesize fills locally instead of
    /// waiting for counterparty execution reports
    fn simulates_fills(&self) -> bool {
        false
    }
}

/// In-process transport for development and tests.
///
/// Outbound messages are recorded and logged; there is no inbound traffic.
#[derive(Debug, Default)]
pub struct SimulatedTransport {
    outbox: Arc<Mutex<Vec<Vec<u8>>>>,
    connected: bool,
}

impl SimulatedTransport {
    /// Create a new simulated transport
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle onto the recorded outbound messages; clone before handing
    /// the transport to a session
    #[must_use]
    pub fn outbox(&self) -> Arc<Mutex<Vec<Vec<u8>>>> {
        Arc::clone(&self.outbox)
    }
}

impl FixTransport for SimulatedTransport {
    fn connect(&mut self, config: &FixConfig) -> SessionResult<()> {
        debug!(
            sender = %config.sender_comp_id,
            target = %config.target_comp_id,
            "simulated transport connected"
        );
        self.connected = true;
        Ok(())
    }

    fn send(&mut self, message: &[u8]) -> SessionResult<()> {
        if !self.connected {
            return Err(SessionError::NotConnected);
        }
        debug!(len = message.len(), "simulated transport send");
        self.outbox.lock().push(message.to_vec());
        Ok(())
    }

    fn recv_timeout(&mut self, timeout: Duration) -> SessionResult<Option<Vec<u8>>> {
        // No inbound traffic; honor the timeout so the session loop
        // does not spin
        std::thread::sleep(timeout);
        Ok(None)
    }

    fn close(&mut self) {
        self.connected = false;
    }

    fn simulates_fills(&self) -> bool {
        true
    }
}

/// TCP transport speaking FIX to a live counterparty.
///
/// Inbound bytes are reassembled into complete messages on the checksum
/// trailer; a torn read never produces a partial message.
#[derive(Debug, Default)]
pub struct WireTransport {
    stream: Option<TcpStream>,
    rx_buf: Vec<u8>,
}

impl WireTransport {
    /// Create an unconnected wire transport
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // Extract the first complete message ("...10=NNN<SOH>") from rx_buf.
    fn take_message(&mut self) -> Option<Vec<u8>> {
        let buf = &self.rx_buf;
        let mut i = 0;
        while i + 7 <= buf.len() {
            if buf[i..i + 3] == b"10="[..] && (i == 0 || buf[i - 1] == crate::codec::SOH) {
                // Trailer ends at the next SOH
                if let Some(end) = buf[i..].iter().position(|b| *b == crate::codec::SOH) {
                    let msg_end = i + end + 1;
                    let msg = self.rx_buf.drain(..msg_end).collect();
                    return Some(msg);
                }
                return None; // trailer incomplete, wait for more bytes
            }
            i += 1;
        }
        None
    }
}

impl FixTransport for WireTransport {
    fn connect(&mut self, config: &FixConfig) -> SessionResult<()> {
        let addr = format!("{}:{}", config.host, config.port);
        let stream = TcpStream::connect(&addr)?;
        stream.set_nodelay(true)?;
        debug!(%addr, "wire transport connected");
        self.stream = Some(stream);
        self.rx_buf.clear();
        Ok(())
    }

    fn send(&mut self, message: &[u8]) -> SessionResult<()> {
        let stream = self.stream.as_mut().ok_or(SessionError::NotConnected)?;
        stream.write_all(message)?;
        Ok(())
    }

    fn recv_timeout(&mut self, timeout: Duration) -> SessionResult<Option<Vec<u8>>> {
        if let Some(msg) = self.take_message() {
            return Ok(Some(msg));
        }

        let stream = self.stream.as_mut().ok_or(SessionError::NotConnected)?;
        stream.set_read_timeout(Some(timeout))?;

        let mut chunk = [0u8; 4096];
        match stream.read(&mut chunk) {
            Ok(0) => {
                // Peer closed the connection
                Err(SessionError::Protocol {
                    message: "counterparty closed connection".to_string(),
                })
            }
            Ok(n) => {
                self.rx_buf.extend_from_slice(&chunk[..n]);
                Ok(self.take_message())
            }
            Err(e) if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn close(&mut self) {
        if let Some(stream) = self.stream.take() {
            if let Err(e) = stream.shutdown(Shutdown::Both) {
                warn!(error = %e, "wire transport shutdown failed");
            }
        }
        self.rx_buf.clear();
    }
}
