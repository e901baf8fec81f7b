//! Blocking TCP transport to the hub.
//!
//! The hub listens on TCP port 9760 and serves one short exchange per
//! connection.  [`TcpConnector`] opens a new stream for every call and
//! [`TcpTransport`] shuts it down when dropped.
//!
//! Read and write timeouts are optional.  With no timeout a silent hub blocks
//! the caller indefinitely.

use std::io::{self, Read, Write};
use std::net::{Shutdown, SocketAddr, TcpStream};
use std::time::Duration;

use tracing::debug;

use super::is_timeout_error;
use crate::application::transport::{HubConnector, HubTransport, TransportError};

/// Opens TCP connections to one hub address.
#[derive(Debug, Clone)]
pub struct TcpConnector {
    addr: SocketAddr,
    io_timeout: Option<Duration>,
}

impl TcpConnector {
    /// `io_timeout` bounds the connect attempt and every read and write.
    pub fn new(addr: SocketAddr, io_timeout: Option<Duration>) -> Self {
        Self { addr, io_timeout }
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }
}

impl HubConnector for TcpConnector {
    type Transport = TcpTransport;

    fn connect(&self) -> Result<TcpTransport, TransportError> {
        let connect_failed = |source: io::Error| TransportError::ConnectFailed {
            addr: self.addr,
            source,
        };

        let stream = match self.io_timeout {
            Some(timeout) => TcpStream::connect_timeout(&self.addr, timeout),
            None => TcpStream::connect(self.addr),
        }
        .map_err(connect_failed)?;

        stream.set_read_timeout(self.io_timeout)?;
        stream.set_write_timeout(self.io_timeout)?;
        stream.set_nodelay(true)?;

        debug!("connected to hub at {}", self.addr);
        Ok(TcpTransport { stream })
    }
}

/// An open connection to the hub.
pub struct TcpTransport {
    stream: TcpStream,
}

impl HubTransport for TcpTransport {
    fn send(&mut self, bytes: &[u8]) -> Result<(), TransportError> {
        self.stream.write_all(bytes).map_err(map_io_error)?;
        self.stream.flush().map_err(map_io_error)
    }

    fn receive_exact(&mut self, buf: &mut [u8]) -> Result<(), TransportError> {
        self.stream.read_exact(buf).map_err(map_io_error)
    }
}

impl Drop for TcpTransport {
    fn drop(&mut self) {
        // The peer may already have closed; nothing to report in that case.
        let _ = self.stream.shutdown(Shutdown::Both);
        debug!("hub connection closed");
    }
}

fn map_io_error(e: io::Error) -> TransportError {
    if is_timeout_error(&e) {
        TransportError::TimedOut
    } else if e.kind() == io::ErrorKind::UnexpectedEof {
        TransportError::Closed
    } else {
        TransportError::Io(e)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
