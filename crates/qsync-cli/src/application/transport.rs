//! Transport abstraction between the use cases and the network.
//!
//! The use cases only need two primitives: send these bytes, and read exactly
//! this many bytes.  Frame boundaries are recovered on top of that by
//! [`receive_frame`], which reads the two-byte head first and then the body it
//! announces.
//!
//! # Testability
//!
//! The production implementation wraps a `TcpStream`; tests use
//! `infrastructure::network::mock::ScriptedConnector`, which replays canned
//! hub output from memory.

use std::io;
use std::net::SocketAddr;

use qsync_core::protocol::codec::{decode_frame_head, to_hex};
use qsync_core::protocol::messages::{Frame, FRAME_HEAD_SIZE};
use thiserror::Error;
use tracing::debug;

use super::error::HubError;

/// Error type for the underlying socket layer.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The TCP connection to the hub could not be established.
    #[error("failed to connect to hub at {addr}: {source}")]
    ConnectFailed {
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },
    /// A configured read or write timeout elapsed.
    #[error("timed out waiting for the hub")]
    TimedOut,
    /// The hub closed the connection before the expected bytes arrived.
    #[error("connection closed by hub")]
    Closed,
    /// Any other I/O error on an established connection.
    #[error("connection I/O error: {0}")]
    Io(#[from] io::Error),
}

/// A connected, exclusively owned byte channel to the hub.
///
/// Dropping the transport releases the connection.
pub trait HubTransport {
    /// Writes all of `bytes`.
    fn send(&mut self, bytes: &[u8]) -> Result<(), TransportError>;

    /// Fills `buf` completely, blocking until enough bytes have arrived.
    fn receive_exact(&mut self, buf: &mut [u8]) -> Result<(), TransportError>;
}

/// Opens a fresh [`HubTransport`] for every call.
pub trait HubConnector {
    type Transport: HubTransport;

    fn connect(&self) -> Result<Self::Transport, TransportError>;
}

/// Serializes and sends one frame.
///
/// # Errors
///
/// Returns [`HubError::Transport`] if the write fails.
pub fn send_frame<T: HubTransport + ?Sized>(
    transport: &mut T,
    frame: &Frame,
) -> Result<(), HubError> {
    let bytes = frame.to_bytes();
    debug!("SEND: {}", to_hex(&bytes));
    transport.send(&bytes)?;
    Ok(())
}

/// Reads one complete frame: the two-byte head, then its body.
///
/// # Errors
///
/// Returns [`HubError::Protocol`] for an unknown flag and
/// [`HubError::Transport`] if the connection fails mid-frame.
pub fn receive_frame<T: HubTransport + ?Sized>(transport: &mut T) -> Result<Frame, HubError> {
    let mut head = [0u8; FRAME_HEAD_SIZE];
    transport.receive_exact(&mut head)?;
    let (flag, body_len) = decode_frame_head(&head)?;

    let mut body = vec![0u8; body_len];
    transport.receive_exact(&mut body)?;

    let frame = Frame::new(flag, body)?;
    debug!("RECV: {}", to_hex(&frame.to_bytes()));
    Ok(frame)
}
