//! Error type shared by the hub use cases.

use qsync_core::{EncodingError, ProtocolError};
use thiserror::Error;

use super::transport::TransportError;

/// Everything that can go wrong while talking to the hub.
///
/// Each variant is a distinct failure kind so the CLI can report it without
/// inspecting message strings.
#[derive(Debug, Error)]
pub enum HubError {
    /// The hub sent a malformed or unexpected frame.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// A command could not be encoded.
    #[error("encoding error: {0}")]
    Encoding(#[from] EncodingError),

    /// The socket layer failed.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// A referenced group, scene, or group address is absent from the catalog.
    #[error(transparent)]
    NotFound(#[from] NotFound),

    /// The position is not one of the nine supported levels.
    #[error("invalid position value: {0} (expected 0, 12.5, 25, ... 100)")]
    InvalidPosition(f64),

    /// Caller-supplied input was rejected before any I/O.
    #[error("invalid input: {0}")]
    Validation(#[from] ValidationError),
}

/// Which lookup failed.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum NotFound {
    #[error("group not found: {0:?}")]
    Group(String),

    #[error("scene not found: {0:?}")]
    Scene(String),

    #[error("scene {scene:?} references unknown group address 0x{address:04x}")]
    GroupAddress { scene: String, address: u16 },
}

/// Rejections of ad-hoc multi-group input.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("empty argument list")]
    Empty,

    #[error("expected NAME POSITION pairs, got {0} arguments")]
    OddArgumentCount(usize),

    #[error("duplicate group name: {0:?}")]
    DuplicateGroup(String),

    #[error("group name must not be empty")]
    EmptyGroupName,

    #[error("position {0:?} is not a number")]
    UnparsablePosition(String),
}
