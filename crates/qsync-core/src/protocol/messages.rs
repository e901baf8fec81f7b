//! QSync protocol frame types and wire constants.
//!
//! Every message on the hub's TCP port is a *frame*:
//!
//! ```text
//! [flag:1][body_length:1][body:body_length]
//! ```
//!
//! The flag tells the direction: `0x16` for messages sent by the hub,
//! `0x1b` for messages sent to the hub.  The hub never tags the record type
//! explicitly; group and scene descriptors are told apart by their body
//! length alone (see [`crate::protocol::codec::decode_record`]).

use crate::domain::catalog::{Group, Scene};
use crate::protocol::codec::EncodingError;

// ── Protocol constants ────────────────────────────────────────────────────────

/// Size of the `[flag][body_length]` prefix in bytes.
pub const FRAME_HEAD_SIZE: usize = 2;

/// Largest body a frame can carry; the length field is a single byte.
pub const MAX_BODY_LEN: usize = u8::MAX as usize;

/// Body length of the count header that opens every catalog dump.
pub const COUNT_HEADER_BODY_LEN: usize = 4;

/// Body length of a group descriptor (0x2c).
pub const GROUP_RECORD_BODY_LEN: usize = 44;

/// Body length of a scene descriptor (0x3b).
pub const SCENE_RECORD_BODY_LEN: usize = 59;

/// Bytes per `[00 00 00][group_code][position_code]` command block.
pub const COMMAND_BLOCK_LEN: usize = 5;

/// Most groups a single command frame can address (255 / 5).
pub const MAX_COMMAND_INSTRUCTIONS: usize = MAX_BODY_LEN / COMMAND_BLOCK_LEN;

/// Most (address, position) triples a scene descriptor can hold.
pub const MAX_SCENE_SETTINGS: usize = 8;

/// Default TCP port the hub listens on.
pub const DEFAULT_HUB_PORT: u16 = 9760;

/// Default UDP port the hub answers discovery broadcasts on.
pub const DEFAULT_DISCOVERY_PORT: u16 = 9720;

// ── Frame flag ────────────────────────────────────────────────────────────────

/// Direction tag carried in the first byte of every frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum FrameFlag {
    /// Sent by the hub (and by the client for the catalog query).
    Inbound = 0x16,
    /// Sent by the client to drive blinds.
    Outbound = 0x1b,
}

impl TryFrom<u8> for FrameFlag {
    type Error = ();

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0x16 => Ok(FrameFlag::Inbound),
            0x1b => Ok(FrameFlag::Outbound),
            _ => Err(()),
        }
    }
}

// ── Frame ─────────────────────────────────────────────────────────────────────

/// One protocol message: flag byte, length byte, body.
///
/// The length byte is not stored; it is always `body.len()`, and the
/// constructor refuses bodies that would not fit in one byte, so a `Frame`
/// can never declare a length different from what it carries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    flag: FrameFlag,
    body: Vec<u8>,
}

impl Frame {
    /// Builds a frame, failing if `body` is longer than [`MAX_BODY_LEN`].
    ///
    /// # Errors
    ///
    /// Returns [`EncodingError::BodyTooLong`] when the body cannot be
    /// described by a single length byte.
    pub fn new(flag: FrameFlag, body: Vec<u8>) -> Result<Self, EncodingError> {
        if body.len() > MAX_BODY_LEN {
            return Err(EncodingError::BodyTooLong { len: body.len() });
        }
        Ok(Self { flag, body })
    }

    /// The empty inbound frame `16 00` that asks the hub for its catalog.
    pub fn catalog_query() -> Self {
        Self {
            flag: FrameFlag::Inbound,
            body: Vec::new(),
        }
    }

    pub fn flag(&self) -> FrameFlag {
        self.flag
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Value of the length byte as it appears on the wire.
    pub fn body_length(&self) -> u8 {
        // Bounded by the constructor.
        self.body.len() as u8
    }

    /// Serializes the frame to its wire form.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use qsync_core::protocol::messages::Frame;
    ///
    /// assert_eq!(Frame::catalog_query().to_bytes(), vec![0x16, 0x00]);
    /// ```
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(FRAME_HEAD_SIZE + self.body.len());
        buf.push(self.flag as u8);
        buf.push(self.body_length());
        buf.extend_from_slice(&self.body);
        buf
    }
}

// ── Decoded payloads ──────────────────────────────────────────────────────────

/// First frame of a catalog dump: how many records follow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CountHeader {
    pub group_count: u16,
    pub scene_count: u16,
}

impl CountHeader {
    /// Total number of record frames the hub will send after the header.
    pub fn record_count(&self) -> usize {
        usize::from(self.group_count) + usize::from(self.scene_count)
    }
}

/// A catalog record, tagged by the (flag, body length) pair it arrived with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HubRecord {
    Group(Group),
    Scene(Scene),
}
