//! Binary codec for QSync hub frames and catalog records.
//!
//! Wire format:
//! ```text
//! [flag:1][body_length:1][body:body_length]
//! ```
//! All multi-byte integers are big-endian.  Fields are read straight from the
//! body at fixed offsets.
//!
//! Record layouts (offsets are into the body):
//! ```text
//! count header (4):  [group_count:2][scene_count:2]
//! group (44):        [?:1][code:1][reserved:20][address:2][name:20]
//! scene (59):        [?:1][8 x (address:2, position:1)][reserved:14][name:20]
//! command (5 x n):   n x [00 00 00][group_code:1][position_code:1]
//! ```

use thiserror::Error;

use crate::domain::catalog::{Group, Scene, SceneSetting};
use crate::protocol::messages::{
    CountHeader, Frame, FrameFlag, HubRecord, COMMAND_BLOCK_LEN, COUNT_HEADER_BODY_LEN,
    FRAME_HEAD_SIZE, GROUP_RECORD_BODY_LEN, MAX_BODY_LEN, MAX_SCENE_SETTINGS,
    SCENE_RECORD_BODY_LEN,
};

/// Errors that can occur while decoding frames received from the hub.
#[derive(Debug, Error, PartialEq)]
pub enum ProtocolError {
    /// The byte slice is shorter than the frame it is supposed to contain.
    #[error("truncated frame: need {needed} bytes, got {available}")]
    Truncated { needed: usize, available: usize },

    /// The first byte is neither 0x16 nor 0x1b.
    #[error("unknown frame flag: 0x{0:02x}")]
    UnknownFlag(u8),

    /// The frame is well formed but travels in the wrong direction.
    #[error("{context}: expected flag 0x{expected:02x}, got 0x{actual:02x}")]
    UnexpectedFlag {
        context: &'static str,
        expected: u8,
        actual: u8,
    },

    /// The body length does not match the fixed size of the expected record.
    #[error("{context}: expected a {expected}-byte body, got {actual}")]
    UnexpectedBodyLength {
        context: &'static str,
        expected: usize,
        actual: usize,
    },

    /// A group or scene name is not valid UTF-8.
    #[error("invalid name: {0}")]
    InvalidName(String),

    /// A catalog record matched neither the group nor the scene layout.
    #[error("unexpected record: flag 0x{flag:02x}, body length {body_length}")]
    UnexpectedRecord { flag: u8, body_length: usize },
}

/// Errors that can occur while building frames to send to the hub.
#[derive(Debug, Error, PartialEq)]
pub enum EncodingError {
    /// The body would not fit in a single length byte.
    #[error("frame body of {len} bytes exceeds the {MAX_BODY_LEN}-byte limit")]
    BodyTooLong { len: usize },

    /// A name does not fit the fixed-width name field of a record.
    #[error("name {name:?} is longer than {max} bytes")]
    NameTooLong { name: String, max: usize },

    /// A scene lists more settings than a scene record can hold.
    #[error("scene has {count} settings, at most {MAX_SCENE_SETTINGS} fit in a record")]
    TooManySettings { count: usize },
}

/// One group to move: the group's code and the target position code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandInstruction {
    pub group_code: u8,
    pub position_code: u8,
}

// ── Record field offsets ──────────────────────────────────────────────────────

const GROUP_CODE_OFFSET: usize = 1;
const GROUP_ADDRESS_OFFSET: usize = 22;
const GROUP_NAME_OFFSET: usize = 24;

const SCENE_SETTINGS_OFFSET: usize = 1;
const SCENE_SETTING_LEN: usize = 3;
const SCENE_NAME_OFFSET: usize = 39;

const NAME_FIELD_LEN: usize = 20;

// ── Frames ────────────────────────────────────────────────────────────────────

/// Decodes the two-byte `[flag][body_length]` prefix of a frame.
///
/// Transports read this first to learn how many body bytes follow.
///
/// # Errors
///
/// Returns [`ProtocolError::Truncated`] for fewer than two bytes and
/// [`ProtocolError::UnknownFlag`] for an unrecognised flag.
pub fn decode_frame_head(head: &[u8]) -> Result<(FrameFlag, usize), ProtocolError> {
    if head.len() < FRAME_HEAD_SIZE {
        return Err(ProtocolError::Truncated {
            needed: FRAME_HEAD_SIZE,
            available: head.len(),
        });
    }
    let flag = FrameFlag::try_from(head[0]).map_err(|_| ProtocolError::UnknownFlag(head[0]))?;
    Ok((flag, usize::from(head[1])))
}

/// Decodes one [`Frame`] from the beginning of `bytes`.
///
/// Returns the frame and the number of bytes consumed, so the caller can
/// advance through a buffer holding several frames.
///
/// # Errors
///
/// Returns [`ProtocolError`] if the flag is unknown or the buffer is shorter
/// than the declared body.
///
/// # Examples
///
/// ```rust
/// use qsync_core::protocol::codec::decode_frame;
/// use qsync_core::protocol::messages::FrameFlag;
///
/// let (frame, consumed) = decode_frame(&[0x16, 0x04, 0x00, 0x0c, 0x00, 0x0d]).unwrap();
/// assert_eq!(frame.flag(), FrameFlag::Inbound);
/// assert_eq!(frame.body(), &[0x00, 0x0c, 0x00, 0x0d]);
/// assert_eq!(consumed, 6);
/// ```
pub fn decode_frame(bytes: &[u8]) -> Result<(Frame, usize), ProtocolError> {
    let (flag, body_len) = decode_frame_head(bytes)?;
    let total = FRAME_HEAD_SIZE + body_len;
    if bytes.len() < total {
        return Err(ProtocolError::Truncated {
            needed: total,
            available: bytes.len(),
        });
    }
    let body = bytes[FRAME_HEAD_SIZE..total].to_vec();
    // body_len came from a single byte, so it always fits.
    let frame = Frame::new(flag, body).map_err(|_| ProtocolError::UnexpectedBodyLength {
        context: "frame",
        expected: MAX_BODY_LEN,
        actual: body_len,
    })?;
    Ok((frame, total))
}

// ── Inbound records ───────────────────────────────────────────────────────────

/// Parses the count header that opens a catalog dump.
///
/// # Errors
///
/// Returns [`ProtocolError`] unless the frame is inbound with a 4-byte body.
pub fn parse_count_header(frame: &Frame) -> Result<CountHeader, ProtocolError> {
    let body = expect_inbound(frame, COUNT_HEADER_BODY_LEN, "count header")?;
    Ok(CountHeader {
        group_count: read_u16(body, 0),
        scene_count: read_u16(body, 2),
    })
}

/// Parses a 44-byte group descriptor.
///
/// # Errors
///
/// Returns [`ProtocolError`] on a wrong flag or length, or a name that is
/// not UTF-8.
///
/// # Examples
///
/// ```rust
/// use qsync_core::protocol::codec::{decode_frame, parse_group_record};
///
/// let mut bytes = vec![0x16, 0x2c, 0x01, 0x0b];
/// bytes.extend_from_slice(&[0u8; 20]);
/// bytes.extend_from_slice(&[0x80, 0x02]);
/// let mut name = [0u8; 20];
/// name[..6].copy_from_slice(b"Office");
/// bytes.extend_from_slice(&name);
/// let (frame, _) = decode_frame(&bytes).unwrap();
///
/// let group = parse_group_record(&frame).unwrap();
/// assert_eq!(group.name, "Office");
/// assert_eq!(group.address, 0x8002);
/// assert_eq!(group.code, 0x0b);
/// ```
pub fn parse_group_record(frame: &Frame) -> Result<Group, ProtocolError> {
    let body = expect_inbound(frame, GROUP_RECORD_BODY_LEN, "group record")?;
    Ok(Group {
        name: decode_name(&body[GROUP_NAME_OFFSET..])?,
        address: read_u16(body, GROUP_ADDRESS_OFFSET),
        code: body[GROUP_CODE_OFFSET],
    })
}

/// Parses a 59-byte scene descriptor.
///
/// Settings are read until the first `00 00 00` triple; anything after it is
/// ignored even if non-zero.
///
/// # Errors
///
/// Returns [`ProtocolError`] on a wrong flag or length, or a name that is
/// not UTF-8.
pub fn parse_scene_record(frame: &Frame) -> Result<Scene, ProtocolError> {
    let body = expect_inbound(frame, SCENE_RECORD_BODY_LEN, "scene record")?;
    let settings_end = SCENE_SETTINGS_OFFSET + MAX_SCENE_SETTINGS * SCENE_SETTING_LEN;
    let settings = body[SCENE_SETTINGS_OFFSET..settings_end]
        .chunks_exact(SCENE_SETTING_LEN)
        .take_while(|triple| triple.iter().any(|b| *b != 0))
        .map(|triple| SceneSetting {
            group_address: u16::from_be_bytes([triple[0], triple[1]]),
            position_code: triple[2],
        })
        .collect();
    Ok(Scene {
        name: decode_name(&body[SCENE_NAME_OFFSET..])?,
        settings,
    })
}

/// Decodes a catalog record, choosing the layout from (flag, body length).
///
/// The hub does not tag records with a type; a 44-byte inbound body is a
/// group and a 59-byte inbound body is a scene.
///
/// # Errors
///
/// Returns [`ProtocolError::UnexpectedRecord`] for any other shape, or the
/// error of the matching record parser.
pub fn decode_record(frame: &Frame) -> Result<HubRecord, ProtocolError> {
    match (frame.flag(), frame.body().len()) {
        (FrameFlag::Inbound, GROUP_RECORD_BODY_LEN) => {
            parse_group_record(frame).map(HubRecord::Group)
        }
        (FrameFlag::Inbound, SCENE_RECORD_BODY_LEN) => {
            parse_scene_record(frame).map(HubRecord::Scene)
        }
        (flag, body_length) => Err(ProtocolError::UnexpectedRecord {
            flag: flag as u8,
            body_length,
        }),
    }
}

// ── Outbound commands ─────────────────────────────────────────────────────────

/// Encodes a position command moving every listed group.
///
/// # Errors
///
/// Returns [`EncodingError::BodyTooLong`] for more than
/// [`crate::protocol::messages::MAX_COMMAND_INSTRUCTIONS`] instructions.
///
/// # Examples
///
/// ```rust
/// use qsync_core::protocol::codec::{encode_command, CommandInstruction};
///
/// let frame = encode_command(&[CommandInstruction { group_code: 0x09, position_code: 0x01 }]).unwrap();
/// assert_eq!(frame.to_bytes(), vec![0x1b, 0x05, 0x00, 0x00, 0x00, 0x09, 0x01]);
/// ```
pub fn encode_command(instructions: &[CommandInstruction]) -> Result<Frame, EncodingError> {
    let mut body = Vec::with_capacity(instructions.len() * COMMAND_BLOCK_LEN);
    for instruction in instructions {
        body.extend_from_slice(&[0x00, 0x00, 0x00]);
        body.push(instruction.group_code);
        body.push(instruction.position_code);
    }
    Frame::new(FrameFlag::Outbound, body)
}

// ── Hub-side encoders ─────────────────────────────────────────────────────────
//
// The client never sends these; they exist so simulators and tests can
// produce exactly what a hub would put on the wire.

/// Encodes the count header announcing `group_count` + `scene_count` records.
pub fn encode_count_header(group_count: u16, scene_count: u16) -> Frame {
    let mut body = Vec::with_capacity(COUNT_HEADER_BODY_LEN);
    body.extend_from_slice(&group_count.to_be_bytes());
    body.extend_from_slice(&scene_count.to_be_bytes());
    Frame::new(FrameFlag::Inbound, body).expect("count header fits one length byte")
}

/// Encodes a group descriptor.  Reserved bytes are zero.
///
/// # Errors
///
/// Returns [`EncodingError::NameTooLong`] if the UTF-8 name exceeds 20 bytes.
pub fn encode_group_record(group: &Group) -> Result<Frame, EncodingError> {
    let mut body = vec![0u8; GROUP_RECORD_BODY_LEN];
    body[GROUP_CODE_OFFSET] = group.code;
    body[GROUP_ADDRESS_OFFSET..GROUP_ADDRESS_OFFSET + 2]
        .copy_from_slice(&group.address.to_be_bytes());
    write_name(&mut body[GROUP_NAME_OFFSET..], &group.name)?;
    Frame::new(FrameFlag::Inbound, body)
}

/// Encodes a scene descriptor.  Unused setting slots and reserved bytes are zero.
///
/// # Errors
///
/// Returns [`EncodingError::TooManySettings`] for more than eight settings and
/// [`EncodingError::NameTooLong`] if the UTF-8 name exceeds 20 bytes.
pub fn encode_scene_record(scene: &Scene) -> Result<Frame, EncodingError> {
    if scene.settings.len() > MAX_SCENE_SETTINGS {
        return Err(EncodingError::TooManySettings {
            count: scene.settings.len(),
        });
    }
    let mut body = vec![0u8; SCENE_RECORD_BODY_LEN];
    for (i, setting) in scene.settings.iter().enumerate() {
        let off = SCENE_SETTINGS_OFFSET + i * SCENE_SETTING_LEN;
        body[off..off + 2].copy_from_slice(&setting.group_address.to_be_bytes());
        body[off + 2] = setting.position_code;
    }
    write_name(&mut body[SCENE_NAME_OFFSET..], &scene.name)?;
    Frame::new(FrameFlag::Inbound, body)
}

/// Formats bytes as contiguous lowercase hex, the way the hub's traffic is
/// usually written down.  Used for debug logs.
pub fn to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

// ── Utility helpers ───────────────────────────────────────────────────────────

fn expect_inbound<'a>(
    frame: &'a Frame,
    body_len: usize,
    context: &'static str,
) -> Result<&'a [u8], ProtocolError> {
    if frame.flag() != FrameFlag::Inbound {
        return Err(ProtocolError::UnexpectedFlag {
            context,
            expected: FrameFlag::Inbound as u8,
            actual: frame.flag() as u8,
        });
    }
    let body = frame.body();
    if body.len() != body_len {
        return Err(ProtocolError::UnexpectedBodyLength {
            context,
            expected: body_len,
            actual: body.len(),
        });
    }
    Ok(body)
}

/// Callers guarantee `offset + 2 <= buf.len()` via [`expect_inbound`].
fn read_u16(buf: &[u8], offset: usize) -> u16 {
    u16::from_be_bytes([buf[offset], buf[offset + 1]])
}

/// Decodes a NUL-padded name field.
fn decode_name(field: &[u8]) -> Result<String, ProtocolError> {
    let end = field
        .iter()
        .rposition(|b| *b != 0)
        .map_or(0, |last| last + 1);
    std::str::from_utf8(&field[..end])
        .map(str::to_string)
        .map_err(|e| ProtocolError::InvalidName(e.to_string()))
}

/// Copies `name` into a zeroed fixed-width field.
fn write_name(field: &mut [u8], name: &str) -> Result<(), EncodingError> {
    let bytes = name.as_bytes();
    if bytes.len() > NAME_FIELD_LEN {
        return Err(EncodingError::NameTooLong {
            name: name.to_string(),
            max: NAME_FIELD_LEN,
        });
    }
    field[..bytes.len()].copy_from_slice(bytes);
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
