//! Protocol module containing frame types and the binary codec.

pub mod codec;
pub mod messages;

pub use codec::{
    decode_frame, decode_frame_head, decode_record, encode_command, encode_count_header,
    encode_group_record, encode_scene_record, parse_count_header, parse_group_record,
    parse_scene_record, to_hex, CommandInstruction, EncodingError, ProtocolError,
};
pub use messages::*;
