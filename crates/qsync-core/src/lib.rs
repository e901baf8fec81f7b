//! # qsync-core
//!
//! Wire codec and domain types for the QSync motorized-blind hub.
//!
//! The hub speaks a small proprietary binary protocol over TCP.  A client
//! connects, asks for the catalog (every blind group and scene the hub
//! knows), then sends a position command naming the groups to move.
//!
//! This crate has no sockets and no file access.  It defines:
//!
//! - **`protocol`** – Frames (`[flag][length][body]`), the count header,
//!   the fixed-layout group and scene records, and the command encoder.
//!
//! - **`domain`** – The [`HubCatalog`] built from one catalog dump, and the
//!   table mapping blind openness percentages to position codes.
//!
//! Session sequencing, transports, and discovery live in `qsync-cli`.

pub mod domain;
pub mod protocol;

pub use domain::catalog::{Group, HubCatalog, Scene, SceneSetting};
pub use domain::position::{position_to_code, INVALID_POSITION_CODE};
pub use protocol::codec::{
    decode_frame, encode_command, CommandInstruction, EncodingError, ProtocolError,
};
pub use protocol::messages::{Frame, FrameFlag, HubRecord};
