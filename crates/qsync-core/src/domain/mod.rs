//! Domain types with no I/O: the hub's catalog and blind position codes.

pub mod catalog;
pub mod position;

pub use catalog::{Group, HubCatalog, Scene, SceneSetting};
pub use position::{code_to_position, position_to_code, INVALID_POSITION_CODE};
