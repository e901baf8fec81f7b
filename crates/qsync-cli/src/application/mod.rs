//! Application layer use cases for the hub client.
//!
//! # What is the "application" layer? (for beginners)
//!
//! In Clean Architecture the *application* layer sits between the domain
//! (pure protocol rules in `qsync-core`) and the infrastructure (sockets and
//! files).
//!
//! Use cases in this layer:
//!
//! - **Orchestrate** codec calls to fulfil a user goal (e.g., "move the
//!   kitchen blinds to half open").
//! - **Depend on abstractions** (the [`transport::HubTransport`] and
//!   [`transport::HubConnector`] traits) rather than on `TcpStream`, so tests
//!   can replay a scripted hub from memory.
//! - **Contain no direct socket or file system access**.
//!
//! # Sub-modules
//!
//! - **`transport`**        – The byte-channel traits and frame send/receive
//!   helpers built on them.
//!
//! - **`retrieve_catalog`** – The catalog exchange: query, count header,
//!   then every group and scene record.
//!
//! - **`build_command`**    – Resolves group and scene names against a
//!   catalog and encodes the position command.
//!
//! - **`control_hub`**      – One call per user action; each opens its own
//!   connection and releases it before returning.
//!
//! - **`error`**            – [`error::HubError`] and its sub-kinds.

pub mod build_command;
pub mod control_hub;
pub mod error;
pub mod retrieve_catalog;
pub mod transport;

pub use build_command::GroupTargets;
pub use control_hub::{CommandReceipt, HubController};
pub use error::{HubError, NotFound, ValidationError};
pub use transport::{HubConnector, HubTransport, TransportError};
