//! Infrastructure layer for the hub client.
//!
//! Contains OS-facing adapters: TCP and UDP sockets, and file-system storage.
//!
//! **Dependency rule**: this layer may depend on `application` and
//! `qsync_core`; application code reaches it only through the transport
//! traits it implements.

pub mod network;
pub mod storage;
