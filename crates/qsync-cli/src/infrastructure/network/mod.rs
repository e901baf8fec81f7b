//! Network infrastructure for the hub client.
//!
//! # Sub-modules
//!
//! - **`tcp`** – Blocking `TcpStream` implementation of the application
//!   layer's [`HubConnector`](crate::application::transport::HubConnector).
//!   One connection per use-case call; dropping the transport shuts it down.
//!
//! - **`discovery`** – One-shot UDP broadcast that finds the hub on the local
//!   network.  The hub answers any datagram on its discovery port, and the
//!   reply's source address is the hub's address.
//!
//! - **`mock`** – In-memory scripted hub used by unit and integration tests.

pub mod discovery;
pub mod mock;
pub mod tcp;

pub use discovery::{discover_hub, DiscoveryError, DiscoverySettings};
pub use tcp::{TcpConnector, TcpTransport};

/// Returns `true` for OS timeout / would-block errors.
///
/// Which of the two kinds a socket reports for an elapsed read timeout is
/// platform dependent, so both are treated the same.
pub(crate) fn is_timeout_error(e: &std::io::Error) -> bool {
    matches!(
        e.kind(),
        std::io::ErrorKind::WouldBlock | std::io::ErrorKind::TimedOut
    )
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_timeout_error_recognises_timed_out() {
        // Arrange
        let e = std::io::Error::new(std::io::ErrorKind::TimedOut, "timed out");

        // Act / Assert
        assert!(is_timeout_error(&e));
    }

    #[test]
    fn test_is_timeout_error_recognises_would_block() {
        // Arrange
        let e = std::io::Error::new(std::io::ErrorKind::WouldBlock, "would block");

        // Act / Assert
        assert!(is_timeout_error(&e));
    }

    #[test]
    fn test_is_timeout_error_returns_false_for_other_errors() {
        // Arrange
        let e = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");

        // Act / Assert
        assert!(!is_timeout_error(&e));
    }
}
