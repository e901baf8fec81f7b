//! UDP broadcast discovery of the hub.
//!
//! # How hub discovery works (for beginners)
//!
//! The hub listens for UDP datagrams on port 9720 and answers any datagram it
//! receives, whatever the payload.  Discovery therefore needs no message
//! format at all:
//!
//! 1. Bind an ephemeral UDP socket and enable `SO_BROADCAST`.
//! 2. Send a single zero byte to the LAN broadcast address
//!    (`255.255.255.255:9720`).  Every device on the LAN receives it.
//! 3. Wait for the first reply.  The reply's *source address* is the hub;
//!    its payload is ignored.
//!
//! # Read timeout
//!
//! The socket is configured with a read timeout (1 second by default).  If no
//! reply arrives in that window, discovery fails with
//! [`DiscoveryError::Timeout`].  There is no retry; run discovery again or
//! configure the hub address by hand.

use std::net::{IpAddr, Ipv4Addr, SocketAddr, UdpSocket};
use std::time::Duration;

use qsync_core::protocol::messages::DEFAULT_DISCOVERY_PORT;
use thiserror::Error;
use tracing::{debug, info};

use super::is_timeout_error;

/// The payload of the discovery probe.
const DISCOVERY_PROBE: [u8; 1] = [0x00];

/// Default time to wait for the hub's reply.
pub const DEFAULT_DISCOVERY_TIMEOUT: Duration = Duration::from_secs(1);

/// Error type for hub discovery.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// No reply arrived within the timeout.
    #[error("no hub answered within {0:?}")]
    Timeout(Duration),
    /// The UDP socket could not be bound or configured.
    #[error("failed to set up discovery socket: {0}")]
    Bind(#[source] std::io::Error),
    /// The broadcast datagram could not be sent.
    #[error("failed to send discovery broadcast to {addr}: {source}")]
    Send {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },
    /// An I/O error other than a timeout occurred while waiting for a reply.
    #[error("recv error: {0}")]
    Recv(#[source] std::io::Error),
}

/// Where to send the probe and how long to wait for a reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiscoverySettings {
    pub broadcast_addr: SocketAddr,
    pub timeout: Duration,
}

impl Default for DiscoverySettings {
    fn default() -> Self {
        Self {
            broadcast_addr: SocketAddr::new(
                IpAddr::V4(Ipv4Addr::BROADCAST),
                DEFAULT_DISCOVERY_PORT,
            ),
            timeout: DEFAULT_DISCOVERY_TIMEOUT,
        }
    }
}

/// Broadcasts one probe and returns the address of the first responder.
///
/// The returned port is the responder's UDP source port, not the hub's TCP
/// port; callers connect to `returned.ip()` on the configured hub port.
///
/// # Errors
///
/// See [`DiscoveryError`].  A timeout is reported as
/// [`DiscoveryError::Timeout`], never as [`DiscoveryError::Recv`].
pub fn discover_hub(settings: &DiscoverySettings) -> Result<SocketAddr, DiscoveryError> {
    let socket = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, 0)).map_err(DiscoveryError::Bind)?;
    socket.set_broadcast(true).map_err(DiscoveryError::Bind)?;
    socket
        .set_read_timeout(Some(settings.timeout))
        .map_err(DiscoveryError::Bind)?;

    socket
        .send_to(&DISCOVERY_PROBE, settings.broadcast_addr)
        .map_err(|source| DiscoveryError::Send {
            addr: settings.broadcast_addr,
            source,
        })?;
    debug!("discovery probe sent to {}", settings.broadcast_addr);

    let mut buf = [0u8; 1024];
    match socket.recv_from(&mut buf) {
        Ok((len, responder)) => {
            info!("hub found at {responder} ({len}-byte reply)");
            Ok(responder)
        }
        Err(e) if is_timeout_error(&e) => Err(DiscoveryError::Timeout(settings.timeout)),
        Err(e) => Err(DiscoveryError::Recv(e)),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_default_settings_target_broadcast_port_9720() {
        // Arrange / Act
        let settings = DiscoverySettings::default();

        // Assert
        assert_eq!(
            settings.broadcast_addr,
            "255.255.255.255:9720".parse::<SocketAddr>().unwrap()
        );
        assert_eq!(settings.timeout, Duration::from_secs(1));
    }

    #[test]
    fn test_discover_hub_returns_responder_address() {
        // Arrange: a loopback responder standing in for the hub
        let responder = UdpSocket::bind("127.0.0.1:0").expect("bind responder");
        let responder_addr = responder.local_addr().unwrap();
        let handle = thread::spawn(move || {
            let mut buf = [0u8; 16];
            let (len, from) = responder.recv_from(&mut buf).unwrap();
            responder.send_to(b"QSYNC", from).unwrap();
            buf[..len].to_vec()
        });
        let settings = DiscoverySettings {
            broadcast_addr: responder_addr,
            timeout: Duration::from_secs(2),
        };

        // Act
        let found = discover_hub(&settings).unwrap();

        // Assert
        assert_eq!(found, responder_addr);
        assert_eq!(handle.join().unwrap(), vec![0x00]);
    }

    #[test]
    fn test_discover_hub_times_out_when_nobody_answers() {
        // Arrange: a bound socket that never replies
        let silent = UdpSocket::bind("127.0.0.1:0").expect("bind silent peer");
        let settings = DiscoverySettings {
            broadcast_addr: silent.local_addr().unwrap(),
            timeout: Duration::from_millis(100),
        };

        // Act
        let result = discover_hub(&settings);

        // Assert
        assert!(matches!(result, Err(DiscoveryError::Timeout(t)) if t == Duration::from_millis(100)));
    }
}
