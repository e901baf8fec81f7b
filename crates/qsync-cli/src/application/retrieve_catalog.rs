//! RetrieveCatalog: reads the hub's groups and scenes over an open transport.
//!
//! The exchange is fixed:
//!
//! 1. Send the two-byte catalog query `16 00`.
//! 2. Read one frame and parse it as the count header.
//! 3. Read exactly `group_count + scene_count` record frames.  The hub may
//!    interleave groups and scenes in any order; each record is dispatched by
//!    its (flag, body length) pair.
//!
//! The first malformed frame aborts the whole read and nothing partial is
//! returned.  The caller owns the transport and releases it by dropping it.

use qsync_core::protocol::codec::{decode_record, parse_count_header};
use qsync_core::{Frame, HubCatalog, HubRecord};
use tracing::{debug, info, warn};

use super::error::HubError;
use super::transport::{receive_frame, send_frame, HubTransport};

/// Runs the catalog exchange on `transport` and returns the resulting catalog.
///
/// # Errors
///
/// - [`HubError::Transport`] if the connection fails or closes early.
/// - [`HubError::Protocol`] if the header or any record is malformed.
pub fn retrieve_catalog<T: HubTransport + ?Sized>(
    transport: &mut T,
) -> Result<HubCatalog, HubError> {
    send_frame(transport, &Frame::catalog_query())?;

    let header = parse_count_header(&receive_frame(transport)?)?;
    debug!(
        groups = header.group_count,
        scenes = header.scene_count,
        "catalog header received"
    );

    let mut catalog = HubCatalog::new();
    for _ in 0..header.record_count() {
        match decode_record(&receive_frame(transport)?)? {
            HubRecord::Group(group) => {
                if let Some(previous) = catalog.insert_group(group) {
                    warn!(name = %previous.name, "duplicate group name, keeping the later record");
                }
            }
            HubRecord::Scene(scene) => {
                if let Some(previous) = catalog.insert_scene(scene) {
                    warn!(name = %previous.name, "duplicate scene name, keeping the later record");
                }
            }
        }
    }

    info!(
        groups = catalog.groups.len(),
        scenes = catalog.scenes.len(),
        "catalog retrieved"
    );
    Ok(catalog)
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::transport::TransportError;
    use crate::infrastructure::network::mock::{HubScript, ScriptedTransport};
    use qsync_core::{Group, ProtocolError, Scene, SceneSetting};

    fn group(name: &str, address: u16, code: u8) -> Group {
        Group {
            name: name.to_string(),
            address,
            code,
        }
    }

    fn scene(name: &str, addresses: &[u16]) -> Scene {
        Scene {
            name: name.to_string(),
            settings: addresses
                .iter()
                .map(|&group_address| SceneSetting {
                    group_address,
                    position_code: 0x02,
                })
                .collect(),
        }
    }

    #[test]
    fn test_retrieve_catalog_sends_query_and_collects_records() {
        // Arrange
        let script = HubScript::new()
            .count_header(1, 1)
            .group(&group("Living Room", 0x8002, 0x0b))
            .scene(&scene("Movie Scene", &[0x8002]));
        let mut transport = ScriptedTransport::new(script);

        // Act
        let catalog = retrieve_catalog(&mut transport).unwrap();

        // Assert
        assert_eq!(transport.sent(), vec![0x16, 0x00]);
        assert_eq!(catalog.group("Living Room").unwrap().code, 0x0b);
        assert_eq!(catalog.scene("Movie Scene").unwrap().settings.len(), 1);
        assert_eq!(transport.remaining(), 0);
    }

    #[test]
    fn test_retrieve_catalog_accepts_any_interleaving() {
        // Arrange: header 000c000f, then 27 records alternating scene/group
        let mut script = HubScript::new().raw(&[0x16, 0x04, 0x00, 0x0c, 0x00, 0x0f]);
        for i in 0..15u16 {
            script = script.scene(&scene(&format!("Scene {i}"), &[0x8000 + i]));
            if i < 12 {
                script = script.group(&group(&format!("Group {i}"), 0x8000 + i, i as u8 + 1));
            }
        }
        let mut transport = ScriptedTransport::new(script);

        // Act
        let catalog = retrieve_catalog(&mut transport).unwrap();

        // Assert
        assert_eq!(catalog.groups.len(), 12);
        assert_eq!(catalog.scenes.len(), 15);
    }

    #[test]
    fn test_retrieve_catalog_reads_exactly_the_announced_records() {
        // Arrange: a trailing acknowledgement must remain unread
        let script = HubScript::new()
            .count_header(1, 0)
            .group(&group("Office", 0x8003, 0x0c))
            .acknowledgement();
        let mut transport = ScriptedTransport::new(script);

        // Act
        retrieve_catalog(&mut transport).unwrap();

        // Assert
        assert_eq!(transport.remaining(), 2);
    }

    #[test]
    fn test_retrieve_catalog_empty_hub_yields_empty_catalog() {
        let mut transport = ScriptedTransport::new(HubScript::new().count_header(0, 0));

        let catalog = retrieve_catalog(&mut transport).unwrap();

        assert!(catalog.groups.is_empty());
        assert!(catalog.scenes.is_empty());
    }

    #[test]
    fn test_retrieve_catalog_duplicate_group_name_keeps_last() {
        // Arrange
        let script = HubScript::new()
            .count_header(2, 0)
            .group(&group("Office", 0x8001, 0x01))
            .group(&group("Office", 0x8002, 0x02));
        let mut transport = ScriptedTransport::new(script);

        // Act
        let catalog = retrieve_catalog(&mut transport).unwrap();

        // Assert
        assert_eq!(catalog.groups.len(), 1);
        assert_eq!(catalog.group("Office").unwrap().code, 0x02);
    }

    #[test]
    fn test_retrieve_catalog_rejects_malformed_header() {
        // Arrange: a group record where the header should be
        let script = HubScript::new().group(&group("Office", 0x8001, 0x01));
        let mut transport = ScriptedTransport::new(script);

        // Act
        let result = retrieve_catalog(&mut transport);

        // Assert
        assert!(matches!(
            result,
            Err(HubError::Protocol(ProtocolError::UnexpectedBodyLength { .. }))
        ));
    }

    #[test]
    fn test_retrieve_catalog_aborts_on_unknown_record_shape() {
        // Arrange: second record is an inbound frame of the wrong size
        let script = HubScript::new()
            .count_header(2, 0)
            .group(&group("Office", 0x8001, 0x01))
            .raw(&[0x16, 0x03, 0x01, 0x02, 0x03]);
        let mut transport = ScriptedTransport::new(script);

        // Act
        let result = retrieve_catalog(&mut transport);

        // Assert
        assert!(matches!(
            result,
            Err(HubError::Protocol(ProtocolError::UnexpectedRecord {
                flag: 0x16,
                body_length: 3
            }))
        ));
    }

    #[test]
    fn test_retrieve_catalog_aborts_on_unknown_flag() {
        let script = HubScript::new().count_header(1, 0).raw(&[0x42, 0x00]);
        let mut transport = ScriptedTransport::new(script);

        let result = retrieve_catalog(&mut transport);

        assert!(matches!(
            result,
            Err(HubError::Protocol(ProtocolError::UnknownFlag(0x42)))
        ));
    }

    #[test]
    fn test_retrieve_catalog_reports_closed_when_records_are_missing() {
        // Arrange: header announces three records, only one arrives
        let script = HubScript::new()
            .count_header(2, 1)
            .group(&group("Office", 0x8001, 0x01));
        let mut transport = ScriptedTransport::new(script);

        // Act
        let result = retrieve_catalog(&mut transport);

        // Assert
        assert!(matches!(
            result,
            Err(HubError::Transport(TransportError::Closed))
        ));
    }
}
