//! Groups and scenes configured on a hub.
//!
//! A hub session starts by dumping its whole configuration: every blind
//! group and every scene.  [`HubCatalog`] is the in-memory result of one such
//! dump.  It is rebuilt on every connection and never persisted.
//!
//! Groups are referenced two different ways on the wire:
//!
//! - by **code** (1 byte) in direct position commands, and
//! - by **address** (2 bytes) inside scene descriptors.
//!
//! Executing a scene therefore means translating each address back to a
//! code, which is what [`HubCatalog::address_index`] is for.

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

/// A named set of physically linked blinds sharing one control code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Group {
    pub name: String,
    /// Identifies the group inside scene descriptors.
    pub address: u16,
    /// Identifies the group in position commands.
    pub code: u8,
}

/// One group's target position inside a scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SceneSetting {
    pub group_address: u16,
    pub position_code: u8,
}

/// A named preset moving several groups at once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Scene {
    pub name: String,
    /// At most [`crate::protocol::messages::MAX_SCENE_SETTINGS`] entries, in
    /// the order the hub listed them.
    pub settings: Vec<SceneSetting>,
}

/// Everything retrieved from a hub in one session.
///
/// Both collections are keyed by name.  `BTreeMap` keeps listings sorted so
/// the CLI output is stable between runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct HubCatalog {
    pub groups: BTreeMap<String, Group>,
    pub scenes: BTreeMap<String, Scene>,
}

impl HubCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a group, replacing any earlier group with the same name.
    ///
    /// Returns the replaced group, if any.
    pub fn insert_group(&mut self, group: Group) -> Option<Group> {
        self.groups.insert(group.name.clone(), group)
    }

    /// Inserts a scene, replacing any earlier scene with the same name.
    ///
    /// Returns the replaced scene, if any.
    pub fn insert_scene(&mut self, scene: Scene) -> Option<Scene> {
        self.scenes.insert(scene.name.clone(), scene)
    }

    pub fn group(&self, name: &str) -> Option<&Group> {
        self.groups.get(name)
    }

    pub fn scene(&self, name: &str) -> Option<&Scene> {
        self.scenes.get(name)
    }

    /// Builds an address → code lookup over the current groups.
    ///
    /// Addresses are not guaranteed unique; when two groups share one, the
    /// group visited last (in name order) wins.
    pub fn address_index(&self) -> HashMap<u16, u8> {
        self.groups
            .values()
            .map(|group| (group.address, group.code))
            .collect()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn group(name: &str, address: u16, code: u8) -> Group {
        Group {
            name: name.to_string(),
            address,
            code,
        }
    }

    #[test]
    fn test_new_catalog_is_empty() {
        let catalog = HubCatalog::new();
        assert!(catalog.groups.is_empty());
        assert!(catalog.scenes.is_empty());
    }

    #[test]
    fn test_insert_group_with_duplicate_name_replaces_earlier_entry() {
        // Arrange
        let mut catalog = HubCatalog::new();
        assert!(catalog.insert_group(group("Kitchen", 0x8001, 0x01)).is_none());

        // Act
        let replaced = catalog.insert_group(group("Kitchen", 0x8002, 0x02));

        // Assert
        assert_eq!(replaced, Some(group("Kitchen", 0x8001, 0x01)));
        assert_eq!(catalog.groups.len(), 1);
        assert_eq!(catalog.group("Kitchen").map(|g| g.code), Some(0x02));
    }

    #[test]
    fn test_insert_scene_with_duplicate_name_replaces_earlier_entry() {
        let mut catalog = HubCatalog::new();
        catalog.insert_scene(Scene {
            name: "Night".to_string(),
            settings: vec![],
        });
        let replaced = catalog.insert_scene(Scene {
            name: "Night".to_string(),
            settings: vec![SceneSetting {
                group_address: 0x8002,
                position_code: 0x02,
            }],
        });

        assert!(replaced.is_some());
        assert_eq!(catalog.scene("Night").map(|s| s.settings.len()), Some(1));
    }

    #[test]
    fn test_address_index_maps_addresses_to_codes() {
        // Arrange
        let mut catalog = HubCatalog::new();
        catalog.insert_group(group("Living Room", 0x8002, 0x0b));
        catalog.insert_group(group("Bedroom", 0xc005, 0x16));

        // Act
        let index = catalog.address_index();

        // Assert
        assert_eq!(index.len(), 2);
        assert_eq!(index.get(&0x8002), Some(&0x0b));
        assert_eq!(index.get(&0xc005), Some(&0x16));
    }

    #[test]
    fn test_address_index_shared_address_keeps_last_group_in_name_order() {
        let mut catalog = HubCatalog::new();
        catalog.insert_group(group("Alpha", 0x8002, 0x01));
        catalog.insert_group(group("Beta", 0x8002, 0x02));

        let index = catalog.address_index();

        assert_eq!(index.len(), 1);
        assert_eq!(index.get(&0x8002), Some(&0x02));
    }

    #[test]
    fn test_lookup_of_unknown_names_returns_none() {
        let catalog = HubCatalog::new();
        assert!(catalog.group("Nowhere").is_none());
        assert!(catalog.scene("Nothing").is_none());
    }
}
