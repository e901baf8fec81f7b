//! BuildCommand: turns a caller's target state into an outbound command frame.
//!
//! Three targets are supported:
//!
//! - one group moved to one position,
//! - a named scene, whose settings are resolved from group addresses to codes,
//! - an ad-hoc list of `(group, position)` pairs, validated up front by
//!   [`GroupTargets`].
//!
//! Every builder resolves names against a freshly retrieved [`HubCatalog`]
//! and fails without producing a frame when anything is missing.

use std::collections::HashSet;

use qsync_core::protocol::codec::encode_command;
use qsync_core::{position_to_code, CommandInstruction, Frame, HubCatalog, INVALID_POSITION_CODE};

use super::error::{HubError, NotFound, ValidationError};

/// Maps a percentage to its position code.
///
/// # Errors
///
/// Returns [`HubError::InvalidPosition`] for any value outside the nine
/// supported levels.
pub fn position_code_for(position: f64) -> Result<u8, HubError> {
    match position_to_code(position) {
        INVALID_POSITION_CODE => Err(HubError::InvalidPosition(position)),
        code => Ok(code),
    }
}

/// Builds the command moving one group to `position`.
///
/// The position is checked before the name is looked up.
pub fn build_group_command(
    catalog: &HubCatalog,
    group_name: &str,
    position: f64,
) -> Result<Frame, HubError> {
    let position_code = position_code_for(position)?;
    let instruction = resolve_group(catalog, group_name, position_code)?;
    Ok(encode_command(&[instruction])?)
}

/// Builds the command executing the named scene.
///
/// Instructions follow the scene's setting order.  A scene without settings
/// yields an empty command.
pub fn build_scene_command(catalog: &HubCatalog, scene_name: &str) -> Result<Frame, HubError> {
    let scene = catalog
        .scene(scene_name)
        .ok_or_else(|| NotFound::Scene(scene_name.to_string()))?;
    let codes = catalog.address_index();

    let instructions = scene
        .settings
        .iter()
        .map(|setting| {
            codes
                .get(&setting.group_address)
                .map(|&group_code| CommandInstruction {
                    group_code,
                    position_code: setting.position_code,
                })
                .ok_or_else(|| NotFound::GroupAddress {
                    scene: scene.name.clone(),
                    address: setting.group_address,
                })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(encode_command(&instructions)?)
}

/// Builds the command moving every group in `targets`, in their given order.
pub fn build_groups_command(catalog: &HubCatalog, targets: &GroupTargets) -> Result<Frame, HubError> {
    let instructions = targets
        .iter()
        .map(|(name, position_code)| resolve_group(catalog, name, position_code))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(encode_command(&instructions)?)
}

fn resolve_group(
    catalog: &HubCatalog,
    group_name: &str,
    position_code: u8,
) -> Result<CommandInstruction, HubError> {
    let group = catalog
        .group(group_name)
        .ok_or_else(|| NotFound::Group(group_name.to_string()))?;
    Ok(CommandInstruction {
        group_code: group.code,
        position_code,
    })
}

// ── Ad-hoc targets ────────────────────────────────────────────────────────────

/// A validated, ordered list of distinct groups and their target positions.
///
/// Construction performs every check that needs no catalog, so invalid input
/// is rejected before a connection is opened.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupTargets {
    targets: Vec<(String, u8)>,
}

impl GroupTargets {
    /// Validates `(name, percent)` pairs.
    ///
    /// # Errors
    ///
    /// Checked pair by pair, in order:
    /// - [`ValidationError::Empty`] when no pairs are given.
    /// - [`ValidationError::EmptyGroupName`] for a blank name.
    /// - [`ValidationError::DuplicateGroup`] for a name seen earlier.
    /// - [`HubError::InvalidPosition`] for an unsupported percentage.
    pub fn new(pairs: Vec<(String, f64)>) -> Result<Self, HubError> {
        if pairs.is_empty() {
            return Err(ValidationError::Empty.into());
        }

        let mut seen = HashSet::new();
        let mut targets = Vec::with_capacity(pairs.len());
        for (name, position) in pairs {
            if name.is_empty() {
                return Err(ValidationError::EmptyGroupName.into());
            }
            if !seen.insert(name.clone()) {
                return Err(ValidationError::DuplicateGroup(name).into());
            }
            targets.push((name, position_code_for(position)?));
        }
        Ok(Self { targets })
    }

    /// Parses a flat `NAME POSITION [NAME POSITION ...]` argument list.
    ///
    /// # Errors
    ///
    /// [`ValidationError::Empty`], [`ValidationError::OddArgumentCount`] and
    /// [`ValidationError::UnparsablePosition`] on malformed arguments, then
    /// anything [`GroupTargets::new`] rejects.
    pub fn from_args(args: &[String]) -> Result<Self, HubError> {
        if args.is_empty() {
            return Err(ValidationError::Empty.into());
        }
        if args.len() % 2 != 0 {
            return Err(ValidationError::OddArgumentCount(args.len()).into());
        }

        let pairs = args
            .chunks_exact(2)
            .map(|pair| {
                pair[1]
                    .trim()
                    .parse::<f64>()
                    .map(|position| (pair[0].clone(), position))
                    .map_err(|_| ValidationError::UnparsablePosition(pair[1].clone()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(pairs)
    }

    /// Iterates over `(group name, position code)` in input order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u8)> {
        self.targets.iter().map(|(name, code)| (name.as_str(), *code))
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
