//! ControlHub: the four operations the CLI exposes.
//!
//! Every call is a self-contained session: validate the caller's input, open
//! a fresh connection, retrieve the catalog, build and send one command, read
//! the hub's reply.  The transport lives on the call's stack and is dropped on
//! every exit path, so no connection outlives the call that opened it.

use qsync_core::protocol::codec::to_hex;
use qsync_core::{Frame, HubCatalog};
use tracing::info;

use super::build_command::{
    build_group_command, build_groups_command, build_scene_command, position_code_for,
    GroupTargets,
};
use super::error::HubError;
use super::retrieve_catalog::retrieve_catalog;
use super::transport::{receive_frame, send_frame, HubConnector};

/// What was sent and what the hub answered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandReceipt {
    pub command: Frame,
    pub acknowledgement: Frame,
}

/// Runs hub sessions through connections opened by `C`.
pub struct HubController<C: HubConnector> {
    connector: C,
}

impl<C: HubConnector> HubController<C> {
    pub fn new(connector: C) -> Self {
        Self { connector }
    }

    pub fn connector(&self) -> &C {
        &self.connector
    }

    /// Connects and returns the hub's current groups and scenes.
    pub fn retrieve_catalog(&self) -> Result<HubCatalog, HubError> {
        let mut transport = self.connector.connect()?;
        retrieve_catalog(&mut transport)
    }

    /// Moves one group to `position` percent open.
    ///
    /// # Errors
    ///
    /// [`HubError::InvalidPosition`] is returned before connecting.
    /// [`HubError::NotFound`] is returned when the hub has no such group, in
    /// which case no command bytes are sent.
    pub fn set_group(&self, group_name: &str, position: f64) -> Result<CommandReceipt, HubError> {
        position_code_for(position)?;
        self.execute(|catalog| build_group_command(catalog, group_name, position))
    }

    /// Executes the named scene.
    pub fn set_scene(&self, scene_name: &str) -> Result<CommandReceipt, HubError> {
        self.execute(|catalog| build_scene_command(catalog, scene_name))
    }

    /// Moves several groups in one command.
    pub fn set_groups(&self, targets: &GroupTargets) -> Result<CommandReceipt, HubError> {
        self.execute(|catalog| build_groups_command(catalog, targets))
    }

    fn execute<F>(&self, build: F) -> Result<CommandReceipt, HubError>
    where
        F: FnOnce(&HubCatalog) -> Result<Frame, HubError>,
    {
        let mut transport = self.connector.connect()?;
        let catalog = retrieve_catalog(&mut transport)?;
        let command = build(&catalog)?;

        send_frame(&mut transport, &command)?;
        info!(command = %to_hex(&command.to_bytes()), "command sent");

        let acknowledgement = receive_frame(&mut transport)?;
        Ok(CommandReceipt {
            command,
            acknowledgement,
        })
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
