//! `qsync`: command-line client for a QSync motorized-blind hub.
//!
//! # Usage
//!
//! ```text
//! qsync [OPTIONS] <COMMAND>
//!
//! Commands:
//!   discover     Broadcast on the LAN and print the hub's address
//!   list         Print the hub's groups and scenes
//!   set-group    Move one group:            set-group "Living Room" 50
//!   set-scene    Execute a scene:           set-scene "Movie Scene"
//!   set-groups   Move several groups:       set-groups Kitchen 0 Office 100
//!   config       Show or create the configuration file
//!
//! Options:
//!   --config <PATH>   Configuration file [default: platform config dir]
//!   --host   <HOST>   Hub host name or IP, overrides the file
//!   --port   <PORT>   Hub TCP port, overrides the file
//! ```
//!
//! # Environment variable overrides
//!
//! | Variable       | Overrides        |
//! |----------------|------------------|
//! | `QSYNC_CONFIG` | `--config`       |
//! | `QSYNC_HOST`   | `[hub] host`     |
//! | `QSYNC_PORT`   | `[hub] port`     |
//! | `RUST_LOG`     | `[general] log_level` |
//!
//! CLI args take precedence over environment variables, which take precedence
//! over the file.

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use qsync_cli::application::{CommandReceipt, GroupTargets, HubController};
use qsync_cli::infrastructure::network::{discover_hub, TcpConnector};
use qsync_cli::infrastructure::storage::config::{
    config_file_path, load_config, load_config_from, save_config_to, AppConfig, ConfigError,
};
use qsync_core::domain::position::code_to_position;
use qsync_core::protocol::codec::to_hex;
use qsync_core::HubCatalog;

// ── CLI argument definitions ──────────────────────────────────────────────────

/// Discover and control a QSync blind hub.
#[derive(Debug, Parser)]
#[command(name = "qsync", about = "Command-line client for QSync blind hubs", version)]
struct Cli {
    /// Configuration file to use instead of the platform default.
    #[arg(long, global = true, env = "QSYNC_CONFIG")]
    config: Option<PathBuf>,

    /// Hub host name or IP address.
    #[arg(long, global = true, env = "QSYNC_HOST")]
    host: Option<String>,

    /// Hub TCP port.
    #[arg(long, global = true, env = "QSYNC_PORT")]
    port: Option<u16>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Broadcast a discovery probe and print the hub's IP address.
    Discover,

    /// Print every group and scene configured on the hub.
    List {
        /// Print the catalog as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Move one group to a position (0, 12.5, 25, ... 100 percent open).
    SetGroup {
        name: String,
        #[arg(allow_negative_numbers = true)]
        position: f64,
    },

    /// Execute a scene by name.
    SetScene { name: String },

    /// Move several groups at once: NAME POSITION [NAME POSITION ...].
    SetGroups {
        #[arg(required = true, allow_hyphen_values = true, value_name = "NAME POSITION")]
        args: Vec<String>,
    },

    /// Inspect or create the configuration file.
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Debug, Subcommand)]
enum ConfigAction {
    /// Print the effective configuration as TOML.
    Show,
    /// Write a configuration file with default values.
    Init {
        /// Overwrite an existing file.
        #[arg(long)]
        force: bool,
    },
}

impl Cli {
    /// Loads the configuration file and applies `--host` / `--port`.
    ///
    /// A missing file, or no platform config directory at all, yields the
    /// defaults.
    fn load_config(&self) -> anyhow::Result<AppConfig> {
        let mut config = match &self.config {
            Some(path) => load_config_from(path)
                .with_context(|| format!("failed to load config from {}", path.display()))?,
            None => match load_config() {
                Err(ConfigError::NoPlatformConfigDir) => AppConfig::default(),
                other => other.context("failed to load config")?,
            },
        };

        if let Some(host) = &self.host {
            config.hub.host = host.clone();
        }
        if let Some(port) = self.port {
            config.hub.port = port;
        }
        Ok(config)
    }

    fn config_path(&self) -> anyhow::Result<PathBuf> {
        match &self.config {
            Some(path) => Ok(path.clone()),
            None => config_file_path().context("no --config given"),
        }
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = cli.load_config()?;

    // `RUST_LOG` wins over the configured level.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.general.log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    match &cli.command {
        Command::Discover => {
            let settings = config
                .discovery
                .settings()
                .context("invalid discovery settings")?;
            let hub = discover_hub(&settings).context("hub discovery failed")?;
            println!("{}", hub.ip());
        }
        Command::List { json } => {
            let catalog = controller(&config)?
                .retrieve_catalog()
                .context("failed to retrieve groups and scenes")?;
            if *json {
                println!("{}", serde_json::to_string_pretty(&catalog)?);
            } else {
                print!("{}", render_catalog(&catalog));
            }
        }
        Command::SetGroup { name, position } => {
            let receipt = controller(&config)?
                .set_group(name, *position)
                .with_context(|| format!("failed to set group {name:?}"))?;
            report(&receipt);
        }
        Command::SetScene { name } => {
            let receipt = controller(&config)?
                .set_scene(name)
                .with_context(|| format!("failed to execute scene {name:?}"))?;
            report(&receipt);
        }
        Command::SetGroups { args } => {
            // Validate before connecting.
            let targets = GroupTargets::from_args(args)?;
            let receipt = controller(&config)?
                .set_groups(&targets)
                .context("failed to set groups")?;
            report(&receipt);
        }
        Command::Config { action } => run_config(&cli, &config, action)?,
    }
    Ok(())
}

fn controller(config: &AppConfig) -> anyhow::Result<HubController<TcpConnector>> {
    let addr = config.hub.socket_addr().context("invalid hub address")?;
    info!("using hub at {addr}");
    Ok(HubController::new(TcpConnector::new(
        addr,
        config.hub.io_timeout(),
    )))
}

fn run_config(cli: &Cli, config: &AppConfig, action: &ConfigAction) -> anyhow::Result<()> {
    match action {
        ConfigAction::Show => print!("{}", toml::to_string_pretty(config)?),
        ConfigAction::Init { force } => {
            let path = cli.config_path()?;
            if path.exists() && !force {
                anyhow::bail!(
                    "{} already exists (use --force to overwrite)",
                    path.display()
                );
            }
            save_config_to(&AppConfig::default(), &path)?;
            println!("wrote {}", path.display());
        }
    }
    Ok(())
}

fn report(receipt: &CommandReceipt) {
    println!("sent:  {}", to_hex(&receipt.command.to_bytes()));
    println!("reply: {}", to_hex(&receipt.acknowledgement.to_bytes()));
}

/// Formats the catalog as an indented listing, groups first.
fn render_catalog(catalog: &HubCatalog) -> String {
    let mut out = format!("Groups ({}):\n", catalog.groups.len());
    for group in catalog.groups.values() {
        out.push_str(&format!(
            "  {:<20} code 0x{:02x}  address 0x{:04x}\n",
            group.name, group.code, group.address
        ));
    }

    out.push_str(&format!("Scenes ({}):\n", catalog.scenes.len()));
    for scene in catalog.scenes.values() {
        out.push_str(&format!("  {}\n", scene.name));
        for setting in &scene.settings {
            let target = catalog
                .groups
                .values()
                .find(|g| g.address == setting.group_address)
                .map_or_else(
                    || format!("0x{:04x}", setting.group_address),
                    |g| g.name.clone(),
                );
            let position = code_to_position(setting.position_code).map_or_else(
                || format!("code 0x{:02x}", setting.position_code),
                |p| format!("{p}%"),
            );
            out.push_str(&format!("    {target} -> {position}\n"));
        }
    }
    out
}

// ── Tests ─────────────────────────────────────────────────────────────────────
