//! TOML-based configuration for the hub client.
//!
//! Reads and writes `AppConfig` to the platform-appropriate config file:
//! - Windows:  `%APPDATA%\QSync\config.toml`
//! - Linux:    `~/.config/qsync/config.toml`
//! - macOS:    `~/Library/Application Support/QSync/config.toml`
//!
//! A different file can be given explicitly (`qsync --config <PATH>`).
//!
//! # File format
//!
//! ```toml
//! [general]
//! log_level = "info"
//!
//! [hub]
//! host = "192.168.1.40"
//! port = 9760
//! io_timeout_ms = 5000   # 0 disables the timeout
//!
//! [discovery]
//! broadcast_address = "255.255.255.255"
//! port = 9720
//! timeout_ms = 1000
//! ```
//!
//! # Serde default values
//!
//! Every section and every field falls back to a default when absent, so an
//! empty file (or no file at all) is a valid configuration.  Fields annotated
//! with `#[serde(default = "some_fn")]` use the return value of `some_fn()`.

use std::net::{SocketAddr, ToSocketAddrs};
use std::path::{Path, PathBuf};
use std::time::Duration;

use qsync_core::protocol::messages::{DEFAULT_DISCOVERY_PORT, DEFAULT_HUB_PORT};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::infrastructure::network::DiscoverySettings;

/// Error type for configuration file operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The platform config directory could not be determined.
    #[error("could not determine platform config directory")]
    NoPlatformConfigDir,

    /// A file system I/O error occurred.
    #[error("I/O error accessing config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The TOML content could not be parsed.
    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    /// The config could not be serialized to TOML.
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// A configured host does not resolve to a socket address.
    #[error("invalid address {address:?}: {source}")]
    InvalidAddress {
        address: String,
        #[source]
        source: std::io::Error,
    },
}

// ── Config schema types ───────────────────────────────────────────────────────

/// Top-level configuration stored on disk.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct AppConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub hub: HubConfig,
    #[serde(default)]
    pub discovery: DiscoveryConfig,
}

/// Settings that are not about the hub itself.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GeneralConfig {
    /// `tracing` log level used when `RUST_LOG` is unset:
    /// `"error"`, `"warn"`, `"info"`, `"debug"`, `"trace"`.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

/// Where the hub is and how long to wait for it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HubConfig {
    /// Host name or IP address of the hub.
    #[serde(default = "default_hub_host")]
    pub host: String,
    /// TCP port the hub listens on.
    #[serde(default = "default_hub_port")]
    pub port: u16,
    /// Connect, read and write timeout in milliseconds.  `0` disables it.
    #[serde(default = "default_io_timeout_ms")]
    pub io_timeout_ms: u64,
}

/// UDP broadcast discovery settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DiscoveryConfig {
    /// Destination of the discovery probe.
    #[serde(default = "default_broadcast_address")]
    pub broadcast_address: String,
    /// UDP port the hub answers probes on.
    #[serde(default = "default_discovery_port")]
    pub port: u16,
    /// How long to wait for a reply, in milliseconds.
    #[serde(default = "default_discovery_timeout_ms")]
    pub timeout_ms: u64,
}

// ── Default helpers ───────────────────────────────────────────────────────────

fn default_log_level() -> String {
    "info".to_string()
}
fn default_hub_host() -> String {
    "127.0.0.1".to_string()
}
fn default_hub_port() -> u16 {
    DEFAULT_HUB_PORT
}
fn default_io_timeout_ms() -> u64 {
    5000
}
fn default_broadcast_address() -> String {
    "255.255.255.255".to_string()
}
fn default_discovery_port() -> u16 {
    DEFAULT_DISCOVERY_PORT
}
fn default_discovery_timeout_ms() -> u64 {
    1000
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            host: default_hub_host(),
            port: default_hub_port(),
            io_timeout_ms: default_io_timeout_ms(),
        }
    }
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            broadcast_address: default_broadcast_address(),
            port: default_discovery_port(),
            timeout_ms: default_discovery_timeout_ms(),
        }
    }
}

// ── Derived settings ──────────────────────────────────────────────────────────

impl HubConfig {
    /// Resolves `host:port` to the first matching socket address.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidAddress`] if the host cannot be resolved.
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        resolve(&self.host, self.port)
    }

    /// The I/O timeout, or `None` when disabled.
    pub fn io_timeout(&self) -> Option<Duration> {
        (self.io_timeout_ms > 0).then(|| Duration::from_millis(self.io_timeout_ms))
    }
}

impl DiscoveryConfig {
    /// Converts the file settings into what the discovery probe needs.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidAddress`] if the broadcast address cannot
    /// be resolved.
    pub fn settings(&self) -> Result<DiscoverySettings, ConfigError> {
        Ok(DiscoverySettings {
            broadcast_addr: resolve(&self.broadcast_address, self.port)?,
            timeout: Duration::from_millis(self.timeout_ms),
        })
    }
}

fn resolve(host: &str, port: u16) -> Result<SocketAddr, ConfigError> {
    let invalid = |source: std::io::Error| ConfigError::InvalidAddress {
        address: format!("{host}:{port}"),
        source,
    };
    (host, port)
        .to_socket_addrs()
        .map_err(invalid)?
        .next()
        .ok_or_else(|| {
            invalid(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "host resolved to no addresses",
            ))
        })
}

// ── Config repository ─────────────────────────────────────────────────────────

/// Determines the platform-appropriate directory for the config file.
///
/// # Errors
///
/// Returns [`ConfigError::NoPlatformConfigDir`] when the platform config base
/// directory cannot be determined from the environment.
pub fn config_dir() -> Result<PathBuf, ConfigError> {
    platform_config_dir().ok_or(ConfigError::NoPlatformConfigDir)
}

/// Resolves the full path to the default config file.
///
/// # Errors
///
/// Returns [`ConfigError::NoPlatformConfigDir`] if the base directory cannot be
/// determined.
pub fn config_file_path() -> Result<PathBuf, ConfigError> {
    Ok(config_dir()?.join("config.toml"))
}

/// Loads `AppConfig` from the default location, returning
/// `AppConfig::default()` if the file does not yet exist.
///
/// # Errors
///
/// See [`load_config_from`].
pub fn load_config() -> Result<AppConfig, ConfigError> {
    load_config_from(&config_file_path()?)
}

/// Loads `AppConfig` from `path`, returning `AppConfig::default()` if the file
/// does not exist.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system errors other than "not found",
/// and [`ConfigError::Parse`] if the TOML is malformed.
pub fn load_config_from(path: &Path) -> Result<AppConfig, ConfigError> {
    match std::fs::read_to_string(path) {
        Ok(content) => {
            let cfg: AppConfig = toml::from_str(&content)?;
            Ok(cfg)
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(AppConfig::default()),
        Err(e) => Err(ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}

/// Persists `config` to the default location.
///
/// # Errors
///
/// See [`save_config_to`].
pub fn save_config(config: &AppConfig) -> Result<PathBuf, ConfigError> {
    let path = config_file_path()?;
    save_config_to(config, &path)?;
    Ok(path)
}

/// Persists `config` to `path`, creating parent directories as needed.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system failures or
/// [`ConfigError::Serialize`] if serialization fails.
pub fn save_config_to(config: &AppConfig, path: &Path) -> Result<(), ConfigError> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).map_err(|source| ConfigError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
    }

    let content = toml::to_string_pretty(config)?;
    std::fs::write(path, content).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Resolves the platform config directory, including the `qsync` subdirectory.
fn platform_config_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        std::env::var_os("APPDATA").map(|p| PathBuf::from(p).join("QSync"))
    }

    #[cfg(target_os = "linux")]
    {
        // XDG_CONFIG_HOME or ~/.config
        let base = std::env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".config")))?;
        Some(base.join("qsync"))
    }

    #[cfg(target_os = "macos")]
    {
        std::env::var_os("HOME").map(|h| {
            PathBuf::from(h)
                .join("Library")
                .join("Application Support")
                .join("QSync")
        })
    }

    #[cfg(not(any(target_os = "windows", target_os = "linux", target_os = "macos")))]
    {
        None
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("qsync_test_{}_{name}", std::process::id()))
    }

    // ── AppConfig defaults ────────────────────────────────────────────────────

    #[test]
    fn test_app_config_default_has_expected_ports() {
        // Arrange / Act
        let cfg = AppConfig::default();

        // Assert
        assert_eq!(cfg.hub.port, 9760);
        assert_eq!(cfg.discovery.port, 9720);
    }

    #[test]
    fn test_app_config_default_timeouts() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.hub.io_timeout(), Some(Duration::from_secs(5)));
        assert_eq!(cfg.discovery.timeout_ms, 1000);
    }

    #[test]
    fn test_general_config_default_log_level_is_info() {
        let cfg = GeneralConfig::default();
        assert_eq!(cfg.log_level, "info");
    }

    #[test]
    fn test_zero_io_timeout_disables_timeout() {
        let hub = HubConfig {
            io_timeout_ms: 0,
            ..HubConfig::default()
        };
        assert_eq!(hub.io_timeout(), None);
    }

    // ── TOML parsing ──────────────────────────────────────────────────────────

    #[test]
    fn test_deserialize_empty_toml_uses_defaults() {
        // Act
        let cfg: AppConfig = toml::from_str("").expect("deserialize empty");

        // Assert
        assert_eq!(cfg, AppConfig::default());
    }

    #[test]
    fn test_deserialize_partial_hub_overrides_defaults() {
        // Arrange
        let toml_str = r#"
[hub]
host = "192.168.1.40"
"#;

        // Act
        let cfg: AppConfig = toml::from_str(toml_str).expect("deserialize partial");

        // Assert
        assert_eq!(cfg.hub.host, "192.168.1.40");
        // Unspecified fields keep their defaults
        assert_eq!(cfg.hub.port, 9760);
        assert_eq!(cfg.hub.io_timeout_ms, 5000);
        assert_eq!(cfg.discovery, DiscoveryConfig::default());
    }

    #[test]
    fn test_app_config_serializes_and_deserializes_round_trip() {
        // Arrange
        let mut cfg = AppConfig::default();
        cfg.hub.host = "10.0.0.7".to_string();
        cfg.discovery.timeout_ms = 2500;

        // Act
        let toml_str = toml::to_string_pretty(&cfg).expect("serialize");
        let restored: AppConfig = toml::from_str(&toml_str).expect("deserialize");

        // Assert
        assert_eq!(cfg, restored);
    }

    #[test]
    fn test_deserialize_invalid_toml_returns_parse_error() {
        // Arrange
        let bad_toml = "[[[ not valid toml";

        // Act
        let result: Result<AppConfig, toml::de::Error> = toml::from_str(bad_toml);

        // Assert
        assert!(result.is_err());
    }

    // ── Derived settings ──────────────────────────────────────────────────────

    #[test]
    fn test_hub_socket_addr_combines_host_and_port() {
        let hub = HubConfig {
            host: "192.168.1.40".to_string(),
            port: 9761,
            ..HubConfig::default()
        };

        assert_eq!(
            hub.socket_addr().unwrap(),
            "192.168.1.40:9761".parse::<SocketAddr>().unwrap()
        );
    }

    #[test]
    fn test_hub_socket_addr_rejects_unresolvable_host() {
        let hub = HubConfig {
            host: "not a host name".to_string(),
            ..HubConfig::default()
        };

        assert!(matches!(
            hub.socket_addr(),
            Err(ConfigError::InvalidAddress { .. })
        ));
    }

    #[test]
    fn test_discovery_settings_use_configured_target() {
        let discovery = DiscoveryConfig {
            broadcast_address: "192.168.1.255".to_string(),
            port: 9720,
            timeout_ms: 250,
        };

        let settings = discovery.settings().unwrap();

        assert_eq!(
            settings.broadcast_addr,
            "192.168.1.255:9720".parse::<SocketAddr>().unwrap()
        );
        assert_eq!(settings.timeout, Duration::from_millis(250));
    }

    // ── File I/O ──────────────────────────────────────────────────────────────

    #[test]
    fn test_load_config_from_returns_default_when_file_absent() {
        // Arrange
        let path = PathBuf::from("/nonexistent/path/that/cannot/exist/config.toml");

        // Act
        let cfg = load_config_from(&path).unwrap();

        // Assert
        assert_eq!(cfg, AppConfig::default());
    }

    #[test]
    fn test_load_config_from_reports_parse_error() {
        // Arrange
        let dir = scratch_dir("bad_toml");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        std::fs::write(&path, "[hub\nport = ").unwrap();

        // Act
        let result = load_config_from(&path);

        // Assert
        assert!(matches!(result, Err(ConfigError::Parse(_))));

        // Cleanup
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_save_and_load_config_round_trip_via_temp_dir() {
        // Arrange
        let dir = scratch_dir("round_trip");
        let path = dir.join("nested").join("config.toml");
        let mut cfg = AppConfig::default();
        cfg.hub.port = 12345;
        cfg.general.log_level = "debug".to_string();

        // Act
        save_config_to(&cfg, &path).unwrap();
        let loaded = load_config_from(&path).unwrap();

        // Assert
        assert_eq!(loaded.hub.port, 12345);
        assert_eq!(loaded.general.log_level, "debug");

        // Cleanup
        std::fs::remove_dir_all(&dir).ok();
    }

    // ── config_dir path formation ─────────────────────────────────────────────

    #[test]
    fn test_config_file_path_ends_with_config_toml() {
        if let Ok(path) = config_file_path() {
            assert!(
                path.ends_with("qsync/config.toml") || path.ends_with("QSync/config.toml"),
                "unexpected config path {path:?}"
            );
        }
        // NoPlatformConfigDir in a stripped environment is also acceptable.
    }
}
