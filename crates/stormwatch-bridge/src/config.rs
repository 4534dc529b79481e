//! Configuration loading and typed config structures for the bridge.
//!
//! The canonical configuration lives in `stormwatch.yaml` next to the
//! host's own config. This module defines strongly-typed structs that
//! mirror the YAML structure, and provides a loader that reads and
//! parses the file. Every section and every field has a default, so an
//! empty file (or no file at all) yields a fully working configuration.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level bridge configuration.
///
/// Mirrors the structure of `stormwatch.yaml`. All fields have defaults
/// matching the values the bridge shipped with.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct BridgeConfig {
    /// Status server settings (bind address and port).
    #[serde(default)]
    pub server: ServerSection,

    /// Notification sink settings (URL and timeouts).
    #[serde(default)]
    pub sink: SinkSection,

    /// Polling and dispatch cadences.
    #[serde(default)]
    pub cadence: CadenceSection,

    /// Storm detection parameters.
    #[serde(default)]
    pub storm: StormSection,

    /// Player roster parameters.
    #[serde(default)]
    pub players: PlayersSection,
}

impl BridgeConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = serde_yml::from_str(&contents)?;
        Ok(config)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yml::from_str(yaml)?;
        Ok(config)
    }
}

/// Status server configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ServerSection {
    /// The host address to bind to.
    #[serde(default = "default_server_host")]
    pub host: String,

    /// The TCP port to listen on (0 picks an ephemeral port).
    #[serde(default = "default_server_port")]
    pub port: u16,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            host: default_server_host(),
            port: default_server_port(),
        }
    }
}

/// Notification sink configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SinkSection {
    /// URL the batch dispatcher POSTs to.
    #[serde(default = "default_sink_url")]
    pub url: String,

    /// Per-request timeout in milliseconds.
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,

    /// Upper bound in milliseconds on the shutdown flush.
    #[serde(default = "default_flush_timeout_ms")]
    pub flush_timeout_ms: u64,
}

impl SinkSection {
    /// Per-request timeout as a [`Duration`].
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// Shutdown flush bound as a [`Duration`].
    pub const fn flush_timeout(&self) -> Duration {
        Duration::from_millis(self.flush_timeout_ms)
    }
}

impl Default for SinkSection {
    fn default() -> Self {
        Self {
            url: default_sink_url(),
            request_timeout_ms: default_request_timeout_ms(),
            flush_timeout_ms: default_flush_timeout_ms(),
        }
    }
}

/// Polling and dispatch cadences, all in milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CadenceSection {
    /// Storm detector poll interval.
    #[serde(default = "default_storm_poll_ms")]
    pub storm_poll_ms: u64,

    /// Season detector poll interval.
    #[serde(default = "default_season_poll_ms")]
    pub season_poll_ms: u64,

    /// Player count detector poll interval.
    #[serde(default = "default_players_poll_ms")]
    pub players_poll_ms: u64,

    /// Dispatch drain interval.
    #[serde(default = "default_dispatch_ms")]
    pub dispatch_ms: u64,

    /// Listener health check interval.
    #[serde(default = "default_health_check_ms")]
    pub health_check_ms: u64,

    /// Heartbeat interval (0 disables the heartbeat).
    #[serde(default)]
    pub heartbeat_ms: u64,
}

impl Default for CadenceSection {
    fn default() -> Self {
        Self {
            storm_poll_ms: default_storm_poll_ms(),
            season_poll_ms: default_season_poll_ms(),
            players_poll_ms: default_players_poll_ms(),
            dispatch_ms: default_dispatch_ms(),
            health_check_ms: default_health_check_ms(),
            heartbeat_ms: 0,
        }
    }
}

/// Storm detection configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StormSection {
    /// How many in-game days before onset the pre-warning fires.
    #[serde(default = "default_warning_lead_days")]
    pub warning_lead_days: f64,
}

impl Default for StormSection {
    fn default() -> Self {
        Self {
            warning_lead_days: default_warning_lead_days(),
        }
    }
}

/// Player roster configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PlayersSection {
    /// Capacity reported when the host does not know its own.
    #[serde(default = "default_max_players")]
    pub default_max_players: u32,
}

impl Default for PlayersSection {
    fn default() -> Self {
        Self {
            default_max_players: default_max_players(),
        }
    }
}

// ---------------------------------------------------------------------------
// Default value functions (serde default requires named functions)
// ---------------------------------------------------------------------------

fn default_server_host() -> String {
    "127.0.0.1".to_owned()
}

const fn default_server_port() -> u16 {
    8080
}

fn default_sink_url() -> String {
    "http://127.0.0.1:8081/status/notification".to_owned()
}

const fn default_request_timeout_ms() -> u64 {
    5000
}

const fn default_flush_timeout_ms() -> u64 {
    3000
}

const fn default_storm_poll_ms() -> u64 {
    2000
}

const fn default_season_poll_ms() -> u64 {
    10_000
}

const fn default_players_poll_ms() -> u64 {
    5000
}

const fn default_dispatch_ms() -> u64 {
    30_000
}

const fn default_health_check_ms() -> u64 {
    60_000
}

const fn default_warning_lead_days() -> f64 {
    0.35
}

const fn default_max_players() -> u32 {
    stormwatch_types::DEFAULT_MAX_PLAYERS
}
