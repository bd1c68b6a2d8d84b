//! Bot configuration with TOML file support.
//!
//! Secrets (bot token, directory credentials) are never read from the file;
//! the daemon takes them from the environment or the command line.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use peerlink_directory::DirectoryConfig;
use peerlink_utils::LogFormat;
use peerlink_verification::RoleConfig;

use crate::DiscordError;

/// Configuration for the bot.
///
/// Can be loaded from a TOML file via [`BotConfig::from_toml_file`] or
/// built programmatically (e.g. for tests).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BotConfig {
    /// Data directory for the identity store.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// LMDB map size in bytes.
    #[serde(default = "default_map_size")]
    pub map_size: usize,

    /// Port the interactions endpoint listens on.
    #[serde(default = "default_listen_port")]
    pub listen_port: u16,

    /// Log format: "human" or "json".
    #[serde(default)]
    pub log_format: LogFormat,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub discord: DiscordConfig,

    #[serde(default)]
    pub directory: DirectoryConfig,

    /// Role ids granted on verification.
    #[serde(default)]
    pub roles: RoleConfig,
}

/// Discord application settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DiscordConfig {
    #[serde(default)]
    pub application_id: u64,

    /// Hex-encoded Ed25519 key used to check interaction signatures.
    #[serde(default)]
    pub public_key: String,

    /// Guild to register commands on. `0` registers them globally.
    #[serde(default)]
    pub guild_id: u64,

    #[serde(default = "default_api_base")]
    pub api_base: String,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_data_dir() -> PathBuf {
    PathBuf::from("./peerlink_data")
}

fn default_map_size() -> usize {
    peerlink_store_lmdb::environment::DEFAULT_MAP_SIZE
}

fn default_listen_port() -> u16 {
    8080
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_api_base() -> String {
    "https://discord.com/api/v10".to_string()
}

// ── Impl ───────────────────────────────────────────────────────────────

impl BotConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: &Path) -> Result<Self, DiscordError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| DiscordError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, DiscordError> {
        toml::from_str(s).map_err(|e| DiscordError::Config(e.to_string()))
    }

    /// Serialize the configuration to a TOML string.
    pub fn to_toml_string(&self) -> Result<String, DiscordError> {
        toml::to_string_pretty(self).map_err(|e| DiscordError::Config(e.to_string()))
    }

    /// Check the settings the bot cannot start without.
    pub fn validate(&self) -> Result<(), DiscordError> {
        if self.discord.application_id == 0 {
            return Err(DiscordError::Config("discord.application_id is not set".into()));
        }
        if self.discord.public_key.trim().is_empty() {
            return Err(DiscordError::Config("discord.public_key is not set".into()));
        }
        Ok(())
    }
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            map_size: default_map_size(),
            listen_port: default_listen_port(),
            log_format: LogFormat::default(),
            log_level: default_log_level(),
            discord: DiscordConfig::default(),
            directory: DirectoryConfig::default(),
            roles: RoleConfig::default(),
        }
    }
}

impl Default for DiscordConfig {
    fn default() -> Self {
        Self {
            application_id: 0,
            public_key: String::new(),
            guild_id: 0,
            api_base: default_api_base(),
        }
    }
}
