//! # Configuration
//!
//! TOML configuration for the game server and its command engine.
//!
//! ```toml
//! [server]
//! name = "Mudcore"
//! bind = "127.0.0.1:4000"
//! max_connections = 64
//! motd = "Welcome, traveller."
//!
//! [server.staff]
//! ada = "dm"
//!
//! [commands]
//! duplicate_policy = "reject"   # reject | warn | shadow
//! petrified_allow = ["help", "quit", "score", "who"]
//!
//! [scheduler]
//! tick_ms = 1000
//! stats_interval_secs = 300
//!
//! [logging]
//! level = "info"
//! file = "mudcore.log"
//! security_file = "mudcore-security.log"
//! ```
//!
//! Every section has defaults, so a partial file (or none, via
//! [`Config::default`]) is enough to start a server.
use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tokio::fs;

use crate::engine::dispatch::DEFAULT_PETRIFIED_ALLOW;
use crate::engine::namespace::DuplicatePolicy;
use crate::engine::roles::{self, LEVEL_PLAYER};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub commands: CommandsConfig,
    #[serde(default)]
    pub scheduler: SchedulerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub name: String,
    pub bind: String,
    pub max_connections: usize,
    pub motd: String,
    /// Character name (case-insensitive) to role name, e.g. `ada = "dm"`.
    pub staff: HashMap<String, String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            name: "Mudcore".to_string(),
            bind: "127.0.0.1:4000".to_string(),
            max_connections: 64,
            motd: "Welcome, traveller.".to_string(),
            staff: HashMap::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandsConfig {
    #[serde(default)]
    pub duplicate_policy: DuplicatePolicy,
    #[serde(default = "default_petrified_allow")]
    pub petrified_allow: Vec<String>,
}

fn default_petrified_allow() -> Vec<String> {
    DEFAULT_PETRIFIED_ALLOW.iter().map(|s| s.to_string()).collect()
}

impl Default for CommandsConfig {
    fn default() -> Self {
        Self {
            duplicate_policy: DuplicatePolicy::default(),
            petrified_allow: default_petrified_allow(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// How often the game loop wakes to fire delayed actions. Actions still fire
    /// at most once per wall-clock second.
    #[serde(default = "default_tick_ms")]
    pub tick_ms: u64,
    /// Period of the queue statistics log line; 0 disables it.
    #[serde(default = "default_stats_interval_secs")]
    pub stats_interval_secs: u64,
}

fn default_tick_ms() -> u64 {
    1000
}

fn default_stats_interval_secs() -> u64 {
    300
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            tick_ms: default_tick_ms(),
            stats_interval_secs: default_stats_interval_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub file: Option<String>,
    /// Separate file for staff command use and authorization denials.
    pub security_file: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: Some("mudcore.log".to_string()),
            security_file: Some("mudcore-security.log".to_string()),
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub async fn load(path: &str) -> Result<Self> {
        let content = fs::read_to_string(path)
            .await
            .map_err(|e| anyhow!("Failed to read config file {}: {}", path, e))?;

        Self::from_toml(&content).map_err(|e| anyhow!("Failed to parse config file {}: {}", path, e))
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Create a default configuration file
    pub async fn create_default(path: &str) -> Result<()> {
        let config = Config::default();
        let content = toml::to_string_pretty(&config)
            .map_err(|e| anyhow!("Failed to serialize default config: {}", e))?;

        fs::write(path, content)
            .await
            .map_err(|e| anyhow!("Failed to write config file {}: {}", path, e))?;

        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if self.scheduler.tick_ms == 0 {
            return Err(anyhow!("scheduler.tick_ms must be greater than zero"));
        }
        for (name, role) in &self.server.staff {
            if roles::level_for_name(role).is_none() {
                return Err(anyhow!("unknown role '{}' for staff member '{}'", role, name));
            }
        }
        Ok(())
    }

    /// Rank granted to a character on login.
    pub fn rank_for(&self, name: &str) -> u8 {
        self.server
            .staff
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .and_then(|(_, role)| roles::level_for_name(role))
            .unwrap_or(LEVEL_PLAYER)
    }
}
