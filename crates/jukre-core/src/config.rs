//! Configuration for the Juk.RE agent
//!
//! A deliberately small key-value document: the DDNS update token and the
//! poll interval. The file is read once per scheduler tick so operator
//! edits take effect without a restart, and it is self-healing: a missing
//! file is recreated with defaults on first read.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::error::{Error, Result};
use crate::journal::{EventLog, EventRecord};

/// Default poll interval between scheduler ticks
pub const DEFAULT_INTERVAL_SECONDS: u64 = 300;

/// Environment variable overriding the base directory
pub const BASE_DIR_ENV: &str = "JUKRE_BASE_DIR";

/// Default base directory for config and journal
pub const DEFAULT_BASE_DIR: &str = "/var/lib/jukre";

/// Persisted agent configuration
///
/// Values merge over defaults when deserializing, so a partial file (or an
/// empty object) is valid and yields defaults for the missing fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentConfig {
    /// DDNS update credential; empty means "not configured"
    #[serde(rename = "token-update", default)]
    pub token: String,

    /// Seconds between scheduler ticks
    #[serde(default = "default_interval_seconds")]
    pub interval_seconds: u64,
}

impl AgentConfig {
    /// Token with surrounding whitespace stripped, or `None` when empty
    ///
    /// An all-whitespace token counts as absent, matching the "missing
    /// token" handling in the scheduler loop.
    pub fn trimmed_token(&self) -> Option<&str> {
        let token = self.token.trim();
        (!token.is_empty()).then_some(token)
    }
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            token: String::new(),
            interval_seconds: default_interval_seconds(),
        }
    }
}

fn default_interval_seconds() -> u64 {
    DEFAULT_INTERVAL_SECONDS
}

/// Filesystem layout for the agent
#[derive(Debug, Clone)]
pub struct Paths {
    /// Base directory holding config and journal
    pub base_dir: PathBuf,
}

impl Paths {
    /// Layout rooted at an explicit base directory
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Self {
        Self {
            base_dir: base_dir.as_ref().to_path_buf(),
        }
    }

    /// Layout from `JUKRE_BASE_DIR`, falling back to the default location
    pub fn from_env() -> Self {
        let base = std::env::var(BASE_DIR_ENV).unwrap_or_else(|_| DEFAULT_BASE_DIR.to_string());
        Self::new(base)
    }

    /// Path of the persisted configuration document
    pub fn config_path(&self) -> PathBuf {
        self.base_dir.join("config.json")
    }

    /// Path of the active journal segment
    pub fn log_path(&self) -> PathBuf {
        self.base_dir.join("log.txt")
    }
}

/// Loads and bootstraps the persisted configuration
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    /// Store backed by the given config file path
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Load the configuration, healing a missing or unreadable file
    ///
    /// Never fails: a missing file is created with defaults (first-run
    /// bootstrap), and an unreadable or corrupt file is recorded as an
    /// `error` event in the journal and masked behind defaults. The
    /// scheduler loop must keep running on whatever configuration it can
    /// get.
    pub async fn load(&self, log: &EventLog) -> AgentConfig {
        match fs::read_to_string(&self.path).await {
            Ok(text) => match serde_json::from_str::<AgentConfig>(&text) {
                Ok(config) => config,
                Err(e) => {
                    self.record_error(log, e.to_string()).await;
                    AgentConfig::default()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let defaults = AgentConfig::default();
                if let Err(e) = self.save(&defaults).await {
                    self.record_error(log, e.to_string()).await;
                }
                defaults
            }
            Err(e) => {
                self.record_error(log, e.to_string()).await;
                AgentConfig::default()
            }
        }
    }

    /// Load the configuration without touching the journal
    ///
    /// Status invocations are strictly readers of the event log, so their
    /// config access must not journal failures. Anything unreadable
    /// reduces to defaults here too.
    pub async fn load_readonly(&self) -> AgentConfig {
        match fs::read_to_string(&self.path).await {
            Ok(text) => serde_json::from_str(&text).unwrap_or_default(),
            Err(_) => AgentConfig::default(),
        }
    }

    /// Persist the configuration as pretty-printed JSON
    pub async fn save(&self, config: &AgentConfig) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).await.map_err(|e| {
                    Error::config(format!(
                        "Failed to create config directory {}: {}",
                        parent.display(),
                        e
                    ))
                })?;
            }
        }

        let json = serde_json::to_string_pretty(config)?;
        fs::write(&self.path, json).await.map_err(|e| {
            Error::config(format!(
                "Failed to write config {}: {}",
                self.path.display(),
                e
            ))
        })?;
        Ok(())
    }

    async fn record_error(&self, log: &EventLog, error: String) {
        tracing::warn!("Config read failed, using defaults: {}", error);
        if let Err(e) = log.append(&EventRecord::error("read_config", error)).await {
            tracing::error!("Failed to journal config error: {}", e);
        }
    }
}
