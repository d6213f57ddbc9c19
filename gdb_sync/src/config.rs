//! Configuration handling for gdb_sync
//!
//! Every section is optional. A missing file section falls back to the
//! defaults below, and the CLI layer may override individual values.

use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::fs;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Environment variable consulted when no connection string is configured
pub const DATABASE_URI_ENV: &str = "DATABASE_URI";

/// Load configuration from a TOML file
pub fn load_from_file(path: &str) -> Result<Config> {
    let config_str = fs::read_to_string(path)
        .map_err(|e| Error::ConfigError(format!("Failed to read config file: {}", e)))?;

    let config: Config = toml::from_str(&config_str)
        .map_err(|e| Error::ConfigError(format!("Failed to parse config file: {}", e)))?;

    Ok(config)
}

/// Represents the complete gdb_sync configuration
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub database: DatabaseConfig,
    pub sync: SyncConfig,
    pub logging: LoggingConfig,
}

/// Database connection configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct DatabaseConfig {
    pub url: Option<String>,
    pub timeout_seconds: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            timeout_seconds: 30,
        }
    }
}

impl DatabaseConfig {
    /// The configured connection string, or `DATABASE_URI` from the environment
    pub fn resolve_url(&self) -> Option<String> {
        self.url
            .clone()
            .filter(|url| !url.trim().is_empty())
            .or_else(|| env::var(DATABASE_URI_ENV).ok().filter(|url| !url.trim().is_empty()))
    }
}

/// How records from the source schema reach the merged result
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum MergeStrategy {
    /// Snapshot the target into a fresh staging schema, then append source
    /// rows whose global identifier the snapshot lacks. Existing rows are
    /// never updated.
    #[default]
    Staged,
    /// Write source relations straight into the target schema, updating
    /// rows that share a global identifier.
    Upsert,
}

impl fmt::Display for MergeStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MergeStrategy::Staged => write!(f, "staged"),
            MergeStrategy::Upsert => write!(f, "upsert"),
        }
    }
}

impl FromStr for MergeStrategy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "staged" => Ok(MergeStrategy::Staged),
            "upsert" => Ok(MergeStrategy::Upsert),
            other => Err(Error::ConfigError(format!(
                "Unknown merge strategy: {} (expected `staged` or `upsert`)",
                other
            ))),
        }
    }
}

/// Synchronization behavior configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct SyncConfig {
    pub strategy: MergeStrategy,
    pub overwrite: bool,
    pub include_views: bool,
    pub staging_prefix: String,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            strategy: MergeStrategy::default(),
            overwrite: false,
            include_views: true,
            staging_prefix: "gdb_sync_temp".to_string(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub file: Option<String>,
    pub format: String,
    pub stdout: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: Some("gdb-sync.log".to_string()),
            format: "text".to_string(),
            stdout: false,
        }
    }
}
