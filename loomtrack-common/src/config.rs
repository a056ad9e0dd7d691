//! Configuration loading
//!
//! Each setting is resolved in priority order:
//! 1. Command-line argument / environment variable (passed in as overrides)
//! 2. TOML config file
//! 3. OS-dependent compiled default

use crate::{Error, Result};
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use tracing::info;

/// Default listen address
pub const DEFAULT_BIND: &str = "127.0.0.1:5000";

const APP_DIR: &str = "loomtrack";
const DB_FILE: &str = "loomtrack.db";

/// Resolved service configuration
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceConfig {
    pub database_path: PathBuf,
    pub bind: SocketAddr,
}

/// Values supplied on the command line or through the environment
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub config_file: Option<PathBuf>,
    pub database: Option<PathBuf>,
    pub bind: Option<String>,
}

/// Contents of `config.toml`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub database: Option<PathBuf>,
    pub bind: Option<String>,
}

impl FileConfig {
    /// Parse a config file; a missing file yields the empty config
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Invalid config file {}: {}", path.display(), e)))
    }
}

/// Resolve the service configuration from overrides, config file and defaults
pub fn resolve(overrides: &ConfigOverrides) -> Result<ServiceConfig> {
    let file = match overrides.config_file.clone().or_else(default_config_file) {
        Some(path) => {
            let file = FileConfig::load(&path)?;
            if path.exists() {
                info!("Loaded config file: {}", path.display());
            }
            file
        }
        None => FileConfig::default(),
    };

    let database_path = overrides
        .database
        .clone()
        .or(file.database)
        .unwrap_or_else(default_database_path);

    let bind_str = overrides
        .bind
        .clone()
        .or(file.bind)
        .unwrap_or_else(|| DEFAULT_BIND.to_string());
    let bind = bind_str
        .parse::<SocketAddr>()
        .map_err(|e| Error::Config(format!("Invalid bind address '{}': {}", bind_str, e)))?;

    Ok(ServiceConfig {
        database_path,
        bind,
    })
}

/// `<config_dir>/loomtrack/config.toml`
pub fn default_config_file() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(APP_DIR).join("config.toml"))
}

/// `<data_local_dir>/loomtrack/loomtrack.db`, falling back to the working directory
pub fn default_database_path() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join(APP_DIR).join(DB_FILE))
        .unwrap_or_else(|| PathBuf::from(DB_FILE))
}
