//! Application configuration handling.

use std::{fs, path::PathBuf};

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::Deserialize;

/// Directory name used under the platform config and data roots.
pub const APP_DIR: &str = "realty";

/// Settings for the catalog application.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Directory holding the listings and accounts stores.
    pub data_dir: PathBuf,
}

impl AppConfig {
    /// Load configuration from the default config file location,
    /// layered as defaults, then the file (optional), then `REALTY_*`
    /// environment overrides.
    pub fn load() -> Result<Self> {
        Self::load_from(config_file_path())
    }

    /// Load configuration with an explicit config file path.
    pub fn load_from(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let settings = Config::builder()
            .set_default(
                "data_dir",
                default_data_dir().to_string_lossy().into_owned(),
            )?
            .add_source(File::from(path.clone()).required(false))
            .add_source(Environment::with_prefix("REALTY"))
            .build()
            .with_context(|| format!("failed to read config from {}", path.display()))?;
        settings
            .try_deserialize()
            .context("failed to deserialize configuration")
    }
}

/// Default location of the config file under the user config directory.
pub fn config_file_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
        .join("config.toml")
}

/// Default data directory under the platform data root.
pub fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
}

/// Write a commented default config file if none exists yet.
pub fn ensure_default_config() -> Result<()> {
    let path = config_file_path();
    if path.exists() {
        return Ok(());
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let contents = format!(
        "# Realty catalog configuration.\n\
         # data_dir holds listings.json and accounts.json.\n\
         data_dir = {:?}\n",
        default_data_dir().to_string_lossy()
    );
    fs::write(&path, contents).with_context(|| format!("failed to write {}", path.display()))
}
