//! Configuration loading.
//!
//! Resolves the config path, creates the default file on first run, parses
//! the TOML and validates the result.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use super::builder::create_default_config;
use super::validation::validate_config;
use super::Config;
use crate::common::constants::{CONFIG_DIR_NAME, CONFIG_FILE_NAME};

/// Path of the configuration file: `custom` when given, otherwise
/// `$XDG_CONFIG_HOME/hueflux/hueflux.toml`.
pub fn get_config_path(custom: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = custom {
        return Ok(path.to_path_buf());
    }

    let config_dir = dirs::config_dir().context("Could not determine config directory")?;
    Ok(config_dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
}

/// Load configuration from `custom` or the default location.
///
/// A missing default file is created with documented defaults. A missing
/// custom file is an error.
pub fn load(custom: Option<&Path>) -> Result<Config> {
    let config_path = get_config_path(custom)?;

    if custom.is_none() && !config_path.exists() {
        create_default_config(&config_path)
            .context("Failed to create default config during load")?;
        log_block_start!("Created default configuration");
        log_indented!("{}", config_path.display());
    }

    load_from_path(&config_path)
}

/// Load and validate configuration from `path` without creating it.
pub fn load_from_path(path: &Path) -> Result<Config> {
    if !path.exists() {
        anyhow::bail!("Configuration file not found at {}", path.display());
    }

    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config from {}", path.display()))?;

    let config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config from {}", path.display()))?;

    validate_config(&config)
        .with_context(|| format!("Invalid configuration in {}", path.display()))?;

    Ok(config)
}
