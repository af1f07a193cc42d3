// src/config.rs

//! Configuration loading utilities.
//!
//! This module resolves which config file to read and validates the result
//! before any request is made.

use std::path::Path;

use crate::error::{AppError, Result};
use crate::models::Config;

/// Config file used when none is given.
pub const DEFAULT_CONFIG_PATH: &str = "config/config.toml";

/// Shipped defaults, read when the local config file is missing.
pub const FALLBACK_CONFIG_PATH: &str = "config/default.toml";

/// Load and validate configuration.
///
/// An explicit path must exist. Without one, `config/config.toml` is read,
/// falling back to `config/default.toml` under `base_path`.
pub fn load_config(base_path: &Path, explicit: Option<&Path>) -> Result<Config> {
    let config = match explicit {
        Some(path) => {
            if !path.is_file() {
                return Err(AppError::config(format!(
                    "Config file not found: {}",
                    path.display()
                )));
            }
            Config::load(path)?
        }
        None => Config::load_with_fallback(
            base_path.join(DEFAULT_CONFIG_PATH),
            base_path.join(FALLBACK_CONFIG_PATH),
        )?,
    };

    config
        .validate()
        .map_err(|e| AppError::config(format!("Invalid configuration: {e}")))?;

    log::debug!(
        "Configuration loaded: {} stations, window step {}h",
        config.stations().len(),
        config.dt_hours
    );
    Ok(config)
}
