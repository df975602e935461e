//! Panel settings loading from disk.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::PanelSettings;
use crate::config::validation::{join_errors, validate_settings, ValidationError};

/// Error type for settings loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read settings: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse settings: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid settings: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

/// Load and validate panel settings from a TOML file.
pub fn load_settings(path: &Path) -> Result<PanelSettings, ConfigError> {
    let content = fs::read_to_string(path)?;
    let settings: PanelSettings = toml::from_str(&content)?;

    validate_settings(&settings).map_err(ConfigError::Validation)?;

    Ok(settings)
}
