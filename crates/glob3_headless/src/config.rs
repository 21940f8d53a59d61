//! Loading the core configuration from RON.

use std::path::Path;

use glob3_core::config::CoreConfig;
use glob3_core::error::GameError;
use thiserror::Error;

/// Error type for configuration loading.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// File not found.
    #[error("Config file not found: {0}")]
    FileNotFound(String),
    /// Failed to read file.
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),
    /// Failed to parse RON.
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] ron::error::SpannedError),
    /// Parsed, but the core rejected the values.
    #[error(transparent)]
    Invalid(#[from] GameError),
}

/// Load and validate a configuration file.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<CoreConfig, ConfigError> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(ConfigError::FileNotFound(path.display().to_string()));
    }
    let contents = std::fs::read_to_string(path)?;
    let config = config_from_ron_str(&contents)?;
    tracing::debug!(path = %path.display(), "Loaded config");
    Ok(config)
}

/// Parse and validate a configuration from a RON string.
///
/// Missing fields take their defaults.
pub fn config_from_ron_str(ron: &str) -> Result<CoreConfig, ConfigError> {
    let config: CoreConfig = ron::from_str(ron)?;
    config.validate()?;
    Ok(config)
}
