//! Configuration: INI file, addressable keys and provider credentials.
//!
//! Credentials are resolved from the environment first
//! (`LOCATIONIQ_ACCESS_TOKEN`, `MAPBOX_ACCESS_TOKEN`), then from the
//! `[providers]` section of the config file.

mod credentials;
mod file;
mod keys;

use std::path::PathBuf;

use thiserror::Error;

pub use credentials::ProviderCredentials;
pub use file::{
    config_file_path, CacheSettings, ConfigFile, HttpSettings, PacingSettings, ProvidersSettings,
};
pub use keys::ConfigKey;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {}: {reason}", .path.display())]
    Read { path: PathBuf, reason: String },

    #[error("Failed to write config file {}: {reason}", .path.display())]
    Write { path: PathBuf, reason: String },

    #[error("Unknown configuration key '{0}'")]
    UnknownKey(String),

    #[error("Invalid value '{value}' for {key}: {reason}")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },
}
