//! Configuration errors

use std::path::PathBuf;

use thiserror::Error;

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors raised while loading or validating a [`SessionConfig`](crate::SessionConfig)
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The configuration file is not valid JSON for a session config
    #[error("failed to parse session config: {0}")]
    Parse(#[from] serde_json::Error),

    /// An environment override could not be parsed
    #[error("invalid value for {key}: {value:?}")]
    InvalidOverride { key: &'static str, value: String },

    /// A field failed validation
    #[error("invalid session config: {field} {reason}")]
    Invalid {
        field: &'static str,
        reason: &'static str,
    },
}
