use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while reading or validating the loader configuration.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// The configuration or env file could not be read.
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file extension doesn't map to a known format.
    #[error("Unsupported configuration format: {0} (expected .json, .yaml or .yml)")]
    UnsupportedFormat(String),

    #[error("Invalid JSON configuration: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid YAML configuration: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A `${NAME}` reference points at a variable that is not set.
    #[error("Environment variable '{0}' referenced in configuration is not set")]
    UnsetVariable(String),

    /// A `${` without a matching `}`.
    #[error("Unterminated variable reference in value: {0}")]
    UnterminatedVariable(String),

    #[error("Invalid env file: {0}")]
    EnvFile(String),

    #[error("Invalid value for '{field}': {reason}")]
    InvalidValue { field: &'static str, reason: String },
}
