use thiserror::Error;

/// The connection parameters cannot describe a usable session.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A required property was missing or blank.
    #[error("Missing required connection property: {0}")]
    MissingProperty(&'static str),

    /// The port is outside the usable range.
    #[error("Invalid port: {0}")]
    InvalidPort(u16),
}
