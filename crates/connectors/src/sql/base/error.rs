use crate::error::ConfigError;
use thiserror::Error;

/// Errors coming back from the warehouse while running a statement.
#[derive(Debug, Error)]
pub enum DbError {
    /// Any SQL driver error.
    #[error("SQL error: {0}")]
    Sql(#[from] tokio_postgres::Error),

    /// The session ended before the statement could be sent.
    #[error("Connection closed: {0}")]
    Closed(String),

    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl DbError {
    /// The most specific message available: the server's own error text
    /// when the warehouse rejected the statement, the driver error otherwise.
    pub fn detail(&self) -> String {
        match self {
            DbError::Sql(err) => match err.as_db_error() {
                Some(db) => format!("{}: {}", db.code().code(), db.message()),
                None => err.to_string(),
            },
            DbError::Closed(msg) | DbError::Unknown(msg) => msg.clone(),
        }
    }

    /// True when the session itself is gone, so nothing else can run on it.
    pub fn is_connection_lost(&self) -> bool {
        match self {
            DbError::Sql(err) => err.is_closed(),
            DbError::Closed(_) => true,
            DbError::Unknown(_) => false,
        }
    }
}

/// Errors happening while establishing a connection.
#[derive(Debug, Error)]
pub enum ConnectorError {
    /// The driver failed to open the session.
    #[error("Postgres connection failed: {0}")]
    Postgres(#[from] tokio_postgres::Error),

    /// The connection record was rejected before any network access.
    #[error("Invalid connection configuration: {0}")]
    Config(#[from] ConfigError),

    /// The TLS connector could not be built.
    #[error("TLS setup failed: {0}")]
    Tls(#[from] native_tls::Error),

    #[error("Connection error: {0}")]
    Other(String),
}
