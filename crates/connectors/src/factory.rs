use crate::{
    error::ConfigError,
    sql::{
        base::{connection::WarehouseConnection, error::ConnectorError},
        postgres::{
            connection::PgConnection,
            utils::{connect_client, pg_config},
        },
    },
};
use async_trait::async_trait;
use model::execution::connection::ConnectionConfig;
use tracing::{debug, info};

/// Hands out independent warehouse sessions.
///
/// Every call to `open` yields a brand new connection; callers that run in
/// parallel each open their own, so the number of live sessions is bounded
/// by the number of concurrent callers.
#[async_trait]
pub trait ConnectionFactory: Send + Sync {
    async fn open(&self) -> Result<Box<dyn WarehouseConnection>, ConnectorError>;

    /// Where connections go, safe to log.
    fn endpoint(&self) -> String;

    /// Opens a session and runs a trivial statement on it.
    async fn ping(&self) -> Result<(), ConnectorError> {
        let mut conn = self.open().await?;
        conn.execute("SELECT 1")
            .await
            .map_err(|err| ConnectorError::Other(err.detail()))
    }
}

pub struct PgConnectionFactory {
    config: tokio_postgres::Config,
    endpoint: String,
}

impl PgConnectionFactory {
    /// Validates the connection record and prepares driver settings.
    /// Nothing touches the network until `open` is called.
    pub fn new(config: ConnectionConfig) -> Result<Self, ConfigError> {
        validate(&config)?;

        Ok(Self {
            endpoint: config.endpoint(),
            config: pg_config(&config),
        })
    }
}

#[async_trait]
impl ConnectionFactory for PgConnectionFactory {
    async fn open(&self) -> Result<Box<dyn WarehouseConnection>, ConnectorError> {
        debug!("Opening warehouse connection to {}", self.endpoint);
        let client = connect_client(&self.config).await?;
        Ok(Box::new(PgConnection::new(client)))
    }

    fn endpoint(&self) -> String {
        self.endpoint.clone()
    }

    async fn ping(&self) -> Result<(), ConnectorError> {
        info!("Pinging warehouse at '{}'", self.endpoint);
        let client = connect_client(&self.config).await?;

        let row = client.query_one("SELECT 1", &[]).await?;
        let val: i32 = row.get(0);
        if val != 1 {
            return Err(ConnectorError::Other(format!(
                "Ping to '{}' returned unexpected result: {val}",
                self.endpoint
            )));
        }

        info!("Warehouse ping to '{}' succeeded", self.endpoint);
        Ok(())
    }
}

fn validate(config: &ConnectionConfig) -> Result<(), ConfigError> {
    let required = [
        ("host", &config.host),
        ("database", &config.database),
        ("user", &config.user),
    ];
    for (name, value) in required {
        if value.trim().is_empty() {
            return Err(ConfigError::MissingProperty(name));
        }
    }

    if config.port == 0 {
        return Err(ConfigError::InvalidPort(config.port));
    }

    Ok(())
}
