use crate::sql::base::error::ConnectorError;
use model::execution::connection::{ConnectionConfig, SslMode};
use native_tls::TlsConnector;
use postgres_native_tls::MakeTlsConnector;
use tokio_postgres::{Client, Config, NoTls, config::SslMode as PgSslMode};
use tracing::{error, warn};

pub const APPLICATION_NAME: &str = "starload";

/// Translates the caller's connection record into driver settings.
pub fn pg_config(config: &ConnectionConfig) -> Config {
    let mut pg = Config::new();
    pg.host(&config.host)
        .port(config.port)
        .dbname(&config.database)
        .user(&config.user)
        .password(config.password.as_bytes())
        .application_name(APPLICATION_NAME)
        .ssl_mode(match config.ssl_mode {
            SslMode::Disable => PgSslMode::Disable,
            SslMode::Prefer => PgSslMode::Prefer,
            SslMode::Require => PgSslMode::Require,
        });
    pg
}

pub async fn connect_client(config: &Config) -> Result<Client, ConnectorError> {
    match config.get_ssl_mode() {
        PgSslMode::Disable => connect_without_tls(config).await,
        PgSslMode::Prefer => match connect_with_tls(config).await {
            Ok(client) => Ok(client),
            Err(error) => {
                warn!(%error, "Warehouse TLS handshake failed, retrying without TLS");
                connect_without_tls(config).await
            }
        },
        _ => connect_with_tls(config).await,
    }
}

pub(crate) async fn connect_with_tls(config: &Config) -> Result<Client, ConnectorError> {
    let connector = TlsConnector::builder().build()?;
    let tls = MakeTlsConnector::new(connector);
    let (client, connection) = config.connect(tls).await?;
    tokio::spawn(async move {
        if let Err(err) = connection.await {
            error!(%err, "Warehouse connection error");
        }
    });
    Ok(client)
}

pub(crate) async fn connect_without_tls(config: &Config) -> Result<Client, ConnectorError> {
    let (client, connection) = config.connect(NoTls).await?;
    tokio::spawn(async move {
        if let Err(err) = connection.await {
            error!(%err, "Warehouse connection error");
        }
    });
    Ok(client)
}
