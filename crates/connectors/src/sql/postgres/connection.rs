use crate::sql::base::{connection::WarehouseConnection, error::DbError};
use async_trait::async_trait;
use tokio_postgres::Client;

/// A warehouse session over the Postgres wire protocol (Redshift, Postgres).
pub struct PgConnection {
    client: Client,
}

impl PgConnection {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl WarehouseConnection for PgConnection {
    async fn execute(&mut self, sql: &str) -> Result<(), DbError> {
        if self.client.is_closed() {
            return Err(DbError::Closed("session was closed by the server".into()));
        }

        // Simple query protocol: the text goes to the server untouched.
        self.client.batch_execute(sql).await?;
        Ok(())
    }
}
