use crate::sql::base::error::DbError;
use async_trait::async_trait;

/// A live warehouse session.
///
/// Sessions run in autocommit mode: every call to `execute` commits on its
/// own unless the caller opened an explicit transaction with `begin`.
/// A session is owned by exactly one task and is never shared.
#[async_trait]
pub trait WarehouseConnection: Send {
    /// Runs the statement text verbatim and waits for the warehouse to
    /// acknowledge it.
    async fn execute(&mut self, sql: &str) -> Result<(), DbError>;

    async fn begin(&mut self) -> Result<(), DbError> {
        self.execute("BEGIN").await
    }

    async fn commit(&mut self) -> Result<(), DbError> {
        self.execute("COMMIT").await
    }

    async fn rollback(&mut self) -> Result<(), DbError> {
        self.execute("ROLLBACK").await
    }
}
