//! Runs one statement and turns whatever happens into an `ExecutionResult`.
//!
//! Nothing here retries. A retry or deadline policy would wrap `execute`.

use chrono::Utc;
use connectors::{factory::ConnectionFactory, sql::base::connection::WarehouseConnection};
use model::execution::{
    result::{ExecutionResult, StatementFailure},
    statement::StatementSpec,
};
use std::time::Instant;
use tracing::{error, info};

/// Sends the statement text on `conn` and waits for it to complete.
/// Driver errors are captured in the result and never returned.
pub async fn execute(conn: &mut dyn WarehouseConnection, spec: &StatementSpec) -> ExecutionResult {
    let started_at = Utc::now();
    let start = Instant::now();

    match conn.execute(spec.sql()).await {
        Ok(()) => {
            let elapsed = start.elapsed();
            info!(
                "Completed: {} ({:.2}s)",
                spec.display_name(),
                elapsed.as_secs_f64()
            );
            ExecutionResult::ok(spec, started_at, elapsed)
        }
        Err(err) => {
            let elapsed = start.elapsed();
            let detail = err.detail();
            error!("Failed: {}: {}", spec.display_name(), detail);
            let failure = if err.is_connection_lost() {
                StatementFailure::connection(detail)
            } else {
                StatementFailure::statement(detail)
            };
            ExecutionResult::failed(spec, started_at, elapsed, failure)
        }
    }
}

/// Opens a fresh connection just for `spec`, runs it and drops the
/// connection. The statement commits on its own.
pub async fn execute_isolated(factory: &dyn ConnectionFactory, spec: &StatementSpec) -> ExecutionResult {
    let started_at = Utc::now();
    let start = Instant::now();

    match factory.open().await {
        Ok(mut conn) => execute(conn.as_mut(), spec).await,
        Err(err) => connection_failed(spec, started_at, start, &err.to_string()),
    }
}

/// Result for a statement that never reached the warehouse.
pub(crate) fn connection_failed(
    spec: &StatementSpec,
    started_at: chrono::DateTime<Utc>,
    start: Instant,
    reason: &str,
) -> ExecutionResult {
    error!(
        "Failed: {}: could not obtain a connection: {}",
        spec.display_name(),
        reason
    );
    ExecutionResult::failed(
        spec,
        started_at,
        start.elapsed(),
        StatementFailure::connection(reason),
    )
}
