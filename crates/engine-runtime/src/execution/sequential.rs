use crate::execution::runner;
use chrono::Utc;
use connectors::{factory::ConnectionFactory, sql::base::connection::WarehouseConnection};
use model::execution::{
    phase::{ConnectionPolicy, FailurePolicy, Phase},
    result::{ExecutionResult, FailureKind, StatementFailure},
    statement::StatementSpec,
};
use std::time::Instant;
use tracing::{debug, error, warn};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SequentialOptions {
    pub connection: ConnectionPolicy,
    /// Wrap the run in BEGIN/COMMIT. Only honoured on a shared connection.
    pub transactional: bool,
    pub on_failure: FailurePolicy,
}

impl From<&Phase> for SequentialOptions {
    fn from(phase: &Phase) -> Self {
        Self {
            connection: phase.connection_policy(),
            transactional: phase.is_transactional(),
            on_failure: phase.failure_policy(),
        }
    }
}

/// Runs `statements` one at a time in the given order. Statement `i + 1`
/// starts only once the result of statement `i` exists.
///
/// The returned results are in program order. With `FailFast` the list
/// stops at the first failure; with `CollectAll` every statement runs
/// unless a connection cannot be obtained or is lost, which always ends
/// the run.
pub async fn run(
    factory: &dyn ConnectionFactory,
    statements: &[StatementSpec],
    options: SequentialOptions,
) -> Vec<ExecutionResult> {
    if statements.is_empty() {
        return Vec::new();
    }

    match options.connection {
        ConnectionPolicy::Shared => run_shared(factory, statements, options).await,
        ConnectionPolicy::PerStatement => run_per_statement(factory, statements, options).await,
    }
}

async fn run_shared(
    factory: &dyn ConnectionFactory,
    statements: &[StatementSpec],
    options: SequentialOptions,
) -> Vec<ExecutionResult> {
    let mut results = Vec::with_capacity(statements.len());
    let first = &statements[0];

    let started_at = Utc::now();
    let start = Instant::now();
    let mut conn = match factory.open().await {
        Ok(conn) => conn,
        Err(err) => {
            results.push(runner::connection_failed(first, started_at, start, &err.to_string()));
            return results;
        }
    };

    if options.transactional {
        debug!("Opening transaction for {} statement(s)", statements.len());
        if let Err(err) = conn.begin().await {
            let reason = format!("could not start transaction: {}", err.detail());
            results.push(runner::connection_failed(first, started_at, start, &reason));
            return results;
        }
    }

    for spec in statements {
        let result = runner::execute(conn.as_mut(), spec).await;
        let failure = result.error().map(|err| err.kind);
        results.push(result);

        match failure {
            None => continue,
            // Nothing more can run on a dead session, not even a rollback.
            Some(FailureKind::Connection) => return results,
            Some(FailureKind::Statement) => {}
        }

        // An aborted transaction rejects everything after the failure, so a
        // transactional run always stops here.
        if options.transactional {
            rollback(conn.as_mut()).await;
            return results;
        }
        if options.on_failure == FailurePolicy::FailFast {
            return results;
        }
    }

    if options.transactional {
        if let Some(failure) = commit(conn.as_mut()).await {
            results.push(failure);
        }
    }

    results
}

async fn run_per_statement(
    factory: &dyn ConnectionFactory,
    statements: &[StatementSpec],
    options: SequentialOptions,
) -> Vec<ExecutionResult> {
    let mut results = Vec::with_capacity(statements.len());

    for spec in statements {
        let result = runner::execute_isolated(factory, spec).await;
        let stop = match result.error() {
            None => false,
            Some(err) if err.kind == FailureKind::Connection => true,
            Some(_) => options.on_failure == FailurePolicy::FailFast,
        };
        results.push(result);

        if stop {
            break;
        }
    }

    results
}

async fn rollback(conn: &mut dyn WarehouseConnection) {
    match conn.rollback().await {
        Ok(()) => warn!("Transaction rolled back"),
        Err(err) => error!("Rollback failed: {}", err.detail()),
    }
}

/// A failed commit undoes every statement of the run, so it is reported
/// as a failed result of its own.
async fn commit(conn: &mut dyn WarehouseConnection) -> Option<ExecutionResult> {
    let spec = StatementSpec::labeled("commit", "COMMIT");
    let started_at = Utc::now();
    let start = Instant::now();

    match conn.commit().await {
        Ok(()) => {
            debug!("Transaction committed");
            None
        }
        Err(err) => {
            let detail = err.detail();
            error!("Commit failed: {}", detail);
            Some(ExecutionResult::failed(
                &spec,
                started_at,
                start.elapsed(),
                StatementFailure::statement(detail),
            ))
        }
    }
}
