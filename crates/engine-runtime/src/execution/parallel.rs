use crate::{error::PipelineError, execution::runner};
use chrono::Utc;
use connectors::factory::ConnectionFactory;
use futures::FutureExt;
use model::execution::{
    result::{ExecutionResult, StatementFailure},
    statement::StatementSpec,
};
use std::{panic::AssertUnwindSafe, sync::Arc, time::Instant};
use tokio::{sync::Semaphore, task::JoinSet};
use tracing::{debug, error, info};

pub const DEFAULT_MAX_WORKERS: usize = 4;

/// Runs mutually independent statements on a pool of at most `max_workers`
/// tasks, each on its own connection.
///
/// Waits for every statement and returns exactly one result per input, in
/// completion order. A failed statement never stops its siblings, and a
/// worker that panics is reported as a failed result for its statement.
/// `max_workers` of 0 is treated as 1.
pub async fn run(
    factory: Arc<dyn ConnectionFactory>,
    statements: &[StatementSpec],
    max_workers: usize,
) -> Result<Vec<ExecutionResult>, PipelineError> {
    let max_workers = max_workers.max(1);
    if statements.is_empty() {
        return Ok(Vec::new());
    }

    info!(
        "Launching {} statement(s) on up to {} worker(s)",
        statements.len(),
        max_workers
    );

    let semaphore = Arc::new(Semaphore::new(max_workers));
    let mut join_set = JoinSet::new();
    let mut results = Vec::with_capacity(statements.len());

    for spec in statements.iter().cloned() {
        let permit = Arc::clone(&semaphore)
            .acquire_owned()
            .await
            .map_err(|err| PipelineError::Unexpected(format!("worker pool closed: {err}")))?;

        let factory = Arc::clone(&factory);
        join_set.spawn(async move {
            let _permit = permit;
            run_guarded(factory.as_ref(), &spec).await
        });

        // Collect what already finished so results stay in completion order
        // even while later statements wait for a permit.
        while let Some(joined) = join_set.try_join_next() {
            results.push(joined?);
        }
    }

    while let Some(joined) = join_set.join_next().await {
        results.push(joined?);
    }

    debug!("All {} worker(s) finished", results.len());
    Ok(results)
}

async fn run_guarded(factory: &dyn ConnectionFactory, spec: &StatementSpec) -> ExecutionResult {
    let started_at = Utc::now();
    let start = Instant::now();

    match AssertUnwindSafe(runner::execute_isolated(factory, spec))
        .catch_unwind()
        .await
    {
        Ok(result) => result,
        Err(panic) => {
            let reason = panic_message(panic.as_ref());
            error!("Worker panicked on {}: {}", spec.display_name(), reason);
            ExecutionResult::failed(
                spec,
                started_at,
                start.elapsed(),
                StatementFailure::statement(format!("worker panicked: {reason}")),
            )
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}
