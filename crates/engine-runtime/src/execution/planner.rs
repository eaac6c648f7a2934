use crate::{
    error::PipelineError,
    execution::{
        parallel::{self, DEFAULT_MAX_WORKERS},
        sequential::{self, SequentialOptions},
    },
    metrics::Metrics,
};
use chrono::Utc;
use connectors::factory::ConnectionFactory;
use model::{
    core::identifiers::RunId,
    execution::{
        phase::{ConcurrencyMode, Phase},
        pipeline::Pipeline,
        report::{PhaseReport, PipelineOutcome, PipelineReport},
    },
};
use std::{sync::Arc, time::Instant};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Upper bound on concurrent statements (and connections) in a
    /// parallel phase.
    pub max_workers: usize,
    /// Checked before every phase. Statements already running are never
    /// interrupted.
    pub cancel: CancellationToken,
    pub metrics: Metrics,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            max_workers: DEFAULT_MAX_WORKERS,
            cancel: CancellationToken::new(),
            metrics: Metrics::new(),
        }
    }
}

/// Runs the phases of `pipeline` strictly in order and stops after the
/// first phase that has a failed result.
pub async fn run(
    pipeline: &Pipeline,
    factory: Arc<dyn ConnectionFactory>,
    options: RunOptions,
) -> Result<PipelineReport, PipelineError> {
    PipelinePlanner::new(pipeline, factory, options)?
        .execute()
        .await
}

struct PipelinePlanner<'a> {
    pipeline: &'a Pipeline,
    factory: Arc<dyn ConnectionFactory>,
    options: RunOptions,
    run_id: RunId,
    fingerprint: String,
}

impl<'a> PipelinePlanner<'a> {
    fn new(
        pipeline: &'a Pipeline,
        factory: Arc<dyn ConnectionFactory>,
        options: RunOptions,
    ) -> Result<Self, PipelineError> {
        pipeline.validate()?;

        Ok(Self {
            pipeline,
            factory,
            options,
            run_id: RunId::new(uuid::Uuid::new_v4().to_string()),
            fingerprint: ::planner::plan::fingerprint(pipeline),
        })
    }

    async fn execute(self) -> Result<PipelineReport, PipelineError> {
        let started_at = Utc::now();
        let start = Instant::now();

        info!("Running pipeline '{}'", self.pipeline.name());
        info!(
            "Run ID: {} (fingerprint {}, target {})",
            self.run_id,
            self.fingerprint,
            self.factory.endpoint()
        );

        let mut phases = Vec::with_capacity(self.pipeline.phases().len());
        let mut outcome = PipelineOutcome::Completed;
        let total = self.pipeline.phases().len();

        for (idx, phase) in self.pipeline.phases().iter().enumerate() {
            // Check if shutdown was requested before starting the next phase
            if self.options.cancel.is_cancelled() {
                warn!(
                    "Shutdown requested before phase {}/{}: {}",
                    idx + 1,
                    total,
                    phase.name()
                );
                outcome = PipelineOutcome::Cancelled {
                    before_phase: phase.name().to_string(),
                };
                break;
            }

            info!(
                "Starting phase {}/{}: {} ({}, {} statement(s))",
                idx + 1,
                total,
                phase.name(),
                phase.mode(),
                phase.len()
            );

            let report = self.run_phase(phase).await?;
            self.options.metrics.record_phase(report.is_failed());

            if report.is_failed() {
                error!(
                    "Phase '{}' failed ({} of {} statement(s) failed), halting pipeline",
                    phase.name(),
                    report.failures().count(),
                    report.results.len()
                );
                outcome = PipelineOutcome::Failed {
                    phase: phase.name().to_string(),
                };
                phases.push(report);
                break;
            }

            info!(
                "Phase '{}' completed in {:.2}s",
                phase.name(),
                report.elapsed.as_secs_f64()
            );
            phases.push(report);
        }

        let elapsed = start.elapsed();
        let snapshot = self.options.metrics.snapshot();
        info!(
            "Pipeline '{}' finished in {:.2}s: {:?} ({} ok, {} failed)",
            self.pipeline.name(),
            elapsed.as_secs_f64(),
            outcome,
            snapshot.statements_ok,
            snapshot.statements_failed
        );

        Ok(PipelineReport {
            run_id: self.run_id,
            pipeline: self.pipeline.name().to_string(),
            fingerprint: self.fingerprint,
            started_at,
            elapsed,
            phases,
            outcome,
        })
    }

    async fn run_phase(&self, phase: &Phase) -> Result<PhaseReport, PipelineError> {
        let start = Instant::now();

        let results = match phase.mode() {
            ConcurrencyMode::Sequential => {
                sequential::run(
                    self.factory.as_ref(),
                    phase.statements(),
                    SequentialOptions::from(phase),
                )
                .await
            }
            ConcurrencyMode::Parallel => {
                parallel::run(
                    Arc::clone(&self.factory),
                    phase.statements(),
                    self.options.max_workers,
                )
                .await?
            }
        };

        for result in &results {
            self.options.metrics.record_result(result);
        }

        Ok(PhaseReport::new(
            phase.name(),
            phase.mode(),
            start.elapsed(),
            results,
        ))
    }
}
