use model::execution::errors::PipelineDefinitionError;
use thiserror::Error;

/// Top-level errors for a pipeline run.
///
/// Statement and connection failures are not errors at this level: they are
/// captured as failed results and surface through the run report.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The pipeline was rejected before any phase started.
    #[error("Invalid pipeline: {0}")]
    Definition(#[from] PipelineDefinitionError),

    /// A worker task could not be joined.
    /// This usually indicates that the runtime is shutting down.
    #[error("Task join error: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),

    #[error("Unexpected error: {0}")]
    Unexpected(String),
}
