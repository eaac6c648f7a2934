use thiserror::Error;

/// Structural problems in a pipeline definition, caught before anything runs.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PipelineDefinitionError {
    #[error("pipeline '{0}' has no phases")]
    NoPhases(String),

    #[error("phase #{0} has an empty name")]
    EmptyPhaseName(usize),

    #[error("phase '{0}' is declared more than once")]
    DuplicatePhase(String),

    #[error("phase '{0}' is transactional but does not run on a shared sequential connection")]
    TransactionalWithoutSharedConnection(String),
}
