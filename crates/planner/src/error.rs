use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PlanError {
    /// A pipeline that bulk-loads staging tables was requested, but no
    /// storage locations or load role were provided.
    #[error("bulk-load sources and an IAM role are required to build the '{0}' pipeline")]
    MissingBulkLoad(String),

    #[error("unknown pipeline kind: {0}")]
    UnknownKind(String),
}
