use crate::execution::statement::StatementSpec;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt, time::Duration};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionStatus {
    Ok,
    Failed,
}

/// Which side of the boundary a statement failed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// The warehouse rejected the statement.
    Statement,
    /// No connection could be obtained, or the session was lost while the
    /// statement ran.
    Connection,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatementFailure {
    pub kind: FailureKind,
    pub message: String,
}

impl StatementFailure {
    pub fn statement(message: impl Into<String>) -> Self {
        Self {
            kind: FailureKind::Statement,
            message: message.into(),
        }
    }

    pub fn connection(message: impl Into<String>) -> Self {
        Self {
            kind: FailureKind::Connection,
            message: message.into(),
        }
    }
}

impl fmt::Display for StatementFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            FailureKind::Statement => write!(f, "{}", self.message),
            FailureKind::Connection => write!(f, "connection failed: {}", self.message),
        }
    }
}

/// Outcome of running one statement. Created once, never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionResult {
    status: ExecutionStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    label: Option<String>,
    statement: String,
    sql: String,
    started_at: DateTime<Utc>,
    #[serde(rename = "elapsed_ms", with = "crate::core::duration")]
    elapsed: Duration,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    error: Option<StatementFailure>,
}

impl ExecutionResult {
    pub fn ok(spec: &StatementSpec, started_at: DateTime<Utc>, elapsed: Duration) -> Self {
        Self::build(spec, ExecutionStatus::Ok, started_at, elapsed, None)
    }

    pub fn failed(
        spec: &StatementSpec,
        started_at: DateTime<Utc>,
        elapsed: Duration,
        failure: StatementFailure,
    ) -> Self {
        Self::build(
            spec,
            ExecutionStatus::Failed,
            started_at,
            elapsed,
            Some(failure),
        )
    }

    fn build(
        spec: &StatementSpec,
        status: ExecutionStatus,
        started_at: DateTime<Utc>,
        elapsed: Duration,
        error: Option<StatementFailure>,
    ) -> Self {
        Self {
            status,
            label: spec.label().map(str::to_string),
            statement: spec.display_name().into_owned(),
            sql: spec.sql().to_string(),
            started_at,
            elapsed,
            error,
        }
    }

    pub fn status(&self) -> ExecutionStatus {
        self.status
    }

    pub fn is_ok(&self) -> bool {
        self.status == ExecutionStatus::Ok
    }

    pub fn is_failed(&self) -> bool {
        self.status == ExecutionStatus::Failed
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// Display name of the statement this result belongs to.
    pub fn statement(&self) -> &str {
        &self.statement
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn error(&self) -> Option<&StatementFailure> {
        self.error.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_round_trips_into_result() {
        let spec = StatementSpec::labeled("populate users", "INSERT INTO users SELECT 1");
        let result = ExecutionResult::ok(&spec, Utc::now(), Duration::from_millis(12));

        assert!(result.is_ok());
        assert_eq!(result.label(), Some("populate users"));
        assert_eq!(result.statement(), "populate users");
        assert_eq!(result.sql(), spec.sql());
        assert!(result.error().is_none());
    }

    #[test]
    fn test_failed_result_keeps_error_detail() {
        let spec = StatementSpec::new("INSERT INTO nope SELECT 1");
        let result = ExecutionResult::failed(
            &spec,
            Utc::now(),
            Duration::ZERO,
            StatementFailure::statement("relation \"nope\" does not exist"),
        );

        assert!(result.is_failed());
        assert_eq!(result.label(), None);
        let error = result.error().unwrap();
        assert_eq!(error.kind, FailureKind::Statement);
        assert_eq!(error.to_string(), "relation \"nope\" does not exist");
    }

    #[test]
    fn test_serializes_elapsed_as_millis() {
        let spec = StatementSpec::labeled("one", "SELECT 1");
        let result = ExecutionResult::ok(&spec, Utc::now(), Duration::from_millis(1500));
        let json = serde_json::to_value(&result).unwrap();

        assert_eq!(json["elapsed_ms"], 1500);
        assert_eq!(json["status"], "ok");
        assert!(json.get("error").is_none());
    }
}
