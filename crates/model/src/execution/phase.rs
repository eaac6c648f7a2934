use crate::execution::statement::StatementSpec;
use serde::{Deserialize, Serialize};
use std::fmt;

/// How the statements of a phase are scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConcurrencyMode {
    #[default]
    Sequential,
    Parallel,
}

impl fmt::Display for ConcurrencyMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConcurrencyMode::Sequential => f.write_str("sequential"),
            ConcurrencyMode::Parallel => f.write_str("parallel"),
        }
    }
}

/// Where a sequential phase gets its connections from.
///
/// Parallel phases always open one connection per statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionPolicy {
    /// One connection for the whole phase, statements run on it in order.
    #[default]
    Shared,
    /// A fresh connection per statement; each statement commits on its own.
    PerStatement,
}

/// What a phase does once one of its statements fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Stop at the first failed statement; the rest of the phase never runs.
    #[default]
    FailFast,
    /// Run everything, report every outcome, fail the phase if anything failed.
    CollectAll,
}

/// A named step of a pipeline with a fixed concurrency mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Phase {
    name: String,
    #[serde(default)]
    mode: ConcurrencyMode,
    #[serde(default)]
    connection: ConnectionPolicy,
    #[serde(default)]
    transactional: bool,
    #[serde(default)]
    on_failure: FailurePolicy,
    statements: Vec<StatementSpec>,
}

impl Phase {
    pub fn sequential(name: impl Into<String>, statements: Vec<StatementSpec>) -> Self {
        Self {
            name: name.into(),
            mode: ConcurrencyMode::Sequential,
            connection: ConnectionPolicy::Shared,
            transactional: false,
            on_failure: FailurePolicy::FailFast,
            statements,
        }
    }

    pub fn parallel(name: impl Into<String>, statements: Vec<StatementSpec>) -> Self {
        Self {
            name: name.into(),
            mode: ConcurrencyMode::Parallel,
            connection: ConnectionPolicy::PerStatement,
            transactional: false,
            on_failure: FailurePolicy::CollectAll,
            statements,
        }
    }

    pub fn with_connection(mut self, policy: ConnectionPolicy) -> Self {
        self.connection = policy;
        self
    }

    /// Wrap the phase in a single transaction. Only meaningful for a
    /// sequential phase on a shared connection.
    pub fn transactional(mut self) -> Self {
        self.transactional = true;
        self
    }

    pub fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.on_failure = policy;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn mode(&self) -> ConcurrencyMode {
        self.mode
    }

    pub fn connection_policy(&self) -> ConnectionPolicy {
        match self.mode {
            ConcurrencyMode::Sequential => self.connection,
            ConcurrencyMode::Parallel => ConnectionPolicy::PerStatement,
        }
    }

    pub fn is_transactional(&self) -> bool {
        self.transactional
    }

    /// Parallel phases never abort siblings, so they always collect.
    pub fn failure_policy(&self) -> FailurePolicy {
        match self.mode {
            ConcurrencyMode::Sequential => self.on_failure,
            ConcurrencyMode::Parallel => FailurePolicy::CollectAll,
        }
    }

    pub fn statements(&self) -> &[StatementSpec] {
        &self.statements
    }

    pub fn len(&self) -> usize {
        self.statements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parallel_phase_always_collects() {
        let phase = Phase::parallel("load staging", vec![StatementSpec::new("SELECT 1")])
            .with_failure_policy(FailurePolicy::FailFast);

        assert_eq!(phase.failure_policy(), FailurePolicy::CollectAll);
        assert_eq!(phase.connection_policy(), ConnectionPolicy::PerStatement);
    }

    #[test]
    fn test_sequential_defaults() {
        let phase = Phase::sequential("create tables", vec![]);

        assert_eq!(phase.mode(), ConcurrencyMode::Sequential);
        assert_eq!(phase.failure_policy(), FailurePolicy::FailFast);
        assert_eq!(phase.connection_policy(), ConnectionPolicy::Shared);
        assert!(!phase.is_transactional());
        assert!(phase.is_empty());
    }

    #[test]
    fn test_deserialize_with_defaults() {
        let phase: Phase = serde_json::from_str(
            r#"{
                "name": "populate facts",
                "connection": "per_statement",
                "statements": [{ "sql": "SELECT 1", "label": "one" }]
            }"#,
        )
        .unwrap();

        assert_eq!(phase.mode(), ConcurrencyMode::Sequential);
        assert_eq!(phase.connection_policy(), ConnectionPolicy::PerStatement);
        assert_eq!(phase.statements()[0].label(), Some("one"));
    }
}
