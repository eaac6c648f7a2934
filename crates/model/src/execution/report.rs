use crate::{
    core::identifiers::RunId,
    execution::{phase::ConcurrencyMode, result::ExecutionResult},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhaseStatus {
    Completed,
    Failed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhaseReport {
    pub name: String,
    pub mode: ConcurrencyMode,
    pub status: PhaseStatus,
    #[serde(rename = "elapsed_ms", with = "crate::core::duration")]
    pub elapsed: Duration,
    pub results: Vec<ExecutionResult>,
}

impl PhaseReport {
    /// A phase is failed as soon as any of its results is failed.
    pub fn new(
        name: impl Into<String>,
        mode: ConcurrencyMode,
        elapsed: Duration,
        results: Vec<ExecutionResult>,
    ) -> Self {
        let status = if results.iter().any(ExecutionResult::is_failed) {
            PhaseStatus::Failed
        } else {
            PhaseStatus::Completed
        };

        Self {
            name: name.into(),
            mode,
            status,
            elapsed,
            results,
        }
    }

    pub fn is_failed(&self) -> bool {
        self.status == PhaseStatus::Failed
    }

    pub fn failures(&self) -> impl Iterator<Item = &ExecutionResult> {
        self.results.iter().filter(|r| r.is_failed())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PipelineOutcome {
    Completed,
    Failed { phase: String },
    Cancelled { before_phase: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineReport {
    pub run_id: RunId,
    pub pipeline: String,
    pub fingerprint: String,
    pub started_at: DateTime<Utc>,
    #[serde(rename = "elapsed_ms", with = "crate::core::duration")]
    pub elapsed: Duration,
    pub phases: Vec<PhaseReport>,
    pub outcome: PipelineOutcome,
}

impl PipelineReport {
    pub fn is_success(&self) -> bool {
        self.outcome == PipelineOutcome::Completed
    }

    pub fn results(&self) -> impl Iterator<Item = &ExecutionResult> {
        self.phases.iter().flat_map(|p| p.results.iter())
    }

    pub fn failed_results(&self) -> impl Iterator<Item = &ExecutionResult> {
        self.results().filter(|r| r.is_failed())
    }

    pub fn phase(&self, name: &str) -> Option<&PhaseReport> {
        self.phases.iter().find(|p| p.name == name)
    }
}
