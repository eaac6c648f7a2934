use crate::execution::{
    errors::PipelineDefinitionError,
    phase::{ConcurrencyMode, ConnectionPolicy, Phase},
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// An ordered sequence of phases. Phases run strictly one after another.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pipeline {
    name: String,
    phases: Vec<Phase>,
}

impl Pipeline {
    pub fn new(name: impl Into<String>, phases: Vec<Phase>) -> Self {
        Self {
            name: name.into(),
            phases,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn phases(&self) -> &[Phase] {
        &self.phases
    }

    pub fn statement_count(&self) -> usize {
        self.phases.iter().map(Phase::len).sum()
    }

    /// Appends the phases of `other` after this pipeline's own phases.
    pub fn then(mut self, other: Pipeline) -> Self {
        self.phases.extend(other.phases);
        self
    }

    pub fn renamed(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn validate(&self) -> Result<(), PipelineDefinitionError> {
        if self.phases.is_empty() {
            return Err(PipelineDefinitionError::NoPhases(self.name.clone()));
        }

        let mut seen = HashSet::new();
        for (idx, phase) in self.phases.iter().enumerate() {
            if phase.name().trim().is_empty() {
                return Err(PipelineDefinitionError::EmptyPhaseName(idx + 1));
            }

            if !seen.insert(phase.name()) {
                return Err(PipelineDefinitionError::DuplicatePhase(
                    phase.name().to_string(),
                ));
            }

            let shared_sequential = phase.mode() == ConcurrencyMode::Sequential
                && phase.connection_policy() == ConnectionPolicy::Shared;
            if phase.is_transactional() && !shared_sequential {
                return Err(
                    PipelineDefinitionError::TransactionalWithoutSharedConnection(
                        phase.name().to_string(),
                    ),
                );
            }
        }

        Ok(())
    }
}
