//! Phase ordering and concurrency policy for the standard pipelines.

use crate::{catalog::StatementCatalog, error::PlanError};
use model::execution::{
    phase::{ConnectionPolicy, Phase},
    pipeline::Pipeline,
};
use std::{fmt, str::FromStr};

pub const PHASE_DROP_TABLES: &str = "drop tables";
pub const PHASE_CREATE_TABLES: &str = "create tables";
pub const PHASE_LOAD_STAGING: &str = "load staging";
pub const PHASE_POPULATE_DIMENSIONS: &str = "populate dimensions";
pub const PHASE_POPULATE_FACTS: &str = "populate facts";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineKind {
    /// Drop and recreate the schema.
    Reset,
    /// Bulk-load staging, then populate dimensions and facts.
    Load,
    /// Reset followed by load.
    Full,
}

impl PipelineKind {
    pub fn name(&self) -> &'static str {
        match self {
            PipelineKind::Reset => "reset",
            PipelineKind::Load => "load",
            PipelineKind::Full => "full",
        }
    }

    pub fn needs_bulk_load(&self) -> bool {
        matches!(self, PipelineKind::Load | PipelineKind::Full)
    }
}

impl fmt::Display for PipelineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PipelineKind {
    type Err = PlanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "reset" | "create-tables" => Ok(PipelineKind::Reset),
            "load" | "etl" => Ok(PipelineKind::Load),
            "full" | "all" => Ok(PipelineKind::Full),
            other => Err(PlanError::UnknownKind(other.to_string())),
        }
    }
}

pub fn build(kind: PipelineKind, catalog: &StatementCatalog) -> Result<Pipeline, PlanError> {
    if kind.needs_bulk_load() && !catalog.has_bulk_load() {
        return Err(PlanError::MissingBulkLoad(kind.name().to_string()));
    }

    let pipeline = match kind {
        PipelineKind::Reset => reset(catalog),
        PipelineKind::Load => load(catalog),
        PipelineKind::Full => reset(catalog).then(load(catalog)).renamed(kind.name()),
    };

    Ok(pipeline)
}

/// Phases 1-2. Each phase runs its statements in declared order on one
/// autocommit connection, and the drops are conditional so the pair can be
/// rerun.
fn reset(catalog: &StatementCatalog) -> Pipeline {
    Pipeline::new(
        PipelineKind::Reset.name(),
        vec![
            Phase::sequential(PHASE_DROP_TABLES, catalog.drop_tables.clone()),
            Phase::sequential(PHASE_CREATE_TABLES, catalog.create_tables.clone()),
        ],
    )
}

/// Phases 3-5. Staging tables and dimensions are independent of each other
/// within their phase; the fact table joins the dimensions and the time
/// table reads the fact table, so the last phase is strictly ordered.
fn load(catalog: &StatementCatalog) -> Pipeline {
    Pipeline::new(
        PipelineKind::Load.name(),
        vec![
            Phase::parallel(PHASE_LOAD_STAGING, catalog.staging_loads.clone()),
            Phase::parallel(PHASE_POPULATE_DIMENSIONS, catalog.dimension_inserts.clone()),
            Phase::sequential(PHASE_POPULATE_FACTS, catalog.fact_inserts.clone())
                .with_connection(ConnectionPolicy::PerStatement),
        ],
    )
}

/// Stable digest of what a pipeline will run, logged with every run.
pub fn fingerprint(pipeline: &Pipeline) -> String {
    let mut buffer = String::new();
    for phase in pipeline.phases() {
        buffer.push_str(phase.name());
        buffer.push('\0');
        buffer.push_str(&phase.mode().to_string());
        for statement in phase.statements() {
            buffer.push('\0');
            buffer.push_str(statement.sql());
        }
        buffer.push('\n');
    }
    format!("{:x}", md5::compute(buffer))
}

#[cfg(test)]
mod tests {
    use super::*;
    use model::execution::{phase::ConcurrencyMode, sources::LoadSources};

    fn catalog() -> StatementCatalog {
        StatementCatalog::star_schema().with_bulk_load(
            &LoadSources {
                log_data: "s3://bucket/log_data".into(),
                log_jsonpath: "s3://bucket/log_json_path.json".into(),
                song_data: "s3://bucket/song_data".into(),
                region: "us-west-2".into(),
            },
            "arn:aws:iam::123:role/dwh",
        )
    }

    fn shape(pipeline: &Pipeline) -> Vec<(&str, ConcurrencyMode)> {
        pipeline
            .phases()
            .iter()
            .map(|p| (p.name(), p.mode()))
            .collect()
    }

    #[test]
    fn test_full_pipeline_phase_order() {
        let pipeline = build(PipelineKind::Full, &catalog()).unwrap();

        assert_eq!(pipeline.name(), "full");
        assert_eq!(
            shape(&pipeline),
            vec![
                (PHASE_DROP_TABLES, ConcurrencyMode::Sequential),
                (PHASE_CREATE_TABLES, ConcurrencyMode::Sequential),
                (PHASE_LOAD_STAGING, ConcurrencyMode::Parallel),
                (PHASE_POPULATE_DIMENSIONS, ConcurrencyMode::Parallel),
                (PHASE_POPULATE_FACTS, ConcurrencyMode::Sequential),
            ]
        );
        assert!(pipeline.validate().is_ok());
    }

    #[test]
    fn test_reset_does_not_need_bulk_load() {
        let pipeline = build(PipelineKind::Reset, &StatementCatalog::star_schema()).unwrap();

        assert_eq!(pipeline.phases().len(), 2);
        assert_eq!(pipeline.phases()[0].connection_policy(), ConnectionPolicy::Shared);
    }

    #[test]
    fn test_load_requires_bulk_load() {
        let err = build(PipelineKind::Load, &StatementCatalog::star_schema()).unwrap_err();
        assert_eq!(err, PlanError::MissingBulkLoad("load".into()));
    }

    #[test]
    fn test_facts_run_on_separate_connections() {
        let pipeline = build(PipelineKind::Load, &catalog()).unwrap();
        let facts = &pipeline.phases()[2];

        assert_eq!(facts.connection_policy(), ConnectionPolicy::PerStatement);
        assert_eq!(facts.len(), 2);
    }

    #[test]
    fn test_kind_from_str() {
        assert_eq!("etl".parse::<PipelineKind>().unwrap(), PipelineKind::Load);
        assert_eq!("RESET".parse::<PipelineKind>().unwrap(), PipelineKind::Reset);
        assert!("bogus".parse::<PipelineKind>().is_err());
    }

    #[test]
    fn test_fingerprint_tracks_statement_text() {
        let a = build(PipelineKind::Reset, &catalog()).unwrap();
        let b = build(PipelineKind::Reset, &catalog()).unwrap();
        assert_eq!(fingerprint(&a), fingerprint(&b));

        let mut tweaked = catalog();
        tweaked.create_tables.pop();
        let c = build(PipelineKind::Reset, &tweaked).unwrap();
        assert_ne!(fingerprint(&a), fingerprint(&c));
    }

    #[test]
    fn test_pipeline_round_trips_through_json() {
        let pipeline = build(PipelineKind::Full, &catalog()).unwrap();
        let json = serde_json::to_string(&pipeline).unwrap();
        let parsed: Pipeline = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed, pipeline);
        assert_eq!(fingerprint(&parsed), fingerprint(&pipeline));
    }
}
