#[cfg(test)]
mod tests {
    use crate::{
        error::PipelineError,
        execution::planner::{RunOptions, run},
        tests::mock::{MockFactory, MockWarehouse},
    };
    use model::execution::{
        phase::{ConcurrencyMode, FailurePolicy, Phase},
        pipeline::Pipeline,
        report::{PhaseStatus, PipelineOutcome},
        sources::LoadSources,
        statement::StatementSpec,
    };
    use planner::{
        catalog::StatementCatalog,
        plan::{self, PHASE_CREATE_TABLES, PHASE_POPULATE_FACTS, PipelineKind},
    };
    use std::sync::Arc;

    fn halting_pipeline() -> Pipeline {
        Pipeline::new(
            "halting",
            vec![
                Phase::sequential(
                    "A",
                    vec![
                        StatementSpec::labeled("a1", "CREATE TABLE a1"),
                        StatementSpec::labeled("a2", "CREATE TABLE a2"),
                    ],
                )
                .with_failure_policy(FailurePolicy::CollectAll),
                Phase::parallel(
                    "B",
                    vec![
                        StatementSpec::new("INSERT INTO b1"),
                        StatementSpec::new("INSERT INTO b2"),
                        StatementSpec::new("INSERT INTO b3"),
                    ],
                ),
            ],
        )
    }

    fn star_schema_catalog() -> StatementCatalog {
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

    #[tokio::test]
    async fn test_halts_at_first_failed_phase() {
        let warehouse = MockWarehouse::new().fail_on("CREATE TABLE a2");
        let factory = Arc::new(MockFactory::new(warehouse.clone()));

        let report = run(&halting_pipeline(), factory, RunOptions::default())
            .await
            .unwrap();

        assert_eq!(
            report.outcome,
            PipelineOutcome::Failed {
                phase: "A".into()
            }
        );
        assert_eq!(report.phases.len(), 1);
        assert_eq!(report.results().count(), 2);
        assert_eq!(report.failed_results().count(), 1);
        assert!(
            warehouse
                .executed()
                .iter()
                .all(|sql| !sql.starts_with("INSERT"))
        );
    }

    #[tokio::test]
    async fn test_failed_parallel_phase_reports_all_results() {
        let warehouse = MockWarehouse::new().fail_on("INSERT INTO b2");
        let factory = Arc::new(MockFactory::new(warehouse));

        let report = run(&halting_pipeline(), factory, RunOptions::default())
            .await
            .unwrap();

        assert!(!report.is_success());
        let phase_b = report.phase("B").unwrap();
        assert_eq!(phase_b.status, PhaseStatus::Failed);
        assert_eq!(phase_b.results.len(), 3);
        assert_eq!(phase_b.failures().count(), 1);
    }

    #[tokio::test]
    async fn test_full_star_schema_run() {
        let warehouse = MockWarehouse::new();
        let factory = Arc::new(MockFactory::new(warehouse.clone()));
        let pipeline = plan::build(PipelineKind::Full, &star_schema_catalog()).unwrap();

        let report = run(&pipeline, factory, RunOptions::default())
            .await
            .unwrap();

        assert!(report.is_success());
        assert_eq!(report.phases.len(), 5);
        assert_eq!(report.results().count(), pipeline.statement_count());
        assert_eq!(report.fingerprint, plan::fingerprint(&pipeline));

        // Creates come after every drop, facts come last.
        let executed = warehouse.executed();
        let last_drop = executed.iter().rposition(|s| s.starts_with("DROP")).unwrap();
        let first_create = executed.iter().position(|s| s.starts_with("CREATE")).unwrap();
        assert!(last_drop < first_create);

        let facts = report.phase(PHASE_POPULATE_FACTS).unwrap();
        assert_eq!(facts.mode, ConcurrencyMode::Sequential);
        let tail: Vec<_> = executed[executed.len() - 2..].to_vec();
        let fact_sql: Vec<_> = facts.results.iter().map(|r| r.sql().to_string()).collect();
        assert_eq!(tail, fact_sql);
    }

    #[tokio::test]
    async fn test_cancelled_before_next_phase() {
        let warehouse = MockWarehouse::new();
        let factory = Arc::new(MockFactory::new(warehouse.clone()));
        let pipeline = plan::build(PipelineKind::Reset, &StatementCatalog::star_schema()).unwrap();
        let options = RunOptions::default();
        options.cancel.cancel();

        let report = run(&pipeline, factory, options).await.unwrap();

        assert!(report.phases.is_empty());
        assert!(matches!(report.outcome, PipelineOutcome::Cancelled { .. }));
        assert!(warehouse.executed().is_empty());
    }

    #[tokio::test]
    async fn test_connection_refused_fails_first_phase() {
        let factory = Arc::new(MockFactory::new(MockWarehouse::new()).refuse_connections());
        let pipeline = plan::build(PipelineKind::Reset, &StatementCatalog::star_schema()).unwrap();
        let options = RunOptions::default();
        let metrics = options.metrics.clone();

        let report = run(&pipeline, factory, options).await.unwrap();

        assert_eq!(report.phases.len(), 1);
        assert_eq!(report.failed_results().count(), 1);
        assert_eq!(metrics.snapshot().connection_failures, 1);
        assert!(report.phase(PHASE_CREATE_TABLES).is_none());
    }

    #[tokio::test]
    async fn test_empty_phase_completes() {
        let factory = Arc::new(MockFactory::new(MockWarehouse::new()));
        let pipeline = Pipeline::new(
            "noop",
            vec![
                Phase::parallel("nothing", vec![]),
                Phase::sequential("one", vec![StatementSpec::new("SELECT 1")]),
            ],
        );

        let report = run(&pipeline, factory.clone(), RunOptions::default())
            .await
            .unwrap();

        assert!(report.is_success());
        assert!(report.phases[0].results.is_empty());
        assert_eq!(factory.attempts(), 1);
    }

    #[tokio::test]
    async fn test_invalid_pipeline_rejected_before_running() {
        let factory = Arc::new(MockFactory::new(MockWarehouse::new()));
        let pipeline = Pipeline::new("empty", vec![]);

        let err = run(&pipeline, factory.clone(), RunOptions::default())
            .await
            .unwrap_err();

        assert!(matches!(err, PipelineError::Definition(_)));
        assert_eq!(factory.attempts(), 0);
    }

    #[tokio::test]
    async fn test_each_run_gets_fresh_id() {
        let factory: Arc<MockFactory> = Arc::new(MockFactory::new(MockWarehouse::new()));
        let pipeline = plan::build(PipelineKind::Reset, &StatementCatalog::star_schema()).unwrap();

        let first = run(&pipeline, factory.clone(), RunOptions::default())
            .await
            .unwrap();
        let second = run(&pipeline, factory, RunOptions::default())
            .await
            .unwrap();

        assert_ne!(first.run_id, second.run_id);
        assert_eq!(first.fingerprint, second.fingerprint);
    }
}
