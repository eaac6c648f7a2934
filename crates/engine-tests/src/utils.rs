#![allow(dead_code)]

use crate::{pg_client, test_factory};
use engine_runtime::execution::planner::{RunOptions, run};
use model::execution::{
    phase::Phase, pipeline::Pipeline, report::PipelineReport, statement::StatementSpec,
};
use planner::{
    query::{builder::drop_table::DropTableBuilder, dialect::Redshift, renderer::to_sql},
    table_ref,
};

/// Tables of a miniature star schema written in plain Postgres DDL, so the
/// orchestration can be exercised without a Redshift cluster.
/// Listed in creation order.
pub const MINI_SCHEMA: &[(&str, &str)] = &[
    (
        "staging_events",
        "CREATE TABLE staging_events (user_id INTEGER, song TEXT, artist TEXT, ts BIGINT)",
    ),
    (
        "staging_songs",
        "CREATE TABLE staging_songs (song_id TEXT, title TEXT, artist_id TEXT, artist_name TEXT)",
    ),
    ("users", "CREATE TABLE users (user_id INTEGER PRIMARY KEY)"),
    (
        "songs",
        "CREATE TABLE songs (song_id TEXT PRIMARY KEY, title TEXT, artist_id TEXT)",
    ),
    (
        "artists",
        "CREATE TABLE artists (artist_id TEXT PRIMARY KEY, name TEXT)",
    ),
    (
        "songplays",
        "CREATE TABLE songplays (songplay_id SERIAL PRIMARY KEY, user_id INTEGER REFERENCES users, song_id TEXT REFERENCES songs, ts BIGINT)",
    ),
];

pub const SEED_STAGING: &[&str] = &[
    "INSERT INTO staging_events VALUES (1, 'Song A', 'Artist A', 1000), (2, 'Song B', 'Artist B', 2000), (2, 'Song A', 'Artist A', 3000)",
    "INSERT INTO staging_songs VALUES ('S1', 'Song A', 'A1', 'Artist A'), ('S2', 'Song B', 'A2', 'Artist B')",
];

pub const POPULATE_DIMENSIONS: &[(&str, &str)] = &[
    (
        "populate users",
        "INSERT INTO users SELECT DISTINCT user_id FROM staging_events",
    ),
    (
        "populate songs",
        "INSERT INTO songs SELECT DISTINCT song_id, title, artist_id FROM staging_songs",
    ),
    (
        "populate artists",
        "INSERT INTO artists SELECT DISTINCT artist_id, artist_name FROM staging_songs",
    ),
];

pub const POPULATE_FACTS: &str = "INSERT INTO songplays (user_id, song_id, ts) \
    SELECT e.user_id, s.song_id, e.ts FROM staging_events e \
    JOIN staging_songs s ON e.song = s.title AND e.artist = s.artist_name";

/// Drop and create phases for the miniature schema. Drops run in reverse
/// creation order and are conditional, so the pair can be rerun.
pub fn reset_pipeline() -> Pipeline {
    let drops = MINI_SCHEMA
        .iter()
        .rev()
        .map(|(name, _)| {
            let ast = DropTableBuilder::new(table_ref!(name)).if_exists().build();
            StatementSpec::labeled(format!("drop {name}"), to_sql(&ast, &Redshift))
        })
        .collect();
    let creates = MINI_SCHEMA
        .iter()
        .map(|(name, ddl)| StatementSpec::labeled(format!("create {name}"), *ddl))
        .collect();

    Pipeline::new(
        "reset",
        vec![
            Phase::sequential("drop tables", drops),
            Phase::sequential("create tables", creates),
        ],
    )
}

pub fn load_pipeline() -> Pipeline {
    let staging = SEED_STAGING.iter().map(|sql| StatementSpec::new(*sql)).collect();
    let dimensions = POPULATE_DIMENSIONS
        .iter()
        .map(|(label, sql)| StatementSpec::labeled(*label, *sql))
        .collect();

    Pipeline::new(
        "load",
        vec![
            Phase::parallel("load staging", staging),
            Phase::parallel("populate dimensions", dimensions),
            Phase::sequential(
                "populate facts",
                vec![StatementSpec::labeled("populate songplays", POPULATE_FACTS)],
            ),
        ],
    )
}

/// Run a pipeline against the test database, panicking on any runtime error
pub async fn run_pipeline(pipeline: &Pipeline) -> PipelineReport {
    run(pipeline, test_factory(), RunOptions::default())
        .await
        .expect("pipeline run")
}

pub async fn execute(sql: &str) {
    let client = pg_client().await;
    client.batch_execute(sql).await.expect("execute sql");
}

pub async fn table_exists(table: &str) -> bool {
    let client = pg_client().await;
    let row = client
        .query_one(
            "SELECT EXISTS (SELECT 1 FROM information_schema.tables WHERE table_schema = 'public' AND table_name = $1)",
            &[&table],
        )
        .await
        .expect("query table existence");
    row.get(0)
}

pub async fn assert_table_exists(table: &str, expected: bool) {
    assert_eq!(
        table_exists(table).await,
        expected,
        "table {table} existence mismatch"
    );
}

pub async fn get_row_count(table: &str) -> i64 {
    let client = pg_client().await;
    let row = client
        .query_one(&format!("SELECT COUNT(*) FROM {table}"), &[])
        .await
        .expect("count rows");
    row.get(0)
}
