//! The star-schema statement catalog: every SQL statement the standard
//! pipelines run, grouped by the step that needs it.

use crate::{
    query::{
        ast::copy::CopyFormat,
        builder::{copy::CopyBuilder, drop_table::DropTableBuilder},
        dialect::Redshift,
        renderer::to_sql,
    },
    table_ref,
};
use model::execution::{sources::LoadSources, statement::StatementSpec};

pub const STAGING_EVENTS: &str = "staging_events";
pub const STAGING_SONGS: &str = "staging_songs";
pub const USERS: &str = "users";
pub const SONGS: &str = "songs";
pub const ARTISTS: &str = "artists";
pub const TIME: &str = "time";
pub const SONGPLAYS: &str = "songplays";

#[derive(Debug, Clone, Copy)]
pub struct TableDef {
    pub name: &'static str,
    pub create_sql: &'static str,
}

/// Tables in creation order: a table only references tables listed before it.
pub const TABLES: &[TableDef] = &[
    TableDef {
        name: STAGING_EVENTS,
        create_sql: include_str!("sql/create_staging_events.sql"),
    },
    TableDef {
        name: STAGING_SONGS,
        create_sql: include_str!("sql/create_staging_songs.sql"),
    },
    TableDef {
        name: USERS,
        create_sql: include_str!("sql/create_users.sql"),
    },
    TableDef {
        name: SONGS,
        create_sql: include_str!("sql/create_songs.sql"),
    },
    TableDef {
        name: ARTISTS,
        create_sql: include_str!("sql/create_artists.sql"),
    },
    TableDef {
        name: TIME,
        create_sql: include_str!("sql/create_time.sql"),
    },
    TableDef {
        name: SONGPLAYS,
        create_sql: include_str!("sql/create_songplays.sql"),
    },
];

const INSERT_USERS_SQL: &str = include_str!("sql/insert_users.sql");
const INSERT_SONGS_SQL: &str = include_str!("sql/insert_songs.sql");
const INSERT_ARTISTS_SQL: &str = include_str!("sql/insert_artists.sql");
const INSERT_SONGPLAYS_SQL: &str = include_str!("sql/insert_songplays.sql");
const INSERT_TIME_SQL: &str = include_str!("sql/insert_time.sql");

/// Statements grouped by pipeline step.
///
/// `staging_loads` stays empty until bulk-load sources are attached, since
/// the COPY statements embed the storage locations and the load role.
#[derive(Debug, Clone, Default)]
pub struct StatementCatalog {
    pub drop_tables: Vec<StatementSpec>,
    pub create_tables: Vec<StatementSpec>,
    pub staging_loads: Vec<StatementSpec>,
    pub dimension_inserts: Vec<StatementSpec>,
    pub fact_inserts: Vec<StatementSpec>,
}

impl StatementCatalog {
    pub fn star_schema() -> Self {
        // Referencing tables go first so conditional drops never trip over
        // a foreign key.
        let drop_tables = TABLES
            .iter()
            .rev()
            .map(|table| {
                let ast = DropTableBuilder::new(table_ref!(table.name))
                    .if_exists()
                    .build();
                StatementSpec::labeled(format!("drop {}", table.name), to_sql(&ast, &Redshift))
            })
            .collect();

        let create_tables = TABLES
            .iter()
            .map(|table| {
                StatementSpec::labeled(format!("create {}", table.name), table.create_sql)
            })
            .collect();

        let dimension_inserts = vec![
            StatementSpec::labeled(format!("populate {USERS}"), INSERT_USERS_SQL),
            StatementSpec::labeled(format!("populate {SONGS}"), INSERT_SONGS_SQL),
            StatementSpec::labeled(format!("populate {ARTISTS}"), INSERT_ARTISTS_SQL),
        ];

        // The time table is derived from songplays, so order matters here.
        let fact_inserts = vec![
            StatementSpec::labeled(format!("populate {SONGPLAYS}"), INSERT_SONGPLAYS_SQL),
            StatementSpec::labeled(format!("populate {TIME}"), INSERT_TIME_SQL),
        ];

        Self {
            drop_tables,
            create_tables,
            staging_loads: Vec::new(),
            dimension_inserts,
            fact_inserts,
        }
    }

    /// Attaches the COPY statements that fill the staging tables.
    pub fn with_bulk_load(mut self, sources: &LoadSources, iam_role: &str) -> Self {
        self.staging_loads = staging_loads(sources, iam_role);
        self
    }

    pub fn has_bulk_load(&self) -> bool {
        !self.staging_loads.is_empty()
    }
}

fn staging_loads(sources: &LoadSources, iam_role: &str) -> Vec<StatementSpec> {
    let events = CopyBuilder::new(table_ref!(STAGING_EVENTS), &sources.log_data)
        .iam_role(iam_role)
        .format(CopyFormat::JsonPaths(sources.log_jsonpath.clone()))
        .region(&sources.region)
        .build();

    let songs = CopyBuilder::new(table_ref!(STAGING_SONGS), &sources.song_data)
        .iam_role(iam_role)
        .format(CopyFormat::JsonAuto)
        .region(&sources.region)
        .build();

    vec![
        StatementSpec::labeled(format!("load {STAGING_EVENTS}"), to_sql(&events, &Redshift)),
        StatementSpec::labeled(format!("load {STAGING_SONGS}"), to_sql(&songs, &Redshift)),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sources() -> LoadSources {
        LoadSources {
            log_data: "s3://udacity-dend/log_data".into(),
            log_jsonpath: "s3://udacity-dend/log_json_path.json".into(),
            song_data: "s3://udacity-dend/song_data".into(),
            region: "us-west-2".into(),
        }
    }

    fn position(statements: &[StatementSpec], label: &str) -> usize {
        statements
            .iter()
            .position(|s| s.label() == Some(label))
            .unwrap_or_else(|| panic!("no statement labeled {label}"))
    }

    #[test]
    fn test_drops_are_conditional_and_cover_every_table() {
        let catalog = StatementCatalog::star_schema();

        assert_eq!(catalog.drop_tables.len(), TABLES.len());
        assert!(
            catalog
                .drop_tables
                .iter()
                .all(|s| s.sql().starts_with("DROP TABLE IF EXISTS"))
        );
    }

    #[test]
    fn test_fact_table_dropped_first_and_created_last() {
        let catalog = StatementCatalog::star_schema();

        assert_eq!(position(&catalog.drop_tables, "drop songplays"), 0);
        let create_fact = position(&catalog.create_tables, "create songplays");
        for dim in [USERS, SONGS, ARTISTS] {
            assert!(position(&catalog.create_tables, &format!("create {dim}")) < create_fact);
        }
    }

    #[test]
    fn test_time_populated_after_songplays() {
        let catalog = StatementCatalog::star_schema();

        assert!(
            position(&catalog.fact_inserts, "populate songplays")
                < position(&catalog.fact_inserts, "populate time")
        );
    }

    #[test]
    fn test_bulk_load_renders_copy_statements() {
        let catalog = StatementCatalog::star_schema();
        assert!(!catalog.has_bulk_load());

        let catalog = catalog.with_bulk_load(&sources(), "arn:aws:iam::123:role/dwh");
        assert!(catalog.has_bulk_load());
        assert_eq!(catalog.staging_loads.len(), 2);

        let events = &catalog.staging_loads[position(&catalog.staging_loads, "load staging_events")];
        assert!(events.sql().contains("JSON 's3://udacity-dend/log_json_path.json'"));
        assert!(events.sql().contains("IAM_ROLE 'arn:aws:iam::123:role/dwh'"));

        let songs = &catalog.staging_loads[position(&catalog.staging_loads, "load staging_songs")];
        assert!(songs.sql().contains("JSON 'auto'"));
        assert!(songs.sql().contains("REGION 'us-west-2'"));
    }
}
