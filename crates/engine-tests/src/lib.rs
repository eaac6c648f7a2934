#![allow(dead_code)]

use connectors::{
    factory::{ConnectionFactory, PgConnectionFactory},
    sql::postgres::utils::{connect_client, pg_config},
};
use model::execution::connection::{ConnectionConfig, SslMode};
use std::sync::Arc;
use tokio_postgres::Client;

pub mod utils;

// Test database
const TEST_PG_HOST: &str = "localhost";
const TEST_PG_PORT: u16 = 5432;
const TEST_PG_DATABASE: &str = "testdb";
const TEST_PG_USER: &str = "user";
const TEST_PG_PASSWORD: &str = "password";

fn test_config() -> ConnectionConfig {
    ConnectionConfig {
        host: TEST_PG_HOST.into(),
        port: TEST_PG_PORT,
        database: TEST_PG_DATABASE.into(),
        user: TEST_PG_USER.into(),
        password: TEST_PG_PASSWORD.into(),
        role: None,
        ssl_mode: SslMode::Disable,
    }
}

fn test_factory() -> Arc<dyn ConnectionFactory> {
    Arc::new(PgConnectionFactory::new(test_config()).expect("valid test config"))
}

async fn pg_client() -> Client {
    connect_client(&pg_config(&test_config()))
        .await
        .expect("connect postgres")
}

/// Drop & recreate the public schema in Postgres so it's empty.
async fn reset_postgres_schema() {
    let client = pg_client().await;
    // This will drop all tables, types, etc. in `public` and re-create it.
    client
        .batch_execute(
            r#"
        DROP SCHEMA public CASCADE;
        CREATE SCHEMA public;
    "#,
        )
        .await
        .expect("reset postgres schema");
}
