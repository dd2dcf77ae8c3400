use sqlx::migrate::Migrator;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use std::str::FromStr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::PgPool;

pub const TEST_DATABASE_URL_ENV: &str = "AGORA_TEST_DATABASE_URL";

static SCHEMA_COUNTER: AtomicU32 = AtomicU32::new(0);

/// Builds a migrated pool against the database named by
/// `AGORA_TEST_DATABASE_URL`, isolated in a throwaway schema so
/// concurrently running tests cannot see each other's rows.
///
/// Returns `None` (so the caller can skip itself) when the variable is
/// not set.
///
/// ## Panics
/// Panics when the test database is unreachable or migrations fail;
/// there is no point continuing the test at that point.
pub async fn build_test_pool(migrator: &Migrator) -> Option<PgPool> {
    let Ok(url) = std::env::var(TEST_DATABASE_URL_ENV) else {
        eprintln!("`{TEST_DATABASE_URL_ENV}` is not set, skipping database test");
        return None;
    };

    let nonce = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system clock is before the unix epoch")
        .subsec_nanos();

    let schema = format!(
        "agora_test_{nonce}_{}",
        SCHEMA_COUNTER.fetch_add(1, Ordering::Relaxed)
    );

    let connect_opts =
        PgConnectOptions::from_str(&url).expect("invalid test database connection url");

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .after_connect(move |conn, _meta| {
            let schema = schema.clone();
            Box::pin(async move {
                sqlx::query(&format!("CREATE SCHEMA IF NOT EXISTS {schema};"))
                    .execute(&mut *conn)
                    .await?;

                sqlx::query(&format!("SET search_path TO {schema};"))
                    .execute(&mut *conn)
                    .await?;

                Ok(())
            })
        })
        .connect_with(connect_opts)
        .await
        .expect("failed to connect to the test database");

    migrator
        .run(&pool)
        .await
        .expect("failed to apply migrations to the test database");

    Some(PgPool::from_sqlx(pool))
}
