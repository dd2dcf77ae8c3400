use error_stack::{Result, ResultExt};
use sqlx::postgres::{PgConnectOptions, PgPoolOptions, PgSslMode};
use std::str::FromStr;
use std::time::Duration;

use crate::error::{AcquireError, BeginTransactError, BuildPoolError};
use crate::{PgPooledConnection, Transaction};

/// A Postgres database connection pool.
///
/// Connections are established lazily; a pool builds successfully even
/// while the database is still coming up, and requests fail with
/// [`AcquireError`] until it is reachable.
#[derive(Clone)]
pub struct PgPool {
    pool: sqlx::PgPool,
}

impl PgPool {
    #[tracing::instrument(skip_all, name = "db.build")]
    pub fn build(config: &agora_config::Database) -> Result<Self, BuildPoolError> {
        let pool_opts = PgPoolOptions::new()
            .acquire_timeout(config.timeout())
            .min_connections(config.min_connections)
            .max_connections(config.max_connections);

        let mut connect_opts = PgConnectOptions::from_str(config.connection_url())
            .change_context(BuildPoolError)
            .attach_printable("invalid database connection url")?;

        if config.enforce_tls {
            connect_opts = connect_opts.ssl_mode(PgSslMode::Prefer);
        }

        Ok(Self {
            pool: pool_opts.connect_lazy_with(connect_opts),
        })
    }

    /// Wraps an already-connected sqlx pool; used by the test harness.
    pub(crate) fn from_sqlx(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }

    /// Attempts to acquire a connection from the pool.
    #[tracing::instrument(skip_all, name = "db.acquire")]
    pub async fn acquire(&self) -> Result<PgPooledConnection, AcquireError> {
        self.pool.acquire().await.change_context(AcquireError)
    }

    /// Attempts to begin a database transaction.
    #[tracing::instrument(skip_all, name = "db.begin")]
    pub async fn begin(&self) -> Result<Transaction<'static>, BeginTransactError> {
        self.pool.begin().await.change_context(BeginTransactError)
    }

    /// Checks whether the database answers a trivial query in time.
    #[tracing::instrument(skip(self), name = "db.check_health")]
    pub async fn check_health(&self, timeout: Option<Duration>) -> bool {
        let tester = async {
            sqlx::query("SELECT 1;").execute(&self.pool).await.is_ok()
        };

        let timeout = timeout.unwrap_or(Duration::from_secs(5));
        match tokio::time::timeout(timeout, tester).await {
            Ok(result) => result,
            Err(..) => false,
        }
    }

    /// Gets the active connections of the pool.
    #[must_use]
    pub fn connections(&self) -> u32 {
        self.pool.size()
    }
}

impl std::fmt::Debug for PgPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PgPool")
            .field("connections", &self.connections())
            .finish_non_exhaustive()
    }
}
