use agora_db::error::{AcquireError, BeginTransactError};
use agora_db::{PgPool, PgPooledConnection, Transaction};
use agora_error::ext::ResultExt;
use agora_error::Result;
use axum::extract::{FromRequestParts, State};
use jsonwebtoken::{DecodingKey, EncodingKey};
use std::sync::Arc;
use thiserror::Error;
use tracing::trace;

#[derive(Clone, FromRequestParts)]
#[from_request(via(State))]
#[must_use]
pub struct App(Arc<AppInner>);

pub struct AppInner {
    pub config: Arc<agora_config::Server>,
    pub db: PgPool,

    pub jwt_encode: EncodingKey,
    pub jwt_decode: DecodingKey,
}

#[derive(Debug, Error)]
#[error("Could not initialize server application")]
pub struct AppError;

impl App {
    pub fn new(config: agora_config::Server) -> Result<Self, AppError> {
        let db = PgPool::build(&config.database).change_context(AppError)?;

        let secret = config.auth.jwt_secret().as_bytes();
        let jwt_encode = EncodingKey::from_secret(secret);
        let jwt_decode = DecodingKey::from_secret(secret);

        Ok(Self(Arc::new(AppInner {
            config: Arc::new(config),
            db,
            jwt_encode,
            jwt_decode,
        })))
    }

    /// Creates an [`App`] backed by a migrated throwaway test schema.
    ///
    /// Returns `None` when `AGORA_TEST_DATABASE_URL` is not set so the
    /// calling test can skip itself.
    pub async fn new_for_tests() -> Option<Self> {
        let db = agora_db::testing::build_test_pool(&agora_model::DB_MIGRATIONS).await?;
        let config = agora_config::Server::for_tests();

        let secret = config.auth.jwt_secret().as_bytes();
        let jwt_encode = EncodingKey::from_secret(secret);
        let jwt_decode = DecodingKey::from_secret(secret);

        Some(Self(Arc::new(AppInner {
            config: Arc::new(config),
            db,
            jwt_encode,
            jwt_decode,
        })))
    }

    /// Obtains a plain connection for read-only work.
    #[tracing::instrument(skip_all, name = "app.db_read")]
    pub async fn db_read(&self) -> Result<PgPooledConnection, AcquireError> {
        trace!("obtaining db connection...");
        self.db.acquire().await
    }

    /// Begins a transaction for anything that writes. The caller is
    /// responsible for committing it.
    #[tracing::instrument(skip_all, name = "app.db_write")]
    pub async fn db_write(&self) -> Result<Transaction<'static>, BeginTransactError> {
        trace!("beginning db transaction...");
        self.db.begin().await
    }
}

impl std::fmt::Debug for App {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("App")
            .field("config", &self.config)
            .field("db", &self.db)
            .finish_non_exhaustive()
    }
}

impl std::ops::Deref for App {
    type Target = AppInner;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}
