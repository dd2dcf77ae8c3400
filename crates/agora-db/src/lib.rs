mod pool;

pub mod error;
pub mod testing;

pub use self::error::{AcquireError, BeginTransactError, BuildPoolError};
pub use self::pool::PgPool;

pub type Transaction<'a> = sqlx::Transaction<'a, sqlx::Postgres>;
pub type PgPooledConnection = sqlx::pool::PoolConnection<sqlx::Postgres>;
pub type PgConnection = sqlx::PgConnection;
