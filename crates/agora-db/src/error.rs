use thiserror::Error;

#[derive(Debug, Error)]
#[error("Could not build database pool")]
pub struct BuildPoolError;

#[derive(Debug, Error)]
#[error("Could not acquire database connection")]
pub struct AcquireError;

#[derive(Debug, Error)]
#[error("Could not begin database transaction")]
pub struct BeginTransactError;
