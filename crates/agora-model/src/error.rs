use thiserror::Error;

/// Catch-all context for read queries. Writes carry their own contexts
/// next to the types they insert or modify.
#[derive(Debug, Error)]
#[error("Could not execute database query")]
pub struct QueryError;
