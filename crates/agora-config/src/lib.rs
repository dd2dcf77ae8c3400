mod auth;
mod database;
mod logging;
mod server;

pub use self::auth::Auth;
pub use self::database::Database;
pub use self::logging::Logging;
pub use self::server::Server;

use thiserror::Error;

#[derive(Debug, Error)]
#[error("Failed to load configuration")]
pub struct LoadError;
