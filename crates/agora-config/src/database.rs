use agora_api_types::Sensitive;
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Deserialize)]
pub struct Database {
    /// Postgres connection URL.
    pub url: Sensitive<String>,

    #[serde(default = "Database::default_min_connections")]
    pub min_connections: u32,
    #[serde(default = "Database::default_max_connections")]
    pub max_connections: u32,

    /// How long to wait for a connection before failing the request.
    #[serde(default = "Database::default_timeout_secs")]
    pub timeout_secs: u64,

    /// Whether to prefer TLS when connecting to the database.
    #[serde(default)]
    pub enforce_tls: bool,
}

impl Database {
    pub fn connection_url(&self) -> &str {
        self.url.value()
    }

    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    fn default_min_connections() -> u32 {
        0
    }

    fn default_max_connections() -> u32 {
        10
    }

    fn default_timeout_secs() -> u64 {
        5
    }
}
