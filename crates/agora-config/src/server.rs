use agora_api_types::Sensitive;
use error_stack::{Report, Result};
use serde::Deserialize;
use std::net::{IpAddr, Ipv4Addr};

use crate::{Auth, Database, LoadError, Logging};

#[derive(Debug, Deserialize)]
pub struct Server {
    #[serde(default = "Server::default_ip")]
    pub ip: IpAddr,
    #[serde(default = "Server::default_port")]
    pub port: u16,

    /// You can refer to the `database` section as `db` to make it
    /// easier to type.
    #[serde(alias = "db")]
    pub database: Database,

    #[serde(default)]
    pub auth: Auth,
    #[serde(default)]
    pub logging: Logging,
}

impl Server {
    pub const DEFAULT_FILE_NAME: &'static str = "agora.toml";
    pub const FILE_ENV: &'static str = "AGORA_CONFIG_FILE";

    /// Loads server config from `agora.toml` (or the file named by
    /// `AGORA_CONFIG_FILE`) merged with `AGORA_`-prefixed environment
    /// variables; environment wins.
    pub fn from_env() -> Result<Self, LoadError> {
        dotenvy::dotenv().ok();

        let config = Self::figment()
            .extract::<Self>()
            .map_err(|error| Report::new(LoadError).attach_printable(error.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    /// Creates a default [`figment::Figment`] object to load server
    /// configuration. Exposed for [`Server::from_env`] and testing.
    pub(crate) fn figment() -> figment::Figment {
        use figment::providers::{Env, Format, Toml};
        use figment::Figment;

        let file = std::env::var(Self::FILE_ENV)
            .unwrap_or_else(|_| Self::DEFAULT_FILE_NAME.to_string());

        Figment::new()
            .merge(Toml::file(file))
            // figment's env provider cannot tell a key underscore from a
            // section separator, hence the explicit mapping.
            .merge(Env::prefixed("AGORA_").map(|v| match v.as_str() {
                "DB_URL" => "database.url".into(),
                "DB_MIN_CONNECTIONS" => "database.min_connections".into(),
                "DB_MAX_CONNECTIONS" => "database.max_connections".into(),
                "DB_TIMEOUT_SECS" => "database.timeout_secs".into(),
                "DB_ENFORCE_TLS" => "database.enforce_tls".into(),
                "AUTH_JWT_SECRET" => "auth.jwt_secret".into(),
                "LOGGING_TARGETS" => "logging.targets".into(),
                _ => v.as_str().replace('_', ".").into(),
            }))
    }

    fn validate(&self) -> Result<(), LoadError> {
        if self.auth.jwt_secret().len() < Auth::MIN_JWT_SECRET_LENGTH {
            return Err(Report::new(LoadError).attach_printable(format!(
                "auth.jwt_secret must be at least {} characters long",
                Auth::MIN_JWT_SECRET_LENGTH
            )));
        }
        Ok(())
    }

    /// Loads the server test configuration. The database URL comes from
    /// `AGORA_TEST_DATABASE_URL` when present.
    #[must_use]
    pub fn for_tests() -> Self {
        let url = std::env::var("AGORA_TEST_DATABASE_URL")
            .unwrap_or_else(|_| "postgres://localhost:5432/agora_test".to_string());

        Self {
            ip: Self::default_ip(),
            port: 0,
            database: Database {
                url: Sensitive::new(url),
                min_connections: 0,
                max_connections: 5,
                timeout_secs: 5,
                enforce_tls: false,
            },
            auth: Auth::default(),
            logging: Logging::default(),
        }
    }

    fn default_ip() -> IpAddr {
        IpAddr::V4(Ipv4Addr::LOCALHOST)
    }

    fn default_port() -> u16 {
        8080
    }
}
