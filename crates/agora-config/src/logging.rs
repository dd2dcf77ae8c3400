use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
pub struct Logging {
    /// Logging target directives, `env_logger` syntax. `RUST_LOG` takes
    /// precedence when both are set.
    #[serde(default)]
    pub targets: Option<String>,
}

impl Logging {
    #[must_use]
    pub fn targets(&self) -> &str {
        self.targets.as_deref().unwrap_or_default()
    }
}
