use agora_error::ext::ResultExt;
use agora_error::Result;
use thiserror::Error;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Error)]
#[error("Failed to initialize tracing")]
pub struct TracingInitError;

/// Installs the global tracing subscriber.
///
/// `RUST_LOG` takes precedence over the configured targets when both
/// are set; with neither, everything at `INFO` and above is logged.
pub fn init(config: &agora_config::Logging) -> Result<(), TracingInitError> {
    let filter = match std::env::var("RUST_LOG") {
        Ok(targets) => make_env_filter(&targets),
        Err(_) => make_env_filter(config.targets()),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init()
        .change_context(TracingInitError)
        .attach_printable("already initialized tracing")?;

    Ok(())
}

fn make_env_filter(targets: &str) -> EnvFilter {
    EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .parse_lossy(targets)
}
