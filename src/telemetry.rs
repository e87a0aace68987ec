use thiserror::Error;
use tracing_subscriber::filter::ParseError;
use tracing_subscriber::EnvFilter;

pub const DEFAULT_LOG_LEVEL: &str = "warn";

#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("invalid log level/filter '{value}': unable to build EnvFilter")]
    EnvFilter {
        value: String,
        #[source]
        source: ParseError,
    },
    #[error("telemetry error: {0}")]
    Subscriber(Box<dyn std::error::Error + Send + Sync>),
}

/// Filter directive to use when RUST_LOG is unset.
///
/// `verbose` forces `debug` regardless of the configured level.
pub fn effective_level(configured: Option<&str>, verbose: bool) -> &str {
    if verbose {
        "debug"
    } else {
        configured.unwrap_or(DEFAULT_LOG_LEVEL)
    }
}

/// Install the global subscriber. Logs go to stderr so stdout stays clean for
/// tables and TSV.
pub fn init(configured: Option<&str>, verbose: bool) -> Result<(), TelemetryError> {
    let level = effective_level(configured, verbose);
    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(level).map_err(|source| TelemetryError::EnvFilter {
            value: level.to_string(),
            source,
        })?,
    };

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .try_init()
        .map_err(TelemetryError::Subscriber)
}
