use crate::config::TelemetryConfig;
use tracing_subscriber::filter::ParseError;
use tracing_subscriber::EnvFilter;

#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    #[error("invalid log filter '{value}'")]
    EnvFilter {
        value: String,
        #[source]
        source: ParseError,
    },
    #[error("failed to install tracing subscriber: {0}")]
    Subscriber(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Where log lines end up and how chatty the default is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogTarget {
    /// Long-running HTTP service: configured level, written to stdout.
    Service,
    /// One-shot CLI commands: engine events only surface at `warn` unless
    /// `RUST_LOG` asks for more, and go to stderr so reports stay pipeable.
    Cli,
}

/// Resolves the filter: `RUST_LOG` first, then the configured level.
pub fn filter_for(config: &TelemetryConfig, target: LogTarget) -> Result<EnvFilter, TelemetryError> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }

    let directive = match target {
        LogTarget::Service => config.log_level.clone(),
        LogTarget::Cli => "warn".to_string(),
    };

    EnvFilter::try_new(&directive).map_err(|source| TelemetryError::EnvFilter {
        value: directive,
        source,
    })
}

pub fn init(config: &TelemetryConfig, target: LogTarget) -> Result<(), TelemetryError> {
    let filter = filter_for(config, target)?;
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .with_ansi(false);

    match target {
        LogTarget::Service => builder.try_init(),
        LogTarget::Cli => builder.with_writer(std::io::stderr).try_init(),
    }
    .map_err(TelemetryError::Subscriber)
}
