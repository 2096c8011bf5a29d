use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::types::{LogFormat, LoggingConfig};

pub const LOG_ENV: &str = "REFINEFLOW_LOG";

/// Filter from `REFINEFLOW_LOG` when it parses, else from the configured level.
pub fn build_filter(config: &LoggingConfig) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| {
        EnvFilter::try_new(&config.level).unwrap_or_else(|_| EnvFilter::new("info"))
    })
}

/// Install the global subscriber. Logs go to stderr, stdout is left to
/// command output.
pub fn init_tracing(config: &LoggingConfig) {
    let registry = tracing_subscriber::registry().with(build_filter(config));

    let result = match config.format {
        LogFormat::Json => registry
            .with(
                fmt::layer()
                    .json()
                    .with_ansi(false)
                    .with_target(false)
                    .with_writer(std::io::stderr),
            )
            .try_init(),
        LogFormat::Compact => registry
            .with(
                fmt::layer()
                    .compact()
                    .with_target(false)
                    .with_writer(std::io::stderr),
            )
            .try_init(),
    };

    if let Err(e) = result {
        eprintln!("Failed to initialize logging: {e}");
    }
}
