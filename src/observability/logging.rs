//! Structured logging.
//!
//! `RUST_LOG` wins over the configured level. Pretty output for terminals,
//! JSON for log collectors.

use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::schema::{LogFormat, ObservabilityConfig};

/// Directives applied when `RUST_LOG` is unset.
pub fn default_directives(level: &str) -> String {
    format!(
        "tunnel_panel={0},daemon={0},tower_http={0}",
        level
    )
}

fn build_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_directives(level)))
        .unwrap_or_else(|_| EnvFilter::new(default_directives("info")))
}

/// Install the global subscriber.
pub fn init_logging(config: &ObservabilityConfig) -> Result<(), TryInitError> {
    let registry = tracing_subscriber::registry().with(build_filter(&config.log_level));

    match config.log_format {
        LogFormat::Json => registry.with(fmt::layer().json()).try_init(),
        LogFormat::Pretty => registry.with(fmt::layer()).try_init(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directives_cover_daemon_output() {
        assert_eq!(
            default_directives("debug"),
            "tunnel_panel=debug,daemon=debug,tower_http=debug"
        );
    }
}
