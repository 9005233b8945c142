//! Tracing subscriber setup shared by binaries and test harnesses.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::LoggingConfig;

const FALLBACK_FILTER: &str = "info";

/// ## Summary
/// Builds the `EnvFilter` for a configured level, falling back to `info`
/// when the configured directive does not parse.
#[must_use]
pub fn build_filter(config: &LoggingConfig) -> EnvFilter {
    EnvFilter::try_new(config.level.as_str()).unwrap_or_else(|e| {
        tracing::warn!(level = %config.level, error = %e, "Invalid log level in config, using info");
        EnvFilter::new(FALLBACK_FILTER)
    })
}

/// ## Summary
/// Installs the global tracing subscriber.
///
/// Calling this more than once is harmless: later calls leave the first
/// subscriber in place and log at debug level.
pub fn init(config: &LoggingConfig) {
    let result = tracing_subscriber::registry()
        .with(build_filter(config))
        .with(
            fmt::layer()
                .with_target(true)
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true),
        )
        .try_init();

    if let Err(e) = result {
        tracing::debug!(error = %e, "Tracing subscriber already installed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_level_builds_filter() {
        let config = LoggingConfig {
            level: "almanac_recur=trace,warn".to_string(),
        };
        let filter = build_filter(&config);
        assert!(filter.to_string().contains("almanac_recur=trace"));
    }

    #[test]
    fn test_init_is_repeatable() {
        let config = LoggingConfig::default();
        init(&config);
        init(&config);
        tracing::info!("Subscriber still usable after repeated init");
    }

    #[test]
    fn test_invalid_level_falls_back() {
        let config = LoggingConfig {
            level: "almanac=notalevel".to_string(),
        };
        let filter = build_filter(&config);
        assert_eq!(filter.to_string(), "info");
    }
}
