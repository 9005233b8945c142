use anyhow::Result;
use config::Config;
use serde::Deserialize;

use crate::error::{CoreError, CoreResult};

/// Iteration bound applied when no configuration overrides it.
pub const DEFAULT_MAX_ITERATIONS: usize = 10_000;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    pub recurrence: RecurrenceConfig,
    pub logging: LoggingConfig,
}

/// Bounds applied to every recurrence expansion.
#[derive(Debug, Clone, Deserialize)]
pub struct RecurrenceConfig {
    /// Hard cap on stepper iterations for a single expansion.
    pub max_iterations: usize,
    /// Optional cap on occurrences emitted by a single expansion. Unset by
    /// default; a rule's own `count` is then the only limit on output.
    #[serde(default)]
    pub max_instances: Option<usize>,
}

impl Default for RecurrenceConfig {
    fn default() -> Self {
        Self {
            max_iterations: DEFAULT_MAX_ITERATIONS,
            max_instances: None,
        }
    }
}

impl RecurrenceConfig {
    /// ## Summary
    /// Rejects bounds that would make every expansion empty.
    ///
    /// ## Errors
    /// Returns `CoreError::ConfigError` if the iteration bound or a configured
    /// instance cap is zero.
    pub fn validate(&self) -> CoreResult<()> {
        if self.max_iterations == 0 {
            return Err(CoreError::ConfigError(
                "recurrence.max_iterations must be at least 1".to_string(),
            ));
        }
        if self.max_instances == Some(0) {
            return Err(CoreError::ConfigError(
                "recurrence.max_instances must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl Settings {
    /// ## Summary
    /// Loads configuration from `.env` file and environment variables into a `Settings`.
    /// Environment variables take precedence over `config.toml` values.
    ///
    /// ## Errors
    /// Returns an error if building the configuration, deserializing it, or
    /// validating the recurrence bounds fails.
    pub fn load() -> Result<Self> {
        #[expect(clippy::cast_possible_wrap)]
        let settings = Config::builder()
            .set_default("recurrence.max_iterations", DEFAULT_MAX_ITERATIONS as i64)?
            .set_default("logging.level", "info")?
            // TOML file
            .add_source(config::File::with_name("config.toml").required(false))
            // Env file
            .add_source(
                config::Environment::with_prefix("ALMANAC")
                    .prefix_separator("_")
                    .separator("__")
                    .ignore_empty(true)
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize::<Settings>()?;

        settings.recurrence.validate()?;
        Ok(settings)
    }
}

/// ## Summary
/// Loads configuration from environment variables and `.env` file.
///
/// ## Errors
/// Returns an error if loading or deserializing the configuration fails.
pub fn load_config() -> Result<Settings> {
    dotenvy::dotenv().ok();

    Settings::load()
}
