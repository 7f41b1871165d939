//! Harness configuration file.

use std::path::Path;

use serde::{Deserialize, Serialize};
use south_common::{ConfigCategory, Format, LoggingConfig};

use crate::error::{Result, RunnerError};

/// Configuration for running a plugin outside the host.
///
/// ```json5
/// {
///     logging: { level: "info", format: "text" },
///     output: { format: "json" },
///     poll_interval_ms: 2000,
///     // Values merged into the plugin's default category
///     config: { address: "10.0.0.5", port: 502 },
/// }
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HarnessConfig {
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Reading output settings.
    #[serde(default)]
    pub output: OutputConfig,

    /// Overrides the plugin's `pollInterval` item when set.
    #[serde(default)]
    pub poll_interval_ms: Option<u64>,

    /// Category value overrides, keyed by item name.
    #[serde(default)]
    pub config: serde_json::Map<String, serde_json::Value>,
}

/// Where and how readings are written.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Serialization format for reading envelopes.
    #[serde(default)]
    pub format: Format,
}

impl HarnessConfig {
    /// Load configuration from a JSON5 file.
    ///
    /// Calls [`validate`](Self::validate) after loading.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(RunnerError::ConfigNotFound {
                path: path.display().to_string(),
            });
        }

        let content = std::fs::read_to_string(path)?;
        let config: Self = json5::from_str(&content)?;

        config.validate()?;

        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.poll_interval_ms == Some(0) {
            return Err(RunnerError::validation("poll_interval_ms must be > 0"));
        }
        Ok(())
    }

    /// Merge the configured values into a plugin's default category.
    pub fn merged_category(&self, defaults: &ConfigCategory) -> Result<ConfigCategory> {
        let mut category = defaults.clone();
        category
            .merge_values(&self.config)
            .map_err(|e| RunnerError::validation(e.to_string()))?;
        Ok(category)
    }
}
