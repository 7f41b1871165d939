//! South Plugins Common Library
//!
//! Shared types and utilities for South data-collection plugins:
//!
//! - [`reading`] - Reading envelope (`Reading`, `ReadingValue`) and timestamps
//! - [`config`] - Configuration categories and JSON5 loading
//! - [`plugin`] - The `SouthPlugin` lifecycle contract
//! - [`serialization`] - JSON/CBOR encoding and decoding
//! - [`error`] - Error types

pub mod config;
pub mod error;
pub mod plugin;
pub mod reading;
pub mod serialization;

// Re-export commonly used types at the crate root
pub use config::{
    ConfigCategory, ConfigItem, ItemType, LogFormat, LoggingConfig, load_config, parse_config,
};
pub use error::{Error, Result};
pub use plugin::{PluginInfo, PluginMode, PluginType, Reconfigured, SouthPlugin};
pub use reading::{Reading, ReadingMap, ReadingValue, local_timestamp, new_reading_key};
pub use serialization::{Format, decode, decode_auto, encode, encode_into};

/// Initialize tracing with the given configuration.
///
/// Supports two output formats:
/// - `LogFormat::Text` (default): Human-readable text format
/// - `LogFormat::Json`: Structured JSON format for log aggregation systems
///
/// `RUST_LOG` takes precedence over the configured level.
pub fn init_tracing(config: &LoggingConfig) -> Result<()> {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    // Logs go to stderr; stdout carries readings.
    match config.format {
        LogFormat::Text => {
            tracing_subscriber::registry()
                .with(fmt::layer().with_writer(std::io::stderr))
                .with(filter)
                .try_init()
                .map_err(|e| Error::Config(format!("Failed to initialize tracing: {}", e)))?;
        }
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(fmt::layer().json().with_writer(std::io::stderr))
                .with(filter)
                .try_init()
                .map_err(|e| Error::Config(format!("Failed to initialize tracing: {}", e)))?;
        }
    }

    Ok(())
}
