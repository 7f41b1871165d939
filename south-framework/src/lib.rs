//! South Plugin Framework
//!
//! A minimal stand-in for the host's South service, used to run a plugin
//! from the command line.
//!
//! # Overview
//!
//! This framework provides:
//! - [`PluginArgs`] for common CLI argument parsing
//! - [`HarnessConfig`] for the JSON5 file holding logging, output and category overrides
//! - [`PluginRunner`] for driving `init`/`poll`/`reconfigure`/`shutdown`
//! - [`ReadingSink`] for writing reading envelopes to stdout
//!
//! # Example
//!
//! ```ignore
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     south_framework::run_plugin::<MyPlugin>("myplugin.json5").await
//! }
//! ```

mod args;
mod config;
mod error;
mod runner;
mod sink;

pub use args::PluginArgs;
pub use config::{HarnessConfig, OutputConfig};
pub use error::{Result, RunnerError};
pub use runner::{DEFAULT_POLL_INTERVAL_MS, POLL_INTERVAL_ITEM, PluginRunner, run_plugin};
pub use sink::{BatchStats, ReadingSink, SinkStats};

// Re-export commonly used types from south-common
pub use south_common::{
    ConfigCategory, Format, LoggingConfig, Reading, ReadingValue, Reconfigured, SouthPlugin,
};
