//! CLI argument parsing for plugin binaries.

use std::path::PathBuf;

use clap::Parser;

/// Common CLI arguments for all plugin binaries.
#[derive(Parser, Debug, Clone)]
#[command(about = "Run a South plugin outside the host")]
pub struct PluginArgs {
    /// Path to configuration file (JSON5).
    #[arg(short, long)]
    pub config: PathBuf,

    /// Override log level (trace, debug, info, warn, error).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Print the plugin information and default configuration, then exit.
    #[arg(long)]
    pub info: bool,

    /// Poll once, write the readings and shut down.
    #[arg(long)]
    pub once: bool,
}

impl PluginArgs {
    /// Parse CLI arguments with a default config path.
    ///
    /// If no `--config` argument is provided, uses the default.
    pub fn parse_with_default(default_config: &'static str) -> Self {
        let matches = <Self as clap::CommandFactory>::command()
            .mut_arg("config", |arg| arg.default_value(default_config))
            .get_matches();

        <Self as clap::FromArgMatches>::from_arg_matches(&matches).unwrap_or_else(|e| e.exit())
    }
}
