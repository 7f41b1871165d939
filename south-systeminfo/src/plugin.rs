//! `SouthPlugin` implementation for host system information.

use south_common::{ConfigCategory, PluginInfo, Reading, Reconfigured, Result, SouthPlugin};
use tracing::{error, info};

use crate::collector::SystemCollector;
use crate::config::{PLUGIN_NAME, PLUGIN_VERSION, asset_prefix, default_config};
use crate::source::{HostSource, SystemSource};

/// Plugin handle reading from a [`SystemSource`].
pub struct SystemInfoPlugin<S = HostSource> {
    config: ConfigCategory,
    prefix: String,
    collector: SystemCollector<S>,
}

impl<S: SystemSource> SystemInfoPlugin<S> {
    /// Build a handle reading from `source` instead of the local machine.
    pub fn with_source(config: &ConfigCategory, source: S) -> Result<Self> {
        Ok(Self {
            config: config.clone(),
            prefix: asset_prefix(config)?,
            collector: SystemCollector::new(source),
        })
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }
}

impl<S: SystemSource + Default> SouthPlugin for SystemInfoPlugin<S> {
    fn info() -> PluginInfo {
        PluginInfo::south_poll(PLUGIN_NAME, PLUGIN_VERSION, default_config())
    }

    fn init(config: &ConfigCategory) -> Result<Self> {
        Self::with_source(config, S::default())
    }

    fn config(&self) -> &ConfigCategory {
        &self.config
    }

    async fn poll(&mut self) -> Result<Vec<Reading>> {
        self.collector.collect(&self.prefix).await.inspect_err(|e| {
            error!("System Info exception: {}", e);
        })
    }

    async fn reconfigure(&mut self, new_config: ConfigCategory) -> Result<Reconfigured> {
        info!(
            "Old config for systeminfo plugin {} \n new config {}",
            serde_json::to_string(&self.config)?,
            serde_json::to_string(&new_config)?
        );

        self.prefix = asset_prefix(&new_config)?;
        self.config = new_config;
        Ok(Reconfigured::Updated)
    }

    async fn shutdown(&mut self) -> Result<()> {
        info!("system info plugin shut down.");
        Ok(())
    }
}
