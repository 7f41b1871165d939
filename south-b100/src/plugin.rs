//! `SouthPlugin` implementation for the B100.

use south_common::{
    ConfigCategory, Error, PluginInfo, Reading, Reconfigured, Result, SouthPlugin, local_timestamp,
};
use tracing::{error, info};

use crate::config::{B100Settings, PLUGIN_NAME, PLUGIN_VERSION, default_config, requires_restart};
use crate::poller::B100Poller;

/// Plugin handle: configuration plus the (lazily opened) device connection.
pub struct B100Plugin {
    config: ConfigCategory,
    settings: B100Settings,
    poller: B100Poller,
}

impl B100Plugin {
    pub fn settings(&self) -> &B100Settings {
        &self.settings
    }

    pub fn is_connected(&self) -> bool {
        self.poller.is_connected()
    }
}

impl SouthPlugin for B100Plugin {
    fn info() -> PluginInfo {
        PluginInfo::south_poll(PLUGIN_NAME, PLUGIN_VERSION, default_config())
    }

    fn init(config: &ConfigCategory) -> Result<Self> {
        let settings = B100Settings::from_category(config)?;
        let poller = B100Poller::new(settings.connection.clone());
        Ok(Self {
            config: config.clone(),
            settings,
            poller,
        })
    }

    fn config(&self) -> &ConfigCategory {
        &self.config
    }

    async fn poll(&mut self) -> Result<Vec<Reading>> {
        let values = self.poller.read_all().await.map_err(|e| {
            error!("B100 poll failed: {}", e);
            Error::data_retrieval(format!("Failed to poll B100: {}", e))
        })?;

        Ok(vec![Reading::new(
            self.settings.asset_name.clone(),
            local_timestamp(),
            values,
        )])
    }

    async fn reconfigure(&mut self, new_config: ConfigCategory) -> Result<Reconfigured> {
        info!(
            "Old config for B100 plugin {}",
            serde_json::to_string(&self.config)?
        );
        info!("New config for B100 plugin {}", serde_json::to_string(&new_config)?);

        let changed = self.config.diff(&new_config);
        let settings = B100Settings::from_category(&new_config)?;

        if requires_restart(&changed) {
            info!(
                "Restarting B100 plugin due to change in configuration keys [{}]",
                changed.join(", ")
            );
            self.shutdown().await?;
            *self = Self::init(&new_config)?;
            return Ok(Reconfigured::Restarted);
        }

        self.config = new_config;
        self.settings = settings;
        Ok(Reconfigured::Updated)
    }

    async fn shutdown(&mut self) -> Result<()> {
        if self.poller.close() {
            info!("B100 client connection closed.");
        } else {
            info!("B100 plugin shut down.");
        }
        Ok(())
    }
}
