//! The lifecycle contract between a South plugin and its host.
//!
//! The host calls, in order: [`SouthPlugin::info`] to discover the plugin and
//! its default configuration, [`SouthPlugin::init`] with the merged category,
//! [`SouthPlugin::poll`] once per poll interval, [`SouthPlugin::reconfigure`]
//! whenever the category changes, and [`SouthPlugin::shutdown`] before the
//! service stops.

use serde::{Deserialize, Serialize};
use std::future::Future;

use crate::config::ConfigCategory;
use crate::error::Result;
use crate::reading::Reading;

/// Interface version implemented by the plugins in this workspace.
pub const INTERFACE_VERSION: &str = "1.0";

/// How the host drives the plugin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PluginMode {
    Poll,
}

/// Which side of the host the plugin sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PluginType {
    South,
}

/// Plugin description returned by `plugin_info`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PluginInfo {
    pub name: String,
    pub version: String,
    pub mode: PluginMode,
    #[serde(rename = "type")]
    pub plugin_type: PluginType,
    pub interface: String,
    /// Default configuration category.
    pub config: ConfigCategory,
}

impl PluginInfo {
    /// Describe a polled South plugin.
    pub fn south_poll(
        name: impl Into<String>,
        version: impl Into<String>,
        config: ConfigCategory,
    ) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            mode: PluginMode::Poll,
            plugin_type: PluginType::South,
            interface: INTERFACE_VERSION.to_string(),
            config,
        }
    }
}

/// Outcome of a reconfigure call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reconfigured {
    /// Connection-level settings changed; the plugin was shut down and re-initialised.
    Restarted,
    /// The new configuration was taken over in place.
    Updated,
}

impl Reconfigured {
    pub fn is_restart(&self) -> bool {
        matches!(self, Reconfigured::Restarted)
    }
}

/// A data-source adapter polled by the host.
///
/// The implementing value is the plugin handle: it owns a deep copy of its
/// configuration category and any device connection.
pub trait SouthPlugin: Sized + Send {
    /// Describe the plugin and its default configuration.
    fn info() -> PluginInfo;

    /// Build a handle from the merged configuration category.
    fn init(config: &ConfigCategory) -> Result<Self>;

    /// The configuration this handle was built from.
    fn config(&self) -> &ConfigCategory;

    /// Collect one sample.
    fn poll(&mut self) -> impl Future<Output = Result<Vec<Reading>>> + Send;

    /// Take over a changed configuration category.
    fn reconfigure(
        &mut self,
        new_config: ConfigCategory,
    ) -> impl Future<Output = Result<Reconfigured>> + Send;

    /// Release resources before the service stops.
    fn shutdown(&mut self) -> impl Future<Output = Result<()>> + Send;
}
