//! Configuration category for the B100 plugin.

use south_common::{ConfigCategory, ConfigItem, Error, ItemType, Result};
use std::fmt;
use std::str::FromStr;

/// Plugin name reported by `plugin_info`.
pub const PLUGIN_NAME: &str = "b100";

/// Plugin version reported by `plugin_info`.
pub const PLUGIN_VERSION: &str = "1.0.0";

/// Items whose change requires a new device connection.
pub const CONNECTION_ITEMS: [&str; 4] = ["address", "port", "framer", "timeout"];

/// The plugin's default configuration category.
pub fn default_config() -> ConfigCategory {
    ConfigCategory::new()
        .with_item(
            "plugin",
            ConfigItem::new(ItemType::String, "B100 South Service Plugin", PLUGIN_NAME).readonly(),
        )
        .with_item(
            "assetName",
            ConfigItem::new(ItemType::String, "Asset name", "B100")
                .order(1)
                .display_name("Asset Name"),
        )
        .with_item(
            "pollInterval",
            ConfigItem::new(
                ItemType::Integer,
                "The interval between poll calls to the device poll routine, expressed in milliseconds.",
                "1000",
            )
            .order(2)
            .display_name("Poll Interval"),
        )
        .with_item(
            "address",
            ConfigItem::new(ItemType::String, "Address of Modbus TCP server", "127.0.0.1")
                .order(3)
                .display_name("Address"),
        )
        .with_item(
            "port",
            ConfigItem::new(ItemType::Integer, "Port of Modbus TCP server", "502")
                .order(4)
                .display_name("Port"),
        )
        .with_item(
            "framer",
            ConfigItem::new(
                ItemType::Enumeration,
                "Frame format on the TCP stream: RTU frames (serial gateway) or MBAP (native Modbus TCP)",
                Framer::Rtu.as_str(),
            )
            .options([Framer::Rtu.as_str(), Framer::Tcp.as_str()])
            .order(5)
            .display_name("Framer"),
        )
        .with_item(
            "timeout",
            ConfigItem::new(
                ItemType::Integer,
                "Connect and read timeout, expressed in milliseconds.",
                "3000",
            )
            .order(6)
            .display_name("Timeout"),
        )
}

/// Whether a config diff touches the device connection.
pub fn requires_restart(changed: &[String]) -> bool {
    changed.iter().any(|name| CONNECTION_ITEMS.contains(&name.as_str()))
}

/// Framing used on the TCP stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Framer {
    /// RTU frames (address + PDU + CRC) carried over TCP.
    Rtu,
    /// Native Modbus TCP with an MBAP header.
    Tcp,
}

impl Framer {
    pub fn as_str(&self) -> &'static str {
        match self {
            Framer::Rtu => "rtu",
            Framer::Tcp => "tcp",
        }
    }
}

impl fmt::Display for Framer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Framer {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "rtu" => Ok(Framer::Rtu),
            "tcp" => Ok(Framer::Tcp),
            other => Err(format!("unknown framer '{}' (use rtu or tcp)", other)),
        }
    }
}

/// Settings needed to reach the device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionSettings {
    /// Host address (IP or hostname)
    pub address: String,
    /// TCP port
    pub port: u16,
    pub framer: Framer,
    /// Connect and per-read timeout in milliseconds
    pub timeout_ms: u64,
}

/// Typed view of the plugin's configuration category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct B100Settings {
    pub asset_name: String,
    pub poll_interval_ms: u64,
    pub connection: ConnectionSettings,
}

impl B100Settings {
    /// Extract and validate settings from a category.
    pub fn from_category(config: &ConfigCategory) -> Result<Self> {
        let settings = Self {
            asset_name: config.parse("assetName")?,
            poll_interval_ms: config.parse("pollInterval")?,
            connection: ConnectionSettings {
                address: config.parse("address")?,
                port: config.parse("port")?,
                framer: config.parse("framer")?,
                timeout_ms: config.parse("timeout")?,
            },
        };
        settings.validate()?;
        Ok(settings)
    }

    /// Validate the settings.
    pub fn validate(&self) -> Result<()> {
        if self.asset_name.trim().is_empty() {
            return Err(Error::validation("assetName cannot be empty"));
        }
        if self.poll_interval_ms == 0 {
            return Err(Error::validation("pollInterval must be > 0"));
        }
        if self.connection.address.trim().is_empty() {
            return Err(Error::validation("address cannot be empty"));
        }
        if self.connection.port == 0 {
            return Err(Error::validation("port must be 1-65535"));
        }
        if self.connection.timeout_ms == 0 {
            return Err(Error::validation("timeout must be > 0"));
        }
        Ok(())
    }
}
