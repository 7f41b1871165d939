//! Configuration category for the systeminfo plugin.

use south_common::{ConfigCategory, ConfigItem, ItemType, Result};

/// Plugin name reported by `plugin_info`.
pub const PLUGIN_NAME: &str = "System Info plugin";

/// Plugin version reported by `plugin_info`.
pub const PLUGIN_VERSION: &str = "1.5.0";

/// Item holding the prefix prepended to every asset name.
pub const ASSET_PREFIX_ITEM: &str = "assetNamePrefix";

/// The plugin's default configuration category.
pub fn default_config() -> ConfigCategory {
    ConfigCategory::new()
        .with_item(
            "plugin",
            ConfigItem::new(ItemType::String, "System info async plugin", "systeminfo").readonly(),
        )
        .with_item(
            ASSET_PREFIX_ITEM,
            ConfigItem::new(ItemType::String, "Asset prefix", "system/")
                .order(1)
                .display_name("Asset Name Prefix"),
        )
}

/// Asset name prefix from a category. An empty prefix is allowed.
pub fn asset_prefix(config: &ConfigCategory) -> Result<String> {
    config
        .value(ASSET_PREFIX_ITEM)
        .map(str::to_string)
        .ok_or_else(|| south_common::Error::config(format!("missing item '{}'", ASSET_PREFIX_ITEM)))
}
