use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Type of a configuration item, as understood by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemType {
    String,
    Integer,
    Float,
    Boolean,
    Enumeration,
}

/// A single entry of a configuration category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigItem {
    pub description: String,

    #[serde(rename = "type")]
    pub item_type: ItemType,

    /// Default value, always in string form.
    pub default: String,

    /// Current value, set by the host when the category is merged.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub readonly: Option<String>,

    /// Allowed values for enumeration items.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
}

impl ConfigItem {
    pub fn new(
        item_type: ItemType,
        description: impl Into<String>,
        default: impl Into<String>,
    ) -> Self {
        Self {
            description: description.into(),
            item_type,
            default: default.into(),
            value: None,
            order: None,
            display_name: None,
            readonly: None,
            options: Vec::new(),
        }
    }

    pub fn order(mut self, order: u32) -> Self {
        self.order = Some(order.to_string());
        self
    }

    pub fn display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    pub fn readonly(mut self) -> Self {
        self.readonly = Some("true".to_string());
        self
    }

    pub fn options<I, S>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options = options.into_iter().map(Into::into).collect();
        self
    }

    /// Effective value: the current value if set, else the default.
    pub fn effective(&self) -> &str {
        self.value.as_deref().unwrap_or(&self.default)
    }

    pub fn is_readonly(&self) -> bool {
        self.readonly.as_deref() == Some("true")
    }

    /// Check that `value` is acceptable for this item's type.
    fn check(&self, name: &str, value: &str) -> Result<()> {
        let ok = match self.item_type {
            ItemType::String => true,
            ItemType::Integer => value.trim().parse::<i64>().is_ok(),
            ItemType::Float => value.trim().parse::<f64>().is_ok(),
            ItemType::Boolean => matches!(value, "true" | "false"),
            ItemType::Enumeration => self.options.iter().any(|o| o == value),
        };

        if ok {
            Ok(())
        } else {
            Err(Error::validation(format!(
                "'{}' is not a valid {:?} value for item '{}'",
                value, self.item_type, name
            )))
        }
    }
}

/// A named set of configuration items, serialized as a JSON object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConfigCategory(BTreeMap<String, ConfigItem>);

impl ConfigCategory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an item to the category.
    pub fn with_item(mut self, name: impl Into<String>, item: ConfigItem) -> Self {
        self.0.insert(name.into(), item);
        self
    }

    pub fn get(&self, name: &str) -> Option<&ConfigItem> {
        self.0.get(name)
    }

    /// Effective value of an item.
    pub fn value(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(ConfigItem::effective)
    }

    /// Effective value of an item, parsed into `T`.
    pub fn parse<T>(&self, name: &str) -> Result<T>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        let raw = self
            .value(name)
            .ok_or_else(|| Error::config(format!("Missing configuration item '{}'", name)))?;
        raw.trim()
            .parse()
            .map_err(|e| Error::config(format!("Invalid value '{}' for '{}': {}", raw, name, e)))
    }

    /// Set the current value of an existing item, checking its type.
    pub fn set_value(&mut self, name: &str, value: impl Into<String>) -> Result<()> {
        let value = value.into();
        let item = self
            .0
            .get_mut(name)
            .ok_or_else(|| Error::validation(format!("Unknown configuration item '{}'", name)))?;

        if item.is_readonly() && value != item.effective() {
            return Err(Error::validation(format!(
                "Configuration item '{}' is read-only",
                name
            )));
        }

        item.check(name, &value)?;
        item.value = Some(value);
        Ok(())
    }

    /// Apply a JSON object of value overrides.
    ///
    /// Strings are taken as-is; numbers and booleans use their text form.
    pub fn merge_values(
        &mut self,
        overrides: &serde_json::Map<String, serde_json::Value>,
    ) -> Result<()> {
        for (name, value) in overrides {
            let text = match value {
                serde_json::Value::String(s) => s.clone(),
                // JSON5 may hand integral numbers over as floats.
                serde_json::Value::Number(n) => match n.as_f64() {
                    Some(f) if n.is_f64() && f.fract() == 0.0 => format!("{}", f as i64),
                    _ => n.to_string(),
                },
                serde_json::Value::Bool(b) => b.to_string(),
                other => {
                    return Err(Error::validation(format!(
                        "Unsupported value {} for configuration item '{}'",
                        other, name
                    )));
                }
            };
            tracing::debug!(item = %name, value = %text, "Applying configuration override");
            self.set_value(name, text)?;
        }
        Ok(())
    }

    /// Names of items whose effective value differs between `self` and `other`,
    /// including items present in only one of them.
    pub fn diff(&self, other: &ConfigCategory) -> Vec<String> {
        let mut changed: Vec<String> = self
            .0
            .iter()
            .filter(|(name, item)| other.value(name) != Some(item.effective()))
            .map(|(name, _)| name.clone())
            .collect();

        changed.extend(
            other
                .0
                .keys()
                .filter(|name| !self.0.contains_key(*name))
                .cloned(),
        );
        changed.sort();
        changed
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable text format (default).
    #[default]
    Text,
    /// Structured JSON format.
    Json,
}

/// Common logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log output format: "text" or "json".
    #[serde(default)]
    pub format: LogFormat,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

/// Load a configuration file in JSON5 format.
pub fn load_config<T: for<'de> Deserialize<'de>>(path: impl AsRef<Path>) -> Result<T> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| {
        Error::Config(format!(
            "Failed to read config file '{}': {}",
            path.display(),
            e
        ))
    })?;

    json5::from_str(&content).map_err(|e| {
        Error::Config(format!(
            "Failed to parse config file '{}': {}",
            path.display(),
            e
        ))
    })
}

/// Load a configuration from a JSON5 string.
pub fn parse_config<T: for<'de> Deserialize<'de>>(content: &str) -> Result<T> {
    json5::from_str(content).map_err(|e| Error::Config(format!("Failed to parse config: {}", e)))
}
