use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Reading values keyed by datapoint name.
pub type ReadingMap = BTreeMap<String, ReadingValue>;

/// The envelope handed to the ingestion pipeline for each asset sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    /// Asset name (e.g. "B100", "system/uptime").
    pub asset: String,

    /// Local time of the sample, `YYYY-MM-DD HH:MM:SS.ffffff+HH:MM`.
    pub timestamp: String,

    /// Random UUIDv4 identifying this reading.
    pub key: String,

    /// Datapoint values.
    pub readings: ReadingMap,
}

impl Reading {
    /// Create an envelope with a fresh random key.
    pub fn new(
        asset: impl Into<String>,
        timestamp: impl Into<String>,
        readings: ReadingMap,
    ) -> Self {
        Self {
            asset: asset.into(),
            timestamp: timestamp.into(),
            key: new_reading_key(),
            readings,
        }
    }

    /// Add a single datapoint to this reading.
    pub fn with_value(mut self, name: impl Into<String>, value: impl Into<ReadingValue>) -> Self {
        self.readings.insert(name.into(), value.into());
        self
    }

    /// Look up a datapoint by name.
    pub fn get(&self, name: &str) -> Option<&ReadingValue> {
        self.readings.get(name)
    }
}

/// Typed datapoint value.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum ReadingValue {
    Integer(i64),
    Float(f64),
    Text(String),
}

impl ReadingValue {
    /// Numeric view of the value, if it has one.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ReadingValue::Integer(v) => Some(*v as f64),
            ReadingValue::Float(v) => Some(*v),
            ReadingValue::Text(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ReadingValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl From<i64> for ReadingValue {
    fn from(v: i64) -> Self {
        ReadingValue::Integer(v)
    }
}

impl From<usize> for ReadingValue {
    fn from(v: usize) -> Self {
        ReadingValue::Integer(i64::try_from(v).unwrap_or(i64::MAX))
    }
}

impl From<f64> for ReadingValue {
    fn from(v: f64) -> Self {
        ReadingValue::Float(v)
    }
}

impl From<String> for ReadingValue {
    fn from(v: String) -> Self {
        ReadingValue::Text(v)
    }
}

impl From<&str> for ReadingValue {
    fn from(v: &str) -> Self {
        ReadingValue::Text(v.to_string())
    }
}

/// Current local time in the host's reading timestamp format.
pub fn local_timestamp() -> String {
    chrono::Local::now()
        .format("%Y-%m-%d %H:%M:%S%.6f%:z")
        .to_string()
}

/// Generate a random reading key.
pub fn new_reading_key() -> String {
    uuid::Uuid::new_v4().to_string()
}
