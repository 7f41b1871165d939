//! Wire encodings for reading envelopes.

use std::io::Write;

use serde::{Serialize, de::DeserializeOwned};

use crate::error::{Error, Result};

/// Serialization format for reading envelopes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    #[default]
    Json,
    /// Self-delimiting items, so envelopes can be written back to back.
    Cbor,
}

/// Serialize `value` straight into `writer`.
pub fn encode_into<T: Serialize, W: Write>(
    writer: &mut W,
    value: &T,
    format: Format,
) -> Result<()> {
    match format {
        Format::Json => serde_json::to_writer(writer, value)?,
        Format::Cbor => ciborium::into_writer(value, writer)?,
    }
    Ok(())
}

/// Serialize `value` into a fresh buffer.
pub fn encode<T: Serialize>(value: &T, format: Format) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    encode_into(&mut buf, value, format)?;
    Ok(buf)
}

/// Decode one value.
pub fn decode<T: DeserializeOwned>(data: &[u8], format: Format) -> Result<T> {
    match format {
        Format::Json => Ok(serde_json::from_slice(data)?),
        Format::Cbor => Ok(ciborium::from_reader(data)?),
    }
}

/// Guess the format: JSON if the first non-whitespace byte opens an object
/// or array, CBOR otherwise.
pub fn detect_format(data: &[u8]) -> Format {
    match data.iter().copied().find(|b| !b.is_ascii_whitespace()) {
        Some(b'{' | b'[') => Format::Json,
        _ => Format::Cbor,
    }
}

/// Decode one value of either format.
pub fn decode_auto<T: DeserializeOwned>(data: &[u8]) -> Result<T> {
    decode(data, detect_format(data))
}
