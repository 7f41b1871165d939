//! Integration tests for south-common library.

use south_common::{
    ConfigCategory, ConfigItem, Format, ItemType, Reading, ReadingMap, ReadingValue, decode_auto,
    encode, local_timestamp, parse_config,
};

fn b100_like_category() -> ConfigCategory {
    ConfigCategory::new()
        .with_item(
            "assetName",
            ConfigItem::new(ItemType::String, "Asset name", "B100").order(1),
        )
        .with_item(
            "pollInterval",
            ConfigItem::new(ItemType::Integer, "Poll interval (ms)", "1000").order(2),
        )
        .with_item(
            "address",
            ConfigItem::new(ItemType::String, "Address of Modbus TCP server", "127.0.0.1").order(3),
        )
}

#[test]
fn test_host_merge_then_diff_workflow() {
    let defaults = b100_like_category();

    // The host merges stored values into the plugin's default category.
    let overrides: serde_json::Map<String, serde_json::Value> =
        parse_config(r#"{ address: "10.1.1.20", pollInterval: 5000 }"#).expect("parse failed");
    let mut merged = defaults.clone();
    merged.merge_values(&overrides).expect("merge failed");

    assert_eq!(merged.parse::<u64>("pollInterval").unwrap(), 5000);
    assert_eq!(
        defaults.diff(&merged),
        vec!["address".to_string(), "pollInterval".to_string()]
    );

    // Serialized category still carries defaults alongside values.
    let json = serde_json::to_value(&merged).unwrap();
    assert_eq!(json["address"]["default"], "127.0.0.1");
    assert_eq!(json["address"]["value"], "10.1.1.20");
}

#[test]
fn test_reading_envelope_workflow() {
    let timestamp = local_timestamp();
    let mut values = ReadingMap::new();
    values.insert("running".to_string(), ReadingValue::Integer(3));

    let readings = vec![
        Reading::new("system/processes", timestamp.clone(), values),
        Reading::new("system/hostName", timestamp.clone(), ReadingMap::new())
            .with_value("hostName", "edge01"),
    ];

    assert!(readings.iter().all(|r| r.timestamp == timestamp));
    assert_ne!(readings[0].key, readings[1].key);

    for format in [Format::Json, Format::Cbor] {
        let bytes = encode(&readings, format).expect("encode failed");
        let decoded: Vec<Reading> = decode_auto(&bytes).expect("decode failed");
        assert_eq!(decoded.len(), 2);
        assert_eq!(decoded[1].get("hostName"), Some(&ReadingValue::from("edge01")));
    }
}
