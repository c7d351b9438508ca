use crate::app_config::{DEFAULT_SCAN_INTERVAL_S, DeviceEntry};
use serde::de::Error;
use serde::{Deserialize, Deserializer};
use std::time::Duration;

impl<'de> Deserialize<'de> for DeviceEntry {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Debug, Deserialize)]
        pub struct Inner {
            id: Option<String>,
            host: String,
            scan_interval: Option<u64>,
        }

        let inner = Inner::deserialize(deserializer)?;
        let host = inner.host.trim();
        if host.is_empty() {
            return Err(Error::custom("invalid device host: must not be empty"));
        }

        if host.contains("://") || host.contains('/') {
            return Err(Error::custom(format!("invalid device host: '{}', expected host[:port] without scheme or path", host)));
        }

        let scan_interval = inner.scan_interval.unwrap_or(DEFAULT_SCAN_INTERVAL_S);
        if scan_interval == 0 {
            return Err(Error::custom("invalid device scan_interval: 0, must be at least 1 second"));
        }

        let id = match inner.id.as_deref().map(str::trim) {
            Some("") => return Err(Error::custom("invalid device id: must not be empty")),
            Some(id) => id.to_string(),
            None => host.to_string(),
        };

        Ok(DeviceEntry {
            id,
            host: host.to_string(),
            scan_interval: Duration::from_secs(scan_interval),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case(json!({ "host": "192.168.1.50" }), DeviceEntry::new("192.168.1.50", "192.168.1.50"))]
    #[case(json!({ "host": " bitaxe.local " }), DeviceEntry::new("bitaxe.local", "bitaxe.local"))]
    #[case(json!({ "id": "garage", "host": "10.0.0.7:8080" }), DeviceEntry::new("garage", "10.0.0.7:8080"))]
    #[case(
        json!({ "host": "192.168.1.50", "scan_interval": 10 }),
        DeviceEntry::new("192.168.1.50", "192.168.1.50").with_scan_interval(Duration::from_secs(10))
    )]
    fn deserializes_valid_entries(#[case] value: serde_json::Value, #[case] expected: DeviceEntry) {
        let result = serde_json::from_value::<DeviceEntry>(value).unwrap();
        assert_eq!(result, expected);
    }

    #[test]
    fn defaults_to_a_fifteen_second_interval() {
        let result = serde_json::from_value::<DeviceEntry>(json!({ "host": "192.168.1.50" })).unwrap();
        assert_eq!(result.scan_interval(), Duration::from_secs(15));
    }

    #[rstest]
    #[case::missing_host(json!({ "scan_interval": 10 }))]
    #[case::empty_host(json!({ "host": "  " }))]
    #[case::scheme(json!({ "host": "http://192.168.1.50" }))]
    #[case::path(json!({ "host": "192.168.1.50/api" }))]
    #[case::zero_interval(json!({ "host": "192.168.1.50", "scan_interval": 0 }))]
    #[case::negative_interval(json!({ "host": "192.168.1.50", "scan_interval": -5 }))]
    #[case::empty_id(json!({ "id": "", "host": "192.168.1.50" }))]
    fn fails_for_an_invalid_entry(#[case] value: serde_json::Value) {
        let result = serde_json::from_value::<DeviceEntry>(value);
        assert!(result.is_err());
    }
}
