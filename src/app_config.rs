use config::{Config, ConfigError};
use serde::Deserialize;
use std::collections::HashSet;
use std::time::Duration;

pub const DEFAULT_SCAN_INTERVAL_S: u64 = 15;

#[derive(Debug, Deserialize)]
pub struct AppConfig {
    core: Core,
    http: Http,
    #[serde(default)]
    devices: Vec<DeviceEntry>,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let config = Config::builder()
            .add_source(config::File::with_name("config").required(true))
            .add_source(config::File::with_name("config_local").required(false))
            .add_source(config::Environment::with_prefix("AXEOS").separator("__"))
            .build()?;

        Self::from_config(config)
    }

    fn from_config(config: Config) -> Result<Self, ConfigError> {
        let app_config: AppConfig = config.try_deserialize()?;

        let mut ids = HashSet::with_capacity(app_config.devices.len());
        if let Some(duplicate) = app_config.devices.iter().find(|entry| !ids.insert(entry.id())) {
            return Err(ConfigError::Message(format!("device id '{}' is configured more than once", duplicate.id())));
        }

        Ok(app_config)
    }

    pub fn core(&self) -> &Core {
        &self.core
    }

    pub fn http(&self) -> &Http {
        &self.http
    }

    pub fn devices(&self) -> &[DeviceEntry] {
        &self.devices
    }
}

#[derive(Debug, Deserialize)]
pub struct Core {
    store_buffer_size: usize,
}

impl Core {
    pub fn store_buffer_size(&self) -> usize {
        self.store_buffer_size
    }
}

#[derive(Debug, Deserialize)]
pub struct Http {
    #[serde(with = "humantime_serde")]
    request_timeout: Duration,
}

impl Http {
    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }
}

/// One configured miner. Deserialized through `device_entry_deserializer`, which validates the host and interval.
#[derive(PartialEq, Debug, Clone)]
pub struct DeviceEntry {
    pub(crate) id: String,
    pub(crate) host: String,
    pub(crate) scan_interval: Duration,
}

impl DeviceEntry {
    #[cfg(test)]
    pub fn new(id: impl Into<String>, host: impl Into<String>) -> Self {
        DeviceEntry {
            id: id.into(),
            host: host.into(),
            scan_interval: Duration::from_secs(DEFAULT_SCAN_INTERVAL_S),
        }
    }

    #[cfg(test)]
    pub fn with_scan_interval(mut self, scan_interval: Duration) -> Self {
        self.scan_interval = scan_interval;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn scan_interval(&self) -> Duration {
        self.scan_interval
    }
}

#[cfg(test)]
pub struct AppConfigBuilder {
    config: AppConfig,
}

#[cfg(test)]
impl AppConfigBuilder {
    pub fn new() -> Self {
        AppConfigBuilder {
            config: AppConfig {
                core: Core { store_buffer_size: 1 },
                http: Http {
                    request_timeout: Duration::from_secs(5),
                },
                devices: vec![],
            },
        }
    }

    pub fn request_timeout(mut self, request_timeout: Duration) -> Self {
        self.config.http.request_timeout = request_timeout;
        self
    }

    pub fn build(self) -> AppConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::{File, FileFormat};
    use pretty_assertions::assert_eq;

    fn load(toml: &str) -> Result<AppConfig, ConfigError> {
        let config = Config::builder().add_source(File::from_str(toml, FileFormat::Toml)).build()?;
        AppConfig::from_config(config)
    }

    #[test]
    fn loads_devices() -> Result<(), ConfigError> {
        let config = load(
            r#"
            [core]
            store_buffer_size = 64

            [http]
            request_timeout = "5s"

            [[devices]]
            host = "192.168.1.50"

            [[devices]]
            id = "garage"
            host = "bitaxe.local:8080"
            scan_interval = 60
            "#,
        )?;

        assert_eq!(config.core().store_buffer_size(), 64);
        assert_eq!(config.http().request_timeout(), Duration::from_secs(5));
        assert_eq!(
            config.devices(),
            &[
                DeviceEntry::new("192.168.1.50", "192.168.1.50"),
                DeviceEntry::new("garage", "bitaxe.local:8080").with_scan_interval(Duration::from_secs(60)),
            ]
        );

        Ok(())
    }

    #[test]
    fn devices_are_optional() -> Result<(), ConfigError> {
        let config = load("[core]\nstore_buffer_size = 8\n[http]\nrequest_timeout = \"250ms\"\n")?;

        assert!(config.devices().is_empty());
        assert_eq!(config.http().request_timeout(), Duration::from_millis(250));

        Ok(())
    }

    #[test]
    fn rejects_duplicate_device_ids() {
        let result = load(
            r#"
            [core]
            store_buffer_size = 64
            [http]
            request_timeout = "5s"
            [[devices]]
            host = "192.168.1.50"
            [[devices]]
            id = "192.168.1.50"
            host = "192.168.1.51"
            "#,
        );

        let error = result.expect_err("duplicate ids must be rejected");
        assert!(error.to_string().contains("configured more than once"));
    }

    #[test]
    fn rejects_an_invalid_device() {
        let result = load(
            r#"
            [core]
            store_buffer_size = 64
            [http]
            request_timeout = "5s"
            [[devices]]
            host = "http://192.168.1.50"
            "#,
        );

        assert!(result.is_err());
    }
}
