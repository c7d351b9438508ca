use crate::domain::sensor::SensorEntity;
use crate::domain::sensor_key::SensorKey;
use std::collections::BTreeMap;

/// A configured miner and the sensor entities registered for it.
#[derive(PartialEq, Debug, Clone)]
pub struct Device {
    pub id: String,
    pub host: String,
    pub name: String,
    pub sensors: BTreeMap<SensorKey, SensorEntity>,
}

impl Device {
    /// Creates a device with one uninitialized entity per known sensor key, named after its host until
    /// the device reports a hostname.
    pub fn new(id: impl Into<String>, host: impl Into<String>) -> Self {
        let id = id.into();
        let host = host.into();
        let sensors = SensorKey::ALL.into_iter().map(|key| (key, SensorEntity::new(&id, key))).collect();

        Device {
            name: host.clone(),
            id,
            host,
            sensors,
        }
    }
}
