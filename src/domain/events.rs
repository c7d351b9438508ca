use crate::domain::device::Device;
use crate::domain::sensor::SensorState;
use crate::domain::sensor_key::SensorKey;

#[derive(Debug)]
pub enum Event {
    DeviceRegistered(Device),
    SensorsUpdated {
        device_id: String,
        hostname: Option<String>,
        states: Vec<(SensorKey, SensorState)>,
    },
    DeviceRemoved {
        device_id: String,
    },
}
