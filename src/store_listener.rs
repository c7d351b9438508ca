use crate::domain::device::Device;
use crate::domain::sensor::{SensorState, SensorValue};
use crate::store::DeviceMap;
use tokio::sync::watch::Receiver;
use tracing::{info, instrument, warn};

#[derive(PartialEq, Debug, Default, Clone, Copy)]
pub struct DeviceSummary {
    pub live: usize,
    pub unknown: usize,
    pub errored: usize,
    pub uninitialized: usize,
}

pub fn summarize(device: &Device) -> DeviceSummary {
    device.sensors.values().fold(DeviceSummary::default(), |mut summary, sensor| {
        match sensor.state() {
            SensorState::Uninitialized => summary.uninitialized += 1,
            SensorState::Live(SensorValue::Unknown) => summary.unknown += 1,
            SensorState::Live(_) => summary.live += 1,
            SensorState::Errored(_) => summary.errored += 1,
        }
        summary
    })
}

/// Logs a line per device whenever the store changes and the device's summary differs from the last one logged.
#[instrument(skip_all)]
pub async fn store_listener(mut rx: Receiver<DeviceMap>) {
    let mut last_summaries = std::collections::HashMap::new();

    while rx.changed().await.is_ok() {
        let devices = rx.borrow_and_update().clone();
        let read_guard = devices.read().await;

        last_summaries.retain(|device_id: &String, _| read_guard.contains_key(device_id));
        for device in read_guard.values() {
            let summary = summarize(device);
            if last_summaries.get(&device.id) == Some(&summary) {
                continue;
            }

            if summary.errored > 0 {
                let cause = device.sensors.values().find_map(|sensor| match sensor.state() {
                    SensorState::Errored(_) => Some(sensor.state().to_string()),
                    _ => None,
                });
                warn!(device_id = device.id, host = device.host, "📟 '{}' is unavailable: {}", device.name, cause.unwrap_or_default());
            } else {
                let last_updated = device.sensors.values().filter_map(|sensor| sensor.last_updated()).max();
                #[rustfmt::skip]
                info!(device_id = device.id, host = device.host, ?last_updated, "📟 '{}': {} live, {} unknown, {} pending", device.name, summary.live, summary.unknown, summary.uninitialized);
            }
            last_summaries.insert(device.id.clone(), summary);
        }
    }
}
