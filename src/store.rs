use crate::domain::device::Device;
use crate::domain::events::Event;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::mpsc::Receiver;
use tokio::sync::watch::{Receiver as WatchReceiver, Sender as WatchSender};
use tokio::sync::{RwLock, watch};
use tracing::{debug, info, instrument, trace, warn};

pub type DeviceMap = Arc<RwLock<HashMap<String, Device>>>;

/// Owns the registered devices and their sensor entities. Coordinators only talk to it through events.
#[derive(Debug)]
pub struct Store {
    devices: DeviceMap,
    rx: Receiver<Event>,
    notifier_tx: WatchSender<DeviceMap>,
    notifier_rx: WatchReceiver<DeviceMap>,
}

impl Store {
    pub fn new(rx: Receiver<Event>) -> Self {
        let devices = Arc::new(RwLock::new(HashMap::new()));
        let (notifier_tx, notifier_rx) = watch::channel::<DeviceMap>(devices.clone());

        Store {
            devices,
            rx,
            notifier_tx,
            notifier_rx,
        }
    }

    pub fn notifier(&self) -> WatchReceiver<DeviceMap> {
        self.notifier_rx.clone()
    }

    #[cfg(test)]
    pub fn devices(&self) -> DeviceMap {
        self.devices.clone()
    }

    #[instrument(skip(self))]
    pub async fn listen(&mut self) {
        while let Some(event) = self.rx.recv().await {
            self.reduce(event).await;
            self.notifier_tx.send(self.devices.clone()).unwrap_or_default();
        }
    }

    async fn reduce(&mut self, event: Event) {
        match event {
            Event::DeviceRegistered(device) => {
                debug!(device_id = device.id, "🔵 Registering {} sensor(s)...", device.sensors.len());
                for sensor in device.sensors.values() {
                    let descriptor = sensor.descriptor();
                    trace!(
                        unique_id = sensor.unique_id(),
                        unit = descriptor.unit.map(|unit| unit.symbol()),
                        device_class = descriptor.device_class.map(|class| class.as_str()),
                        state_class = ?descriptor.state_class(),
                        icon = descriptor.icon,
                        "🔵 Registering sensor '{}'",
                        sensor.display_name(&device.name)
                    );
                }
                let num_sensors = device.sensors.len();
                let device_id = device.id.clone();

                let mut write_guard = self.devices.write().await;
                if write_guard.insert(device.id.clone(), device).is_some() {
                    warn!(device_id, "⚠️ Device '{}' was already registered, replaced it", device_id);
                }
                info!(device_id, "🔵 Registering {} sensor(s)... OK", num_sensors);
            }
            Event::SensorsUpdated {
                device_id,
                hostname,
                states,
            } => {
                let mut write_guard = self.devices.write().await;

                let Some(device) = write_guard.get_mut(&device_id) else {
                    warn!(device_id, "⚠️ Received sensor update for unknown device '{}'", device_id);
                    return;
                };

                if let Some(hostname) = hostname.filter(|hostname| *hostname != device.name) {
                    info!(device_id, "🟢 Device '{}' reports hostname '{}'", device.name, hostname);
                    device.name = hostname;
                }

                let now = Utc::now();
                let mut changed = 0;
                for (key, state) in states {
                    let Some(sensor) = device.sensors.get_mut(&key) else {
                        warn!(device_id, "⚠️ Unknown sensor '{}' for device '{}'", key, device.name);
                        continue;
                    };

                    if sensor.apply(state, now) {
                        trace!(unique_id = sensor.unique_id(), "🟢 '{}' is now '{}'", sensor.display_name(&device.name), sensor.state());
                        changed += 1;
                    }
                }
                debug!(device_id, "🟢 Updated device '{}', {} sensor(s) changed", device.name, changed);
            }
            Event::DeviceRemoved { device_id } => {
                let mut write_guard = self.devices.write().await;
                match write_guard.remove(&device_id) {
                    Some(device) => info!(device_id, "🔴 Removed device '{}' and its {} sensor(s)", device.name, device.sensors.len()),
                    None => warn!(device_id, "⚠️ Cannot remove unknown device '{}'", device_id),
                }
            }
        }
    }
}
