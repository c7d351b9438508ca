use crate::app_config::DeviceEntry;
use crate::domain::device::Device;
use crate::domain::events::Event;
use crate::miner::SystemInfoSource;
use crate::projector::{PollOutcome, project_all};
use crate::scheduler::Ticker;
use std::sync::Arc;
use tokio::sync::mpsc::Sender;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

/// Everything one configured device needs to poll its miner. Devices share no mutable state.
#[derive(Debug)]
pub struct DeviceContext {
    entry: DeviceEntry,
    source: Arc<dyn SystemInfoSource>,
    tx: Sender<Event>,
    cancellation: CancellationToken,
    latest: Option<PollOutcome>,
}

impl DeviceContext {
    pub fn new(entry: DeviceEntry, source: Arc<dyn SystemInfoSource>, tx: Sender<Event>, cancellation: CancellationToken) -> Self {
        DeviceContext {
            entry,
            source,
            tx,
            cancellation,
            latest: None,
        }
    }

    #[cfg(test)]
    pub fn latest(&self) -> Option<&PollOutcome> {
        self.latest.as_ref()
    }

    /// Fetches once and publishes the projected state of every sensor. Returns `false` when the store is gone.
    async fn poll(&mut self) -> bool {
        let outcome = PollOutcome::from(self.source.fetch(self.entry.host()).await);

        let hostname = match &outcome {
            PollOutcome::Snapshot(snapshot) if snapshot.is_empty() => {
                warn!(device_id = self.entry.id(), "⚠️ '{}' reported none of the known fields", self.entry.host());
                None
            }
            PollOutcome::Snapshot(snapshot) => {
                debug!(device_id = self.entry.id(), "Polled '{}', {} value(s)", self.entry.host(), snapshot.len());
                snapshot.hostname().map(str::to_string)
            }
            PollOutcome::Failed(e) => {
                warn!(device_id = self.entry.id(), "⚠️ Fetching system info from '{}' failed: {}", self.entry.host(), e);
                None
            }
        };

        self.latest = Some(outcome);
        let event = Event::SensorsUpdated {
            device_id: self.entry.id().to_string(),
            hostname,
            states: project_all(self.latest.as_ref()),
        };

        self.tx.send(event).await.is_ok()
    }
}

/// Registers the device's sensors and polls on every tick until cancelled or the ticker runs out.
#[instrument(skip_all, fields(device_id = context.entry.id(), host = context.entry.host()))]
pub async fn run<T: Ticker>(mut context: DeviceContext, mut ticker: T) -> DeviceContext {
    let device = Device::new(context.entry.id(), context.entry.host());
    if context.tx.send(Event::DeviceRegistered(device)).await.is_err() {
        warn!("⚠️ Store is gone, not polling '{}'", context.entry.host());
        return context;
    }
    info!("⛏️ Polling '{}' every {:?}", context.entry.host(), context.entry.scan_interval());

    let cancellation = context.cancellation.clone();
    loop {
        tokio::select! {
            _ = cancellation.cancelled() => break,
            more = ticker.tick() => if !more { break },
        }

        tokio::select! {
            _ = cancellation.cancelled() => break,
            published = context.poll() => if !published {
                warn!("⚠️ Store is gone, stopped polling '{}'", context.entry.host());
                break;
            },
        }
    }

    info!("⛏️ Stopped polling '{}'", context.entry.host());
    context
}
