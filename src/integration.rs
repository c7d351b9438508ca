use crate::app_config::DeviceEntry;
use crate::coordinator::{self, DeviceContext};
use crate::domain::events::Event;
use crate::miner::SystemInfoSource;
use crate::scheduler::{IntervalTicker, Ticker};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::mpsc::Sender;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument, warn};

#[derive(Debug)]
struct RunningDevice {
    cancellation: CancellationToken,
    handle: JoinHandle<DeviceContext>,
}

/// Sets up and tears down the coordinators of configured devices, keyed by entry id.
#[derive(Debug)]
pub struct Integration {
    source: Arc<dyn SystemInfoSource>,
    tx: Sender<Event>,
    running: HashMap<String, RunningDevice>,
}

impl Integration {
    pub fn new(source: Arc<dyn SystemInfoSource>, tx: Sender<Event>) -> Self {
        Integration {
            source,
            tx,
            running: HashMap::new(),
        }
    }

    pub fn setup_entry(&mut self, entry: DeviceEntry) -> Result<(), IntegrationError> {
        let ticker = IntervalTicker::new(entry.scan_interval());
        self.setup_entry_with_ticker(entry, ticker)
    }

    #[instrument(skip_all, fields(device_id = entry.id()))]
    pub fn setup_entry_with_ticker<T>(&mut self, entry: DeviceEntry, ticker: T) -> Result<(), IntegrationError>
    where
        T: Ticker + 'static,
    {
        if self.running.contains_key(entry.id()) {
            return Err(IntegrationError::AlreadySetUp { id: entry.id().to_string() });
        }

        let id = entry.id().to_string();
        let cancellation = CancellationToken::new();
        let context = DeviceContext::new(entry, self.source.clone(), self.tx.clone(), cancellation.clone());
        let handle = tokio::spawn(coordinator::run(context, ticker));

        self.running.insert(id.clone(), RunningDevice { cancellation, handle });
        info!("✅ Set up device '{}'", id);
        Ok(())
    }

    /// Stops polling the device and removes its sensors. Returns `false` if the entry was not set up.
    #[instrument(skip(self))]
    pub async fn unload_entry(&mut self, id: &str) -> bool {
        let Some(running) = self.running.remove(id) else {
            warn!("⚠️ Cannot unload unknown device '{}'", id);
            return false;
        };

        running.cancellation.cancel();
        if let Err(e) = running.handle.await {
            warn!("⚠️ Coordinator of device '{}' did not stop cleanly: {}", id, e);
        }

        if self.tx.send(Event::DeviceRemoved { device_id: id.to_string() }).await.is_err() {
            warn!("⚠️ Store is gone, could not remove device '{}'", id);
        }

        info!("✅ Unloaded device '{}'", id);
        true
    }

    /// Cancels every device at once, then unloads them one by one.
    pub async fn unload_all(&mut self) {
        for running in self.running.values() {
            running.cancellation.cancel();
        }

        let ids: Vec<String> = self.running.keys().cloned().collect();
        for id in ids {
            self.unload_entry(&id).await;
        }
    }

    #[cfg(test)]
    pub fn is_set_up(&self, id: &str) -> bool {
        self.running.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.running.len()
    }

    pub fn is_empty(&self) -> bool {
        self.running.is_empty()
    }
}

#[derive(Error, Debug, PartialEq)]
pub enum IntegrationError {
    #[error("device '{id}' is already set up")]
    AlreadySetUp { id: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::snapshot::DeviceSnapshot;
    use crate::miner::FetchError;
    use crate::scheduler::manual_ticker;
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use std::time::Duration;
    use test_log::test;
    use tokio::sync::mpsc;

    #[derive(Debug)]
    struct UnreachableSource;

    #[async_trait]
    impl SystemInfoSource for UnreachableSource {
        async fn fetch(&self, host: &str) -> Result<DeviceSnapshot, FetchError> {
            Err(FetchError::NetworkUnreachable(format!("{} is offline", host)))
        }
    }

    /// Never answers for `STALLED_HOST`, fails fast for every other host.
    #[derive(Debug)]
    struct StalledSource;

    const STALLED_HOST: &str = "10.0.0.1";

    #[async_trait]
    impl SystemInfoSource for StalledSource {
        async fn fetch(&self, host: &str) -> Result<DeviceSnapshot, FetchError> {
            if host == STALLED_HOST {
                std::future::pending::<()>().await;
            }
            Err(FetchError::NetworkUnreachable(format!("{} is offline", host)))
        }
    }

    #[test(tokio::test)]
    async fn rejects_setting_up_an_entry_twice() {
        let (tx, _rx) = mpsc::channel(8);
        let mut integration = Integration::new(Arc::new(UnreachableSource), tx);
        let (_tick_tx, ticker) = manual_ticker();
        let (_tick_tx2, ticker2) = manual_ticker();

        integration.setup_entry_with_ticker(DeviceEntry::new("bitaxe-1", "192.168.1.50"), ticker).unwrap();
        let result = integration.setup_entry_with_ticker(DeviceEntry::new("bitaxe-1", "192.168.1.51"), ticker2);

        assert_eq!(result, Err(IntegrationError::AlreadySetUp { id: "bitaxe-1".to_string() }));
        assert_eq!(integration.len(), 1);
    }

    #[test(tokio::test)]
    async fn unloading_stops_the_device_and_removes_it() {
        let (tx, mut rx) = mpsc::channel(8);
        let mut integration = Integration::new(Arc::new(UnreachableSource), tx);
        let (_tick_tx, ticker) = manual_ticker();

        integration.setup_entry_with_ticker(DeviceEntry::new("bitaxe-1", "192.168.1.50"), ticker).unwrap();
        assert!(matches!(rx.recv().await, Some(Event::DeviceRegistered(_))));

        assert!(integration.unload_entry("bitaxe-1").await);

        assert!(!integration.is_set_up("bitaxe-1"));
        let Some(Event::DeviceRemoved { device_id }) = rx.recv().await else {
            panic!("expected the device to be removed");
        };
        assert_eq!(device_id, "bitaxe-1");
    }

    #[test(tokio::test)]
    async fn unloading_an_unknown_entry_is_a_no_op() {
        let (tx, _rx) = mpsc::channel(8);
        let mut integration = Integration::new(Arc::new(UnreachableSource), tx);

        assert!(!integration.unload_entry("bitaxe-1").await);
    }

    #[test(tokio::test)]
    async fn a_failing_device_does_not_affect_others() {
        let (tx, mut rx) = mpsc::channel(8);
        let mut integration = Integration::new(Arc::new(UnreachableSource), tx);
        let (tick_a, ticker_a) = manual_ticker();
        let (_tick_b, ticker_b) = manual_ticker();

        integration.setup_entry_with_ticker(DeviceEntry::new("a", "10.0.0.1"), ticker_a).unwrap();
        integration.setup_entry_with_ticker(DeviceEntry::new("b", "10.0.0.2"), ticker_b).unwrap();
        rx.recv().await.unwrap();
        rx.recv().await.unwrap();

        tick_a.send(()).await.unwrap();
        let Some(Event::SensorsUpdated { device_id, .. }) = rx.recv().await else {
            panic!("expected a sensor update");
        };
        assert_eq!(device_id, "a");
        assert!(integration.is_set_up("b"));

        integration.unload_all().await;
        assert_eq!(integration.len(), 0);
    }

    #[test(tokio::test)]
    async fn a_stalled_device_does_not_delay_others() {
        let (tx, mut rx) = mpsc::channel(8);
        let mut integration = Integration::new(Arc::new(StalledSource), tx);
        let (tick_a, ticker_a) = manual_ticker();
        let (tick_b, ticker_b) = manual_ticker();

        integration.setup_entry_with_ticker(DeviceEntry::new("a", STALLED_HOST), ticker_a).unwrap();
        integration.setup_entry_with_ticker(DeviceEntry::new("b", "10.0.0.2"), ticker_b).unwrap();
        rx.recv().await.unwrap();
        rx.recv().await.unwrap();

        tick_a.send(()).await.unwrap();
        tick_b.send(()).await.unwrap();
        let event = tokio::time::timeout(Duration::from_secs(5), rx.recv()).await.expect("device b should publish while a is stalled");
        let Some(Event::SensorsUpdated { device_id, .. }) = event else {
            panic!("expected a sensor update");
        };
        assert_eq!(device_id, "b");

        // The stalled fetch is abandoned on unload
        integration.unload_all().await;
        assert!(integration.is_empty());
        drop(integration);
        let mut removed = Vec::new();
        while let Ok(Some(Event::DeviceRemoved { device_id })) = tokio::time::timeout(Duration::from_secs(5), rx.recv()).await {
            removed.push(device_id);
        }
        removed.sort();
        assert_eq!(removed, vec!["a".to_string(), "b".to_string()]);
    }
}
