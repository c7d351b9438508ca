use async_trait::async_trait;
use std::time::Duration;
use tokio::time::{Interval, MissedTickBehavior, interval};

/// Drives the polling cycle of a device.
#[async_trait]
pub trait Ticker: Send {
    /// Waits for the next tick. Returns `false` when no more ticks will come.
    async fn tick(&mut self) -> bool;
}

/// Ticks every `period`, starting immediately. A tick that is late because the previous fetch was slow
/// pushes the following ticks back instead of firing a burst to catch up.
#[derive(Debug)]
pub struct IntervalTicker {
    interval: Interval,
}

impl IntervalTicker {
    pub fn new(period: Duration) -> Self {
        let mut interval = interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        IntervalTicker { interval }
    }
}

#[async_trait]
impl Ticker for IntervalTicker {
    async fn tick(&mut self) -> bool {
        self.interval.tick().await;
        true
    }
}

#[cfg(test)]
pub use manual::manual_ticker;


#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::Instant;

    #[tokio::test(start_paused = true)]
    async fn first_tick_is_immediate() {
        let mut ticker = IntervalTicker::new(Duration::from_secs(15));
        let start = Instant::now();

        assert!(ticker.tick().await);

        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn ticks_once_per_period() {
        let mut ticker = IntervalTicker::new(Duration::from_secs(15));
        let start = Instant::now();

        for _ in 0..3 {
            ticker.tick().await;
        }

        assert_eq!(start.elapsed(), Duration::from_secs(30));
    }

    #[tokio::test(start_paused = true)]
    async fn a_slow_tick_delays_the_next_one() {
        let mut ticker = IntervalTicker::new(Duration::from_secs(15));
        ticker.tick().await;

        // Simulates a fetch that takes longer than the period
        tokio::time::sleep(Duration::from_secs(40)).await;
        let late = Instant::now();
        ticker.tick().await;
        ticker.tick().await;

        assert_eq!(late.elapsed(), Duration::from_secs(15));
    }

    #[tokio::test]
    async fn manual_ticker_stops_when_the_sender_is_dropped() {
        let (tx, mut ticker) = manual_ticker();
        tx.send(()).await.unwrap();
        drop(tx);

        assert!(ticker.tick().await);
        assert!(!ticker.tick().await);
    }
}
