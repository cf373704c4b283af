//! Simulation clock - periodic telemetry drift for a running session
//!
//! The clock is a single tokio task that locks the store once per tick and
//! applies `FleetStore::simulate_tick`. Ticks cannot overlap because one loop
//! owns the timer. The task runs until `ClockHandle::stop` is called or the
//! handle is dropped.

use {
    crate::state::{FleetStore, TelemetryDrift},
    std::{sync::Arc, time::Duration},
    tokio::{
        sync::{oneshot, RwLock},
        task::JoinHandle,
        time::{interval, MissedTickBehavior},
    },
};

/// Period of the simulated sensor reports
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulationClock {
    period: Duration,
    drift: TelemetryDrift,
}

impl SimulationClock {
    pub fn new(period: Duration, drift: TelemetryDrift) -> Self {
        Self { period, drift }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Start ticking against `store`. Must be called inside a tokio runtime.
    pub fn spawn(&self, store: Arc<RwLock<FleetStore>>) -> ClockHandle {
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let task = tokio::spawn(clock_task(store, self.period, self.drift, shutdown_rx));

        ClockHandle {
            shutdown: Some(shutdown_tx),
            task: Some(task),
        }
    }
}

impl Default for SimulationClock {
    fn default() -> Self {
        Self::new(DEFAULT_TICK_INTERVAL, TelemetryDrift::default())
    }
}

/// Owner of a running clock task
///
/// Dropping the handle cancels the task; `stop` additionally waits for the
/// in-flight tick (if any) to finish.
pub struct ClockHandle {
    shutdown: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<u64>>,
}

impl ClockHandle {
    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|t| !t.is_finished())
    }

    /// Signal the task to stop and wait for it. Returns the number of ticks it ran.
    pub async fn stop(mut self) -> u64 {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }

        match self.task.take() {
            Some(task) => match task.await {
                Ok(ticks) => ticks,
                Err(e) => {
                    log::warn!("Simulation clock task ended abnormally: {}", e);
                    0
                }
            },
            None => 0,
        }
    }
}

#[cfg(test)]
impl ClockHandle {
    /// Wrap an arbitrary task, without a shutdown channel
    pub(crate) fn from_task(task: JoinHandle<u64>) -> Self {
        Self {
            shutdown: None,
            task: Some(task),
        }
    }
}

impl Drop for ClockHandle {
    fn drop(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

async fn clock_task(
    store: Arc<RwLock<FleetStore>>,
    period: Duration,
    drift: TelemetryDrift,
    mut shutdown: oneshot::Receiver<()>,
) -> u64 {
    log::info!("Simulation clock started (interval: {}ms)", period.as_millis());

    let mut timer = interval(period);
    timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // First tick completes immediately
    timer.tick().await;

    let mut ticks = 0u64;
    loop {
        tokio::select! {
            _ = &mut shutdown => break,
            _ = timer.tick() => {
                let updated = {
                    let mut store = store.write().await;
                    store.simulate_tick(&drift)
                };
                ticks += 1;
                log::debug!("Simulation tick {}: {} bins updated", ticks, updated);
            }
        }
    }

    log::info!("Simulation clock stopped after {} ticks", ticks);
    ticks
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::FleetGenerator;
    use chrono::{DateTime, Utc};

    fn seeded_store(now: DateTime<Utc>) -> Arc<RwLock<FleetStore>> {
        let mut store = FleetStore::new_with_timestamp_fn(Some(8), Box::new(move || now));
        store.initialize(&FleetGenerator::default());
        Arc::new(RwLock::new(store))
    }

    #[tokio::test(start_paused = true)]
    async fn test_clock_ticks_once_per_period() {
        let now = Utc::now();
        let store = seeded_store(now);
        let clock = SimulationClock::default();

        let handle = clock.spawn(store.clone());
        assert!(handle.is_running());

        // Nothing happens before the first period elapses
        tokio::time::sleep(Duration::from_secs(29)).await;
        assert_eq!(store.read().await.ticks_applied(), 0);

        tokio::time::sleep(Duration::from_secs(66)).await;
        assert_eq!(store.read().await.ticks_applied(), 3);
        assert!(store.read().await.bins().iter().all(|b| b.last_updated == now));

        assert_eq!(handle.stop().await, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stopped_clock_no_longer_mutates() {
        let store = seeded_store(Utc::now());
        let handle = SimulationClock::default().spawn(store.clone());

        tokio::time::sleep(Duration::from_secs(31)).await;
        handle.stop().await;

        let snapshot = store.read().await.bins().to_vec();
        tokio::time::sleep(Duration::from_secs(300)).await;

        let store = store.read().await;
        assert_eq!(store.ticks_applied(), 1);
        assert_eq!(store.bins(), snapshot.as_slice());
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropping_handle_cancels_clock() {
        let store = seeded_store(Utc::now());
        let handle = SimulationClock::new(Duration::from_secs(5), TelemetryDrift::default())
            .spawn(store.clone());

        tokio::time::sleep(Duration::from_secs(11)).await;
        drop(handle);
        tokio::time::sleep(Duration::from_secs(60)).await;

        assert_eq!(store.read().await.ticks_applied(), 2);
    }
}
