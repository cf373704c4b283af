//! Fleet session lifecycle
//!
//! A session owns the shared store and the simulation clock that mutates it.
//! `create` builds an empty store in the loading state, `start` generates the
//! fleet and starts the clock, `stop` cancels the clock. Consumers get the
//! store through `store()` and never touch the clock directly.

use {
    crate::{
        clock::{ClockHandle, SimulationClock},
        config::FleetConfig,
        error::StoreError,
        generator::{FleetGenerator, GeneratorConfig},
        model::{Analytics, CollectionRecord},
        state::{FleetStore, TelemetryDrift},
    },
    std::sync::Arc,
    tokio::sync::RwLock,
};

/// Store shared between the clock and the consumers
pub type SharedStore = Arc<RwLock<FleetStore>>;

pub struct FleetSession {
    store: SharedStore,
    generator: FleetGenerator,
    clock: SimulationClock,
    clock_handle: Option<ClockHandle>,
}

impl FleetSession {
    /// Build a session from configuration. Nothing runs until `start`.
    pub fn create(config: &FleetConfig) -> Self {
        let generator = FleetGenerator::new(GeneratorConfig {
            bin_count: config.bin_count,
            collection_history: config.collection_history,
            ..GeneratorConfig::default()
        });
        let clock = SimulationClock::new(
            config.tick_interval,
            TelemetryDrift {
                fill_increment_max: config.fill_increment_max,
                battery_drain_max: config.battery_drain_max,
            },
        );

        Self::with_parts(FleetStore::new(config.seed), generator, clock)
    }

    /// Build a session around an existing store (custom clock or preloaded fleet)
    pub fn with_parts(
        store: FleetStore,
        generator: FleetGenerator,
        clock: SimulationClock,
    ) -> Self {
        Self {
            store: Arc::new(RwLock::new(store)),
            generator,
            clock,
            clock_handle: None,
        }
    }

    pub fn store(&self) -> SharedStore {
        self.store.clone()
    }

    pub fn is_running(&self) -> bool {
        self.clock_handle.as_ref().is_some_and(|h| h.is_running())
    }

    /// Generate the fleet if it is still loading, then start the clock.
    /// Calling `start` on a running session does nothing; a clock whose task
    /// has ended is replaced.
    pub async fn start(&mut self) {
        if self.is_running() {
            log::debug!("Session already started");
            return;
        }
        if self.clock_handle.take().is_some() {
            log::warn!("Simulation clock had stopped, restarting");
        }

        {
            let mut store = self.store.write().await;
            if store.is_loading() {
                store.initialize(&self.generator);
            }
        }

        self.clock_handle = Some(self.clock.spawn(self.store.clone()));
        log::info!("Fleet session started (tick interval: {}ms)", self.clock.period().as_millis());
    }

    /// Cancel the clock. The store keeps its state and can be read afterwards.
    /// Returns the number of ticks the clock ran.
    pub async fn stop(&mut self) -> u64 {
        match self.clock_handle.take() {
            Some(handle) => {
                let ticks = handle.stop().await;
                log::info!("Fleet session stopped");
                ticks
            }
            None => 0,
        }
    }

    pub async fn is_loading(&self) -> bool {
        self.store.read().await.is_loading()
    }

    pub async fn analytics(&self) -> Analytics {
        self.store.read().await.analytics()
    }

    pub async fn mark_collected(
        &self,
        bin_id: &str,
        driver_id: &str,
    ) -> Result<CollectionRecord, StoreError> {
        self.store.write().await.mark_collected(bin_id, driver_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn test_config() -> FleetConfig {
        FleetConfig {
            seed: Some(17),
            tick_interval: Duration::from_secs(10),
            ..FleetConfig::default()
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_session_lifecycle() {
        let mut session = FleetSession::create(&test_config());
        assert!(session.is_loading().await);
        assert!(!session.is_running());

        session.start().await;
        assert!(!session.is_loading().await);
        assert!(session.is_running());
        assert_eq!(session.analytics().await.total_bins, 12);

        tokio::time::sleep(Duration::from_secs(25)).await;
        assert_eq!(session.stop().await, 2);
        assert!(!session.is_running());

        // stopping twice is harmless
        assert_eq!(session.stop().await, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_restart_keeps_fleet() {
        let mut session = FleetSession::create(&test_config());
        session.start().await;
        let bins_before = session.store().read().await.bins().to_vec();
        session.stop().await;

        session.start().await;
        assert_eq!(session.store().read().await.bins(), bins_before.as_slice());
        session.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_replaces_finished_clock() {
        let mut session = FleetSession::create(&test_config());
        session.clock_handle = Some(ClockHandle::from_task(tokio::spawn(async { 0 })));
        while session.clock_handle.as_ref().is_some_and(|h| h.is_running()) {
            tokio::task::yield_now().await;
        }
        assert!(!session.is_running());

        session.start().await;
        assert!(session.is_running());
        assert!(!session.is_loading().await);

        tokio::time::sleep(Duration::from_secs(25)).await;
        assert_eq!(session.store().read().await.ticks_applied(), 2);
        assert_eq!(session.stop().await, 2);
    }

    #[tokio::test]
    async fn test_session_mark_collected() {
        let mut session = FleetSession::create(&test_config());
        session.start().await;

        let record = session.mark_collected("bin-4", "driver-3").await.unwrap();
        assert_eq!(record.bin_id, "bin-4");

        let err = session.mark_collected("bin-99", "driver-3").await;
        assert_eq!(err, Err(StoreError::BinNotFound("bin-99".to_string())));

        session.stop().await;
    }
}
