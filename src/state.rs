use {
    crate::{
        aggregator::compute_analytics,
        error::StoreError,
        generator::{Fleet, FleetGenerator},
        model::{estimate_waste_kg, Analytics, Bin, CollectionRecord, Driver, Route},
    },
    chrono::{DateTime, Utc},
    rand::{Rng, SeedableRng},
    rand_chacha::ChaCha8Rng,
};

/// Note attached to collections recorded through the store
pub const COLLECTION_NOTE: &str = "Collected via driver app";

/// Bounds for the random telemetry drift applied on each clock tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TelemetryDrift {
    /// Fill increase per tick is drawn from `[0, fill_increment_max)`
    pub fill_increment_max: f64,
    /// Battery decrease per tick is drawn from `[0, battery_drain_max)`
    pub battery_drain_max: f64,
}

impl Default for TelemetryDrift {
    fn default() -> Self {
        Self {
            fill_increment_max: 2.0,
            battery_drain_max: 0.1,
        }
    }
}

/// In-memory fleet state for one session
///
/// Owns the bins, drivers, routes, and collection log. Analytics are never
/// stored; `analytics()` recomputes them from the current collections.
/// `mark_collected` is the only externally driven mutation, `simulate_tick`
/// is driven by the simulation clock.
pub struct FleetStore {
    bins: Vec<Bin>,
    drivers: Vec<Driver>,
    routes: Vec<Route>,
    /// Append-only, oldest first
    collections: Vec<CollectionRecord>,
    /// Numeric suffix for the next `collection-{n}` id
    next_collection_id: u64,
    /// True until the initial fleet has been loaded
    loading: bool,
    ticks_applied: u64,
    rng: ChaCha8Rng,
    /// Timestamp function (for testing with mock time)
    now_fn: Box<dyn Fn() -> DateTime<Utc> + Send + Sync>,
}

impl FleetStore {
    /// Create an empty store in the loading state
    ///
    /// `seed` fixes the random source; `None` seeds from entropy.
    pub fn new(seed: Option<u64>) -> Self {
        Self::new_with_timestamp_fn(seed, Box::new(Utc::now))
    }

    /// Create an empty store with a custom timestamp function
    pub fn new_with_timestamp_fn(
        seed: Option<u64>,
        now_fn: Box<dyn Fn() -> DateTime<Utc> + Send + Sync>,
    ) -> Self {
        let rng = match seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };

        Self {
            bins: Vec::new(),
            drivers: Vec::new(),
            routes: Vec::new(),
            collections: Vec::new(),
            next_collection_id: 0,
            loading: true,
            ticks_applied: 0,
            rng,
            now_fn,
        }
    }

    /// Generate the initial fleet and leave the loading state
    pub fn initialize(&mut self, generator: &FleetGenerator) {
        let now = self.now();
        let fleet = generator.generate(&mut self.rng, now);
        self.load_fleet(fleet);
    }

    /// Replace all collections with `fleet` and leave the loading state
    pub fn load_fleet(&mut self, fleet: Fleet) {
        self.bins = fleet.bins;
        self.drivers = fleet.drivers;
        self.routes = fleet.routes;
        self.next_collection_id = next_collection_id(&fleet.collections);
        self.collections = fleet.collections;
        self.loading = false;
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn now(&self) -> DateTime<Utc> {
        (self.now_fn)()
    }

    pub fn bins(&self) -> &[Bin] {
        &self.bins
    }

    pub fn drivers(&self) -> &[Driver] {
        &self.drivers
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    /// Full collection log, oldest first
    pub fn collections(&self) -> &[CollectionRecord] {
        &self.collections
    }

    /// Newest collections first, at most `limit`
    pub fn recent_collections(&self, limit: usize) -> impl Iterator<Item = &CollectionRecord> {
        self.collections.iter().rev().take(limit)
    }

    pub fn bin(&self, bin_id: &str) -> Option<&Bin> {
        self.bins.iter().find(|b| b.id == bin_id)
    }

    pub fn driver(&self, driver_id: &str) -> Option<&Driver> {
        self.drivers.iter().find(|d| d.id == driver_id)
    }

    /// Number of clock ticks applied since creation
    pub fn ticks_applied(&self) -> u64 {
        self.ticks_applied
    }

    /// Analytics over the current state, recomputed on every call
    pub fn analytics(&self) -> Analytics {
        compute_analytics(&self.bins, &self.collections, self.now())
    }

    /// Record that `driver_id` emptied `bin_id`
    ///
    /// Resets the bin to fill 0 / `Empty`, stamps `last_emptied` and
    /// `last_updated`, and appends a collection record capturing the fill level
    /// before the reset. On error nothing is modified.
    pub fn mark_collected(
        &mut self,
        bin_id: &str,
        driver_id: &str,
    ) -> Result<CollectionRecord, StoreError> {
        if self.driver(driver_id).is_none() {
            log::warn!("Rejected collection of {}: unknown driver {}", bin_id, driver_id);
            return Err(StoreError::DriverNotFound(driver_id.to_string()));
        }

        let now = self.now();
        let bin = match self.bins.iter_mut().find(|b| b.id == bin_id) {
            Some(bin) => bin,
            None => {
                log::warn!("Rejected collection by {}: unknown bin {}", driver_id, bin_id);
                return Err(StoreError::BinNotFound(bin_id.to_string()));
            }
        };

        let fill_level_before = bin.fill_level;
        bin.set_fill_level(0.0, now);
        bin.last_emptied = now;
        bin.last_updated = now;

        let record = CollectionRecord {
            id: format!("collection-{}", self.next_collection_id),
            bin_id: bin_id.to_string(),
            driver_id: driver_id.to_string(),
            collected_at: now,
            fill_level_before,
            waste_amount: estimate_waste_kg(fill_level_before),
            notes: Some(COLLECTION_NOTE.to_string()),
        };
        self.collections.push(record.clone());
        self.next_collection_id += 1;

        log::debug!(
            "Collected {} by {}: fill_before={:.1}% waste={}kg",
            bin_id,
            driver_id,
            fill_level_before,
            record.waste_amount
        );

        Ok(record)
    }

    /// Apply one round of simulated telemetry to every bin
    ///
    /// Fill rises by a random increment capped at 100, battery drains by a
    /// random amount floored at 0, and `last_updated` moves to now. Status and
    /// prediction are re-derived from the new fill level. Returns the number
    /// of bins updated.
    pub fn simulate_tick(&mut self, drift: &TelemetryDrift) -> usize {
        let now = self.now();

        for bin in self.bins.iter_mut() {
            let increment = random_below(&mut self.rng, drift.fill_increment_max);
            bin.set_fill_level((bin.fill_level + increment).min(100.0), now);

            if let Some(battery) = bin.battery_level {
                let drain = random_below(&mut self.rng, drift.battery_drain_max);
                bin.battery_level = Some((battery - drain).max(0.0));
            }

            bin.last_updated = now;
        }

        self.ticks_applied += 1;
        self.bins.len()
    }
}

/// One past the largest `collection-{n}` suffix in `collections`, and never
/// below the log length
fn next_collection_id(collections: &[CollectionRecord]) -> u64 {
    let len = collections.len() as u64;
    collections
        .iter()
        .filter_map(|c| c.id.strip_prefix("collection-")?.parse::<u64>().ok())
        .max()
        .map_or(len, |max| (max + 1).max(len))
}

/// Uniform draw from `[0, max)`, 0 for a non-positive bound
fn random_below<R: Rng + ?Sized>(rng: &mut R, max: f64) -> f64 {
    if max > 0.0 {
        rng.gen_range(0.0..max)
    } else {
        0.0
    }
}
