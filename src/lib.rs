//! # binflow
//!
//! Client-side state engine for a waste-bin collection fleet:
//!
//! ```text
//! FleetGenerator ──► FleetStore ◄── SimulationClock (tick every 30s)
//!                        │
//!                        ├─► compute_analytics() (on every read)
//!                        └─► mark_collected(bin, driver)
//! ```
//!
//! `FleetSession` ties the store and the clock to one lifecycle
//! (create / start / stop). The terminal dashboard and the headless runner
//! are thin consumers of the session.

pub mod aggregator;
pub mod clock;
pub mod config;
pub mod error;
pub mod generator;
pub mod model;
pub mod query;
pub mod session;
pub mod state;
pub mod ui;

pub use aggregator::compute_analytics;
pub use clock::{ClockHandle, SimulationClock};
pub use config::FleetConfig;
pub use error::{ConfigError, StoreError};
pub use generator::{Fleet, FleetGenerator, GeneratorConfig};
pub use model::{Analytics, Bin, BinStatus, CollectionRecord, Driver, Route};
pub use session::{FleetSession, SharedStore};
pub use state::{FleetStore, TelemetryDrift};
