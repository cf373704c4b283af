//! Headless fleet simulation
//!
//! Starts a session, logs an analytics snapshot as JSON on a timer, and stops
//! the session on CTRL+C.
//!
//! Usage:
//!   cargo run --release --bin fleet_sim
//!
//! Environment variables:
//!   BINFLOW_SEED - fixed seed for a reproducible fleet
//!   BINFLOW_TICK_INTERVAL_MS - simulation tick interval (default: 30000)
//!   BINFLOW_SNAPSHOT_INTERVAL_MS - snapshot log interval (default: 10000)

use binflow::{
    config::FleetConfig,
    model::RouteStatus,
    query::{
        efficiency_rate, route_progress, urgent_bins, DriverStatusCounts, RouteFilter,
        RouteStatusCounts,
    },
    session::FleetSession,
};
use dotenv::dotenv;
use log::{error, info};
use tokio::time::interval;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();

    let config = FleetConfig::from_env()?;
    env_logger::Builder::new()
        .parse_filters(config.log_filter())
        .target(env_logger::Target::Stderr)
        .init();

    info!("🚛 Fleet simulation starting");
    info!("   ├─ Bins: {}", config.bin_count);
    info!("   ├─ Historical collections: {}", config.collection_history);
    info!("   ├─ Tick interval: {}ms", config.tick_interval.as_millis());
    info!("   └─ Snapshot interval: {}ms", config.snapshot_interval.as_millis());

    let mut session = FleetSession::create(&config);
    session.start().await;
    let store = session.store();

    {
        let guard = store.read().await;
        let routes = RouteStatusCounts::from_routes(guard.routes());
        let drivers = DriverStatusCounts::from_drivers(guard.drivers());
        info!(
            "🗺️  Routes: {} pending, {} in progress, {} completed",
            routes.pending, routes.in_progress, routes.completed
        );
        info!(
            "👷 Drivers: {} available, {} on route, {} on break",
            drivers.available, drivers.on_route, drivers.on_break
        );
    }

    let mut snapshot_timer = interval(config.snapshot_interval);
    let active_routes = RouteFilter {
        status: Some(RouteStatus::InProgress),
        ..RouteFilter::default()
    };

    info!("🔄 Press CTRL+C to shutdown gracefully");

    loop {
        tokio::select! {
            _ = snapshot_timer.tick() => {
                let guard = store.read().await;
                let analytics = guard.analytics();
                match serde_json::to_string(&analytics) {
                    Ok(json) => info!("📊 {}", json),
                    Err(e) => error!("Failed to serialize analytics: {}", e),
                }
                info!("   ├─ Efficiency: {:.1}%", efficiency_rate(&analytics));

                for route in active_routes.apply(guard.routes()) {
                    let progress = route_progress(route, guard.bins());
                    info!(
                        "   ├─ {}: {}/{} bins collected ({:.0}%)",
                        route.name, progress.collected_bins, progress.total_bins, progress.percent
                    );
                }

                let urgent: Vec<&str> = urgent_bins(guard.bins(), guard.now())
                    .iter()
                    .map(|b| b.id.as_str())
                    .collect();
                if !urgent.is_empty() {
                    info!("🚨 Urgent bins: {}", urgent.join(", "));
                }
            }
            signal = tokio::signal::ctrl_c() => {
                match signal {
                    Ok(()) => info!("⚠️  Received CTRL+C, shutting down..."),
                    Err(err) => error!("❌ Failed to listen for CTRL+C: {}", err),
                }
                break;
            }
        }
    }

    let ticks = session.stop().await;
    info!("✅ Simulation stopped after {} ticks", ticks);
    Ok(())
}
