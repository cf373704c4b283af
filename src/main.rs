//! binflow - terminal dashboard over a simulated bin fleet
//!
//! Environment variables: see `FleetConfig::from_env`.

use binflow::{config::FleetConfig, session::FleetSession, ui};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();

    let config = FleetConfig::from_env()?;

    // Logs go to stderr; the dashboard draws on the alternate screen
    env_logger::Builder::new()
        .parse_filters(config.log_filter())
        .target(env_logger::Target::Stderr)
        .init();

    log::info!("Starting binflow dashboard");
    log::info!("   ├─ Bins: {}", config.bin_count);
    log::info!("   ├─ Tick interval: {}ms", config.tick_interval.as_millis());
    log::info!("   ├─ Seed: {}", config.seed.map_or("random".to_string(), |s| s.to_string()));
    log::info!("   └─ Acting driver: {}", config.driver_id);

    let mut session = FleetSession::create(&config);
    session.start().await;

    let result = ui::run_ui(session.store(), config.driver_id.clone()).await;

    let ticks = session.stop().await;
    log::info!("Dashboard closed after {} simulation ticks", ticks);

    result
}
