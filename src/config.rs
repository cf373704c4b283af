use {
    crate::error::ConfigError,
    std::{env, str::FromStr, time::Duration},
};

/// `env_logger` filter used when `RUST_LOG` is unset
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Configuration loaded from environment variables
#[derive(Debug, Clone, PartialEq)]
pub struct FleetConfig {
    /// Seed for the session random source (None = entropy)
    pub seed: Option<u64>,
    pub bin_count: usize,
    pub collection_history: usize,
    pub tick_interval: Duration,
    pub fill_increment_max: f64,
    pub battery_drain_max: f64,
    /// Driver credited when the dashboard marks a bin collected
    pub driver_id: String,
    pub snapshot_interval: Duration,
    /// Raw `RUST_LOG` directives, if set
    pub rust_log: Option<String>,
}

impl Default for FleetConfig {
    fn default() -> Self {
        Self {
            seed: None,
            bin_count: 12,
            collection_history: 20,
            tick_interval: Duration::from_secs(30),
            fill_increment_max: 2.0,
            battery_drain_max: 0.1,
            driver_id: "driver-1".to_string(),
            snapshot_interval: Duration::from_secs(10),
            rust_log: None,
        }
    }
}

impl FleetConfig {
    /// Load configuration from environment variables
    ///
    /// Environment variables:
    /// - `BINFLOW_SEED` (default: unset, random fleet every run)
    /// - `BINFLOW_BIN_COUNT` (default: 12)
    /// - `BINFLOW_COLLECTION_HISTORY` (default: 20)
    /// - `BINFLOW_TICK_INTERVAL_MS` (default: 30000)
    /// - `BINFLOW_FILL_INCREMENT_MAX` (default: 2.0)
    /// - `BINFLOW_BATTERY_DRAIN_MAX` (default: 0.1)
    /// - `BINFLOW_DRIVER_ID` (default: driver-1)
    /// - `BINFLOW_SNAPSHOT_INTERVAL_MS` (default: 10000)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Filter directives for `env_logger`
    pub fn log_filter(&self) -> &str {
        self.rust_log.as_deref().unwrap_or(DEFAULT_LOG_FILTER)
    }

    /// Build configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let tick_interval_ms: u64 = parse_or(
            &lookup,
            "BINFLOW_TICK_INTERVAL_MS",
            defaults.tick_interval.as_millis() as u64,
        )?;
        if tick_interval_ms == 0 {
            return Err(ConfigError::Invalid {
                key: "BINFLOW_TICK_INTERVAL_MS",
                value: "0".to_string(),
            });
        }

        let snapshot_interval_ms: u64 = parse_or(
            &lookup,
            "BINFLOW_SNAPSHOT_INTERVAL_MS",
            defaults.snapshot_interval.as_millis() as u64,
        )?;
        if snapshot_interval_ms == 0 {
            return Err(ConfigError::Invalid {
                key: "BINFLOW_SNAPSHOT_INTERVAL_MS",
                value: "0".to_string(),
            });
        }

        let fill_increment_max = non_negative(
            "BINFLOW_FILL_INCREMENT_MAX",
            parse_or(&lookup, "BINFLOW_FILL_INCREMENT_MAX", defaults.fill_increment_max)?,
        )?;
        let battery_drain_max = non_negative(
            "BINFLOW_BATTERY_DRAIN_MAX",
            parse_or(&lookup, "BINFLOW_BATTERY_DRAIN_MAX", defaults.battery_drain_max)?,
        )?;

        let seed: Option<u64> = match lookup("BINFLOW_SEED") {
            Some(raw) => Some(raw.trim().parse().map_err(|_| ConfigError::Invalid {
                key: "BINFLOW_SEED",
                value: raw.clone(),
            })?),
            None => None,
        };

        let driver_id = lookup("BINFLOW_DRIVER_ID")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or(defaults.driver_id);

        Ok(Self {
            seed,
            bin_count: parse_or(&lookup, "BINFLOW_BIN_COUNT", defaults.bin_count)?,
            collection_history: parse_or(
                &lookup,
                "BINFLOW_COLLECTION_HISTORY",
                defaults.collection_history,
            )?,
            tick_interval: Duration::from_millis(tick_interval_ms),
            fill_increment_max,
            battery_drain_max,
            driver_id,
            snapshot_interval: Duration::from_millis(snapshot_interval_ms),
            rust_log: lookup("RUST_LOG"),
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value: raw.clone() }),
        None => Ok(default),
    }
}

fn non_negative(key: &'static str, value: f64) -> Result<f64, ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(ConfigError::Invalid { key, value: value.to_string() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = FleetConfig::from_lookup(lookup_from(&[])).unwrap();

        assert_eq!(config, FleetConfig::default());
        assert_eq!(config.tick_interval, Duration::from_secs(30));
        assert_eq!(config.bin_count, 12);
        assert_eq!(config.collection_history, 20);
        assert_eq!(config.driver_id, "driver-1");
        assert!(config.seed.is_none());
    }

    #[test]
    fn test_custom_config() {
        let config = FleetConfig::from_lookup(lookup_from(&[
            ("BINFLOW_SEED", "42"),
            ("BINFLOW_BIN_COUNT", "30"),
            ("BINFLOW_TICK_INTERVAL_MS", "500"),
            ("BINFLOW_DRIVER_ID", " driver-2 "),
            ("BINFLOW_FILL_INCREMENT_MAX", "5.5"),
        ]))
        .unwrap();

        assert_eq!(config.seed, Some(42));
        assert_eq!(config.bin_count, 30);
        assert_eq!(config.tick_interval, Duration::from_millis(500));
        assert_eq!(config.driver_id, "driver-2");
        assert_eq!(config.fill_increment_max, 5.5);
        assert_eq!(config.battery_drain_max, 0.1);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let err = FleetConfig::from_lookup(lookup_from(&[("BINFLOW_BIN_COUNT", "many")]))
            .unwrap_err();
        assert_eq!(
            err,
            ConfigError::Invalid { key: "BINFLOW_BIN_COUNT", value: "many".to_string() }
        );

        assert!(
            FleetConfig::from_lookup(lookup_from(&[("BINFLOW_TICK_INTERVAL_MS", "0")])).is_err()
        );
        assert!(FleetConfig::from_lookup(lookup_from(&[("BINFLOW_SEED", "-1")])).is_err());
        assert!(
            FleetConfig::from_lookup(lookup_from(&[("BINFLOW_BATTERY_DRAIN_MAX", "-0.5")])).is_err()
        );
    }

    #[test]
    fn test_log_filter_defaults_to_info() {
        let config = FleetConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.log_filter(), "info");

        let config =
            FleetConfig::from_lookup(lookup_from(&[("RUST_LOG", "binflow=debug")])).unwrap();
        assert_eq!(config.rust_log.as_deref(), Some("binflow=debug"));
        assert_eq!(config.log_filter(), "binflow=debug");
    }
}
