//! Domain model shared by the generator, the store, and the dashboard
//!
//! All timestamps are UTC. Identifiers are plain strings (`bin-3`, `driver-1`,
//! `route-2`, `collection-17`) and references between records are by id only.

use {
    chrono::{DateTime, Duration, Utc},
    serde::{Deserialize, Serialize},
};

/// Fixed volume of every bin, in litres
pub const BIN_CAPACITY_LITRES: u32 = 240;

/// Fill levels above this are `Overflow`
pub const OVERFLOW_THRESHOLD: f64 = 90.0;
/// Fill levels above this are `Full`
pub const FULL_THRESHOLD: f64 = 80.0;
/// Fill levels at or above this are `Half`
pub const HALF_THRESHOLD: f64 = 40.0;

/// Bin fill status, always derived from the fill level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BinStatus {
    Empty,
    Half,
    Full,
    Overflow,
}

impl BinStatus {
    /// Derive status from a fill percentage.
    ///
    /// The overflow threshold is checked before the full threshold, otherwise
    /// `Overflow` could never be produced.
    pub fn from_fill_level(fill_level: f64) -> Self {
        if fill_level > OVERFLOW_THRESHOLD {
            BinStatus::Overflow
        } else if fill_level > FULL_THRESHOLD {
            BinStatus::Full
        } else if fill_level >= HALF_THRESHOLD {
            BinStatus::Half
        } else {
            BinStatus::Empty
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BinStatus::Empty => "empty",
            BinStatus::Half => "half",
            BinStatus::Full => "full",
            BinStatus::Overflow => "overflow",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BinLocation {
    pub lat: f64,
    pub lng: f64,
    pub address: String,
    pub area: String,
}

/// A sensor-equipped waste bin
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bin {
    pub id: String,
    pub location: BinLocation,
    /// Percentage of capacity in use, 0-100
    pub fill_level: f64,
    pub capacity: u32,
    pub last_emptied: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
    pub sensor_id: String,
    pub status: BinStatus,
    pub predicted_full_time: Option<DateTime<Utc>>,
    pub battery_level: Option<f64>,
    pub temperature: Option<f64>,
    /// Assumed fill increase in percentage points per day, drives the prediction
    pub daily_fill_rate: f64,
}

impl Bin {
    /// Set the fill level (clamped to 0-100) and re-derive status and prediction
    pub fn set_fill_level(&mut self, fill_level: f64, now: DateTime<Utc>) {
        self.fill_level = fill_level.clamp(0.0, 100.0);
        self.status = BinStatus::from_fill_level(self.fill_level);
        self.predicted_full_time = predict_full_time(self.fill_level, self.daily_fill_rate, now);
    }
}

/// `now + 24 * (100 - fill) / rate` hours, or `None` when the bin is already
/// full or the rate cannot produce a positive horizon
pub fn predict_full_time(
    fill_level: f64,
    daily_fill_rate: f64,
    now: DateTime<Utc>,
) -> Option<DateTime<Utc>> {
    if daily_fill_rate <= 0.0 {
        return None;
    }
    let hours_to_full = 24.0 * (100.0 - fill_level) / daily_fill_rate;
    if hours_to_full > 0.0 {
        Some(now + Duration::milliseconds((hours_to_full * 3_600_000.0) as i64))
    } else {
        None
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DriverStatus {
    Available,
    OnRoute,
    Break,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Driver {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub license_number: String,
    /// Route ids, not owned
    pub assigned_routes: Vec<String>,
    pub status: DriverStatus,
    pub current_location: Option<GeoPoint>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RouteStatus {
    Pending,
    InProgress,
    Completed,
}

impl RouteStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RouteStatus::Pending => "pending",
            RouteStatus::InProgress => "in-progress",
            RouteStatus::Completed => "completed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Route {
    pub id: String,
    pub name: String,
    /// Ordered bin ids
    pub bins: Vec<String>,
    pub driver_id: Option<String>,
    /// Minutes
    pub estimated_duration: u32,
    /// Kilometres
    pub distance: f64,
    pub optimized: bool,
    pub status: RouteStatus,
    pub start_time: Option<DateTime<Utc>>,
    pub completed_time: Option<DateTime<Utc>>,
}

/// One collection event. The log is append-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionRecord {
    pub id: String,
    pub bin_id: String,
    pub driver_id: String,
    pub collected_at: DateTime<Utc>,
    pub fill_level_before: f64,
    /// Kilograms
    pub waste_amount: u32,
    pub notes: Option<String>,
}

/// Waste estimate in kg for a bin collected at `fill_level_before` percent
pub fn estimate_waste_kg(fill_level_before: f64) -> u32 {
    (fill_level_before * 2.4).floor().max(0.0) as u32
}

/// Summary statistics derived from the current fleet state. Never stored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Analytics {
    pub total_bins: usize,
    /// Full and overflowing bins
    pub full_bins: usize,
    pub half_full_bins: usize,
    pub empty_bins: usize,
    pub daily_collections: usize,
    pub weekly_collections: usize,
    /// Mean fill level across all bins, 0.0 for an empty fleet
    pub average_fill_rate: f64,
    pub predicted_overflows: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_thresholds() {
        assert_eq!(BinStatus::from_fill_level(0.0), BinStatus::Empty);
        assert_eq!(BinStatus::from_fill_level(39.9), BinStatus::Empty);
        assert_eq!(BinStatus::from_fill_level(40.0), BinStatus::Half);
        assert_eq!(BinStatus::from_fill_level(80.0), BinStatus::Half);
        assert_eq!(BinStatus::from_fill_level(80.5), BinStatus::Full);
        assert_eq!(BinStatus::from_fill_level(90.0), BinStatus::Full);
        assert_eq!(BinStatus::from_fill_level(90.1), BinStatus::Overflow);
        assert_eq!(BinStatus::from_fill_level(100.0), BinStatus::Overflow);
    }

    #[test]
    fn test_example_fleet_statuses() {
        let statuses: Vec<BinStatus> = [10.0, 50.0, 95.0]
            .iter()
            .map(|f| BinStatus::from_fill_level(*f))
            .collect();
        assert_eq!(statuses, vec![BinStatus::Empty, BinStatus::Half, BinStatus::Overflow]);
    }

    #[test]
    fn test_predict_full_time() {
        let now = Utc::now();

        // 50 points left at 10/day -> 5 days
        let predicted = predict_full_time(50.0, 10.0, now).unwrap();
        assert_eq!(predicted - now, Duration::hours(120));

        assert_eq!(predict_full_time(100.0, 10.0, now), None);
        assert_eq!(predict_full_time(20.0, 0.0, now), None);
    }

    #[test]
    fn test_waste_estimate() {
        assert_eq!(estimate_waste_kg(95.0), 228);
        assert_eq!(estimate_waste_kg(0.0), 0);
        assert_eq!(estimate_waste_kg(33.3), 79);
    }

    #[test]
    fn test_status_serializes_kebab_case() {
        assert_eq!(serde_json::to_string(&BinStatus::Overflow).unwrap(), "\"overflow\"");
        assert_eq!(serde_json::to_string(&DriverStatus::OnRoute).unwrap(), "\"on-route\"");
        assert_eq!(serde_json::to_string(&RouteStatus::InProgress).unwrap(), "\"in-progress\"");
    }
}
