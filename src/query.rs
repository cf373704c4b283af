//! Read-only projections used by the dashboard views
//!
//! Everything here borrows store collections and computes on the fly.

use {
    crate::model::{Analytics, Bin, BinStatus, Driver, DriverStatus, Route, RouteStatus},
    chrono::{DateTime, Duration, Utc},
    serde::Serialize,
    std::collections::HashSet,
};

/// Batteries below this percentage are reported as low
pub const LOW_BATTERY_THRESHOLD: f64 = 20.0;

/// Bins below this fill level count as collected on a route
pub const ROUTE_COLLECTED_THRESHOLD: f64 = 10.0;

/// Bins above this fill level are urgent regardless of prediction
pub const URGENT_FILL_THRESHOLD: f64 = 80.0;

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(needle)
}

/// Bin list filter. Unset fields match everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BinFilter {
    /// Case-insensitive substring of area, address, or id
    pub search: Option<String>,
    pub status: Option<BinStatus>,
    pub area: Option<String>,
}

impl BinFilter {
    pub fn matches(&self, bin: &Bin) -> bool {
        let matches_search = match &self.search {
            Some(term) => {
                let term = term.to_lowercase();
                contains_ignore_case(&bin.location.area, &term)
                    || contains_ignore_case(&bin.location.address, &term)
                    || contains_ignore_case(&bin.id, &term)
            }
            None => true,
        };
        let matches_status = self.status.map_or(true, |s| bin.status == s);
        let matches_area = self.area.as_ref().map_or(true, |a| &bin.location.area == a);

        matches_search && matches_status && matches_area
    }

    pub fn apply<'a>(&self, bins: &'a [Bin]) -> Vec<&'a Bin> {
        bins.iter().filter(|b| self.matches(b)).collect()
    }
}

/// Status breakdown for a set of bins
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BinSummary {
    pub total: usize,
    pub empty: usize,
    pub half: usize,
    /// Full and overflowing
    pub full: usize,
    pub low_battery: usize,
}

impl BinSummary {
    pub fn from_bins<'a, I>(bins: I) -> Self
    where
        I: IntoIterator<Item = &'a Bin>,
    {
        let mut summary = Self::default();
        for bin in bins {
            summary.total += 1;
            match bin.status {
                BinStatus::Empty => summary.empty += 1,
                BinStatus::Half => summary.half += 1,
                BinStatus::Full | BinStatus::Overflow => summary.full += 1,
            }
            if bin.battery_level.is_some_and(|b| b < LOW_BATTERY_THRESHOLD) {
                summary.low_battery += 1;
            }
        }
        summary
    }
}

/// Distinct area names in first-seen order
pub fn areas(bins: &[Bin]) -> Vec<String> {
    let mut seen = HashSet::new();
    bins.iter()
        .filter(|b| seen.insert(b.location.area.as_str()))
        .map(|b| b.location.area.clone())
        .collect()
}

/// Bins above 80% or predicted to fill within the next 24 hours
pub fn urgent_bins(bins: &[Bin], now: DateTime<Utc>) -> Vec<&Bin> {
    let horizon = now + Duration::hours(24);
    bins.iter()
        .filter(|b| {
            b.fill_level > URGENT_FILL_THRESHOLD
                || b.predicted_full_time.is_some_and(|t| t < horizon)
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteProgress {
    pub total_bins: usize,
    pub collected_bins: usize,
    /// 0-100, 0 for a route with no bins
    pub percent: f64,
}

/// Progress of a route: bins on it that are (nearly) empty
///
/// Route bin ids that no longer resolve to a bin are ignored.
pub fn route_progress(route: &Route, bins: &[Bin]) -> RouteProgress {
    let route_bins: Vec<&Bin> = bins.iter().filter(|b| route.bins.contains(&b.id)).collect();
    let collected_bins = route_bins
        .iter()
        .filter(|b| b.fill_level < ROUTE_COLLECTED_THRESHOLD)
        .count();
    let percent = if route_bins.is_empty() {
        0.0
    } else {
        collected_bins as f64 / route_bins.len() as f64 * 100.0
    };

    RouteProgress {
        total_bins: route_bins.len(),
        collected_bins,
        percent,
    }
}

pub fn routes_for_driver<'a>(routes: &'a [Route], driver_id: &str) -> Vec<&'a Route> {
    routes
        .iter()
        .filter(|r| r.driver_id.as_deref() == Some(driver_id))
        .collect()
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RouteFilter {
    /// Case-insensitive substring of name or id
    pub search: Option<String>,
    pub status: Option<RouteStatus>,
}

impl RouteFilter {
    pub fn matches(&self, route: &Route) -> bool {
        let matches_search = self.search.as_ref().map_or(true, |term| {
            let term = term.to_lowercase();
            contains_ignore_case(&route.name, &term) || contains_ignore_case(&route.id, &term)
        });
        matches_search && self.status.map_or(true, |s| route.status == s)
    }

    pub fn apply<'a>(&self, routes: &'a [Route]) -> Vec<&'a Route> {
        routes.iter().filter(|r| self.matches(r)).collect()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteStatusCounts {
    pub total: usize,
    pub pending: usize,
    pub in_progress: usize,
    pub completed: usize,
}

impl RouteStatusCounts {
    pub fn from_routes(routes: &[Route]) -> Self {
        let mut counts = Self { total: routes.len(), ..Self::default() };
        for route in routes {
            match route.status {
                RouteStatus::Pending => counts.pending += 1,
                RouteStatus::InProgress => counts.in_progress += 1,
                RouteStatus::Completed => counts.completed += 1,
            }
        }
        counts
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DriverStatusCounts {
    pub total: usize,
    pub available: usize,
    pub on_route: usize,
    pub on_break: usize,
}

impl DriverStatusCounts {
    pub fn from_drivers(drivers: &[Driver]) -> Self {
        let mut counts = Self { total: drivers.len(), ..Self::default() };
        for driver in drivers {
            match driver.status {
                DriverStatus::Available => counts.available += 1,
                DriverStatus::OnRoute => counts.on_route += 1,
                DriverStatus::Break => counts.on_break += 1,
            }
        }
        counts
    }
}

/// Weekly collections as a percentage of one collection per bin per day
///
/// 0.0 for an empty fleet.
pub fn efficiency_rate(analytics: &Analytics) -> f64 {
    if analytics.total_bins == 0 {
        return 0.0;
    }
    analytics.weekly_collections as f64 / (analytics.total_bins * 7) as f64 * 100.0
}
