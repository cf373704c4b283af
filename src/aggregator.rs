use {
    crate::model::{Analytics, Bin, BinStatus, CollectionRecord},
    chrono::{DateTime, Duration, Utc},
};

/// Trailing windows used for collection counts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CollectionWindow {
    Day,
    Week,
}

impl CollectionWindow {
    pub fn duration(&self) -> Duration {
        match self {
            CollectionWindow::Day => Duration::hours(24),
            CollectionWindow::Week => Duration::days(7),
        }
    }
}

/// How far ahead a predicted full time counts as an overflow risk
pub fn overflow_horizon() -> Duration {
    Duration::hours(24)
}

/// Recompute analytics from the current bins and collection log
///
/// Stateless and linear in fleet size; callers recompute on every read.
pub fn compute_analytics(
    bins: &[Bin],
    collections: &[CollectionRecord],
    now: DateTime<Utc>,
) -> Analytics {
    let mut full_bins = 0;
    let mut half_full_bins = 0;
    let mut empty_bins = 0;

    for bin in bins {
        match bin.status {
            BinStatus::Full | BinStatus::Overflow => full_bins += 1,
            BinStatus::Half => half_full_bins += 1,
            BinStatus::Empty => empty_bins += 1,
        }
    }

    Analytics {
        total_bins: bins.len(),
        full_bins,
        half_full_bins,
        empty_bins,
        daily_collections: count_collections_in_window(collections, CollectionWindow::Day, now),
        weekly_collections: count_collections_in_window(collections, CollectionWindow::Week, now),
        average_fill_rate: average_fill_level(bins),
        predicted_overflows: count_predicted_overflows(bins, now),
    }
}

/// Collections strictly newer than `now - window`
pub fn count_collections_in_window(
    collections: &[CollectionRecord],
    window: CollectionWindow,
    now: DateTime<Utc>,
) -> usize {
    let cutoff = now - window.duration();
    collections.iter().filter(|c| c.collected_at > cutoff).count()
}

/// Mean fill level, 0.0 when there are no bins
pub fn average_fill_level(bins: &[Bin]) -> f64 {
    if bins.is_empty() {
        return 0.0;
    }
    bins.iter().map(|b| b.fill_level).sum::<f64>() / bins.len() as f64
}

/// Bins predicted to be full before `now + 24h`
pub fn count_predicted_overflows(bins: &[Bin], now: DateTime<Utc>) -> usize {
    let horizon = now + overflow_horizon();
    bins.iter()
        .filter(|b| b.predicted_full_time.is_some_and(|t| t < horizon))
        .count()
}
