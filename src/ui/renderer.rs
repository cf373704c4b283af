// Formatting helpers shared by the dashboard widgets

use {
    crate::model::BinStatus,
    chrono::{DateTime, Utc},
    ratatui::style::Color,
};

/// Format a fill percentage for display
pub fn format_fill(fill_level: f64) -> String {
    format!("{:.1}%", fill_level)
}

/// Format a battery level, `-` when the sensor does not report one
pub fn format_battery(battery_level: Option<f64>) -> String {
    match battery_level {
        Some(level) => format!("{:.0}%", level),
        None => "-".to_string(),
    }
}

pub fn format_temperature(temperature: Option<f64>) -> String {
    match temperature {
        Some(t) => format!("{:.0}°C", t),
        None => "-".to_string(),
    }
}

/// Time until a predicted full time, relative to `now`
pub fn format_eta(predicted: Option<DateTime<Utc>>, now: DateTime<Utc>) -> String {
    let Some(at) = predicted else {
        return "-".to_string();
    };
    let minutes = (at - now).num_minutes();
    if minutes <= 0 {
        "now".to_string()
    } else if minutes < 60 {
        format!("{}m", minutes)
    } else if minutes < 48 * 60 {
        format!("{}h", minutes / 60)
    } else {
        format!("{}d", minutes / (24 * 60))
    }
}

pub fn format_time(at: DateTime<Utc>) -> String {
    at.format("%H:%M:%S").to_string()
}

pub fn status_color(status: BinStatus) -> Color {
    match status {
        BinStatus::Empty => Color::Green,
        BinStatus::Half => Color::Yellow,
        BinStatus::Full => Color::LightRed,
        BinStatus::Overflow => Color::Red,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_format_eta() {
        let now = Utc::now();
        assert_eq!(format_eta(None, now), "-");
        assert_eq!(format_eta(Some(now - Duration::hours(1)), now), "now");
        assert_eq!(format_eta(Some(now + Duration::minutes(45)), now), "45m");
        assert_eq!(format_eta(Some(now + Duration::hours(30)), now), "30h");
        assert_eq!(format_eta(Some(now + Duration::days(5)), now), "5d");
    }

    #[test]
    fn test_format_levels() {
        assert_eq!(format_fill(95.04), "95.0%");
        assert_eq!(format_battery(Some(87.4)), "87%");
        assert_eq!(format_battery(None), "-");
        assert_eq!(format_temperature(Some(21.0)), "21°C");
    }
}
