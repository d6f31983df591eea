//! Forecast data for one fetch cycle.

use serde::{Deserialize, Serialize};

/// Number of daily entries shown on the display (today + 2 days).
pub const DAILY_ENTRIES: usize = 3;

/// Number of hourly entries shown on the display.
pub const HOURLY_ENTRIES: usize = 24;

/// One day of forecast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyForecast {
    /// `%d.%m.` in local time
    pub date: String,
    /// Abbreviated weekday name
    pub weekday: String,
    pub icon: String,
    pub temp_low: f64,
    pub temp_high: f64,
    /// km/h
    pub wind_gust: f64,
    /// Percent (0-100)
    pub rain_probability: f64,
    /// mm/h
    pub rain_intensity: f64,
}

/// One hour of forecast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourlyForecast {
    /// `%H` in local time
    pub hour_label: String,
    pub icon: String,
    pub temperature: f64,
    /// Percent (0-100)
    pub rain_probability: f64,
    pub wind_gust: f64,
}

impl HourlyForecast {
    /// Rain probability is only shown when it is significant or rain is the
    /// forecast condition.
    pub fn shows_rain(&self) -> bool {
        self.rain_probability >= 30.0 || self.icon == "rain"
    }
}

/// Everything the forecast API contributes to a render.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastBundle {
    /// Current summary, already truncated for display
    pub summary: String,
    pub icon: String,
    /// `%H:%M` in local time
    pub sunrise: Option<String>,
    pub sunset: Option<String>,
    pub moon: Option<Moon>,
    /// At most [`DAILY_ENTRIES`], starting today
    pub daily: Vec<DailyForecast>,
    /// At most [`HOURLY_ENTRIES`], starting with the current hour
    pub hourly: Vec<HourlyForecast>,
}

/// Today's moon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Moon {
    /// Position in the lunation, 0-100
    pub percent: u8,
    pub phase: MoonPhase,
}

impl Moon {
    pub fn from_fraction(fraction: f64) -> Self {
        let percent = moon_percent(fraction);
        Self {
            percent,
            phase: MoonPhase::from_percent(percent),
        }
    }
}

/// Moon phase icon buckets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MoonPhase {
    New,
    WaxingCrescent,
    FirstQuarter,
    WaxingGibbous,
    Full,
    WaningGibbous,
    LastQuarter,
    WaningCrescent,
}

impl MoonPhase {
    /// Bucket an integer lunation percentage (values above 100 clamp).
    pub fn from_percent(percent: u8) -> Self {
        match percent.min(100) {
            0..=2 | 98..=100 => Self::New,
            3..=17 => Self::WaxingCrescent,
            18..=32 => Self::FirstQuarter,
            33..=47 => Self::WaxingGibbous,
            48..=52 => Self::Full,
            53..=67 => Self::WaningGibbous,
            68..=82 => Self::LastQuarter,
            _ => Self::WaningCrescent,
        }
    }

    /// Icon name referenced by the SVG templates.
    pub fn icon(&self) -> &'static str {
        match self {
            Self::New => "moon-0",
            Self::WaxingCrescent => "moon-waxing-25",
            Self::FirstQuarter => "moon-waxing-50",
            Self::WaxingGibbous => "moon-waxing-75",
            Self::Full => "moon-100",
            Self::WaningGibbous => "moon-waning-75",
            Self::LastQuarter => "moon-waning-50",
            Self::WaningCrescent => "moon-waning-25",
        }
    }
}

/// Convert the API's lunation fraction (0.0-1.0) into a whole percentage.
pub fn moon_percent(fraction: f64) -> u8 {
    (fraction * 100.0).round().clamp(0.0, 100.0) as u8
}

/// Truncate a summary to `max_chars` characters, marking the cut with `...`.
pub fn truncate_summary(summary: &str, max_chars: usize) -> String {
    let mut chars = summary.chars();
    let head: String = chars.by_ref().take(max_chars).collect();
    if chars.next().is_some() {
        format!("{}...", head)
    } else {
        head
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_moon_boundaries() {
        let cases = [
            (0, MoonPhase::New),
            (2, MoonPhase::New),
            (3, MoonPhase::WaxingCrescent),
            (17, MoonPhase::WaxingCrescent),
            (18, MoonPhase::FirstQuarter),
            (32, MoonPhase::FirstQuarter),
            (33, MoonPhase::WaxingGibbous),
            (47, MoonPhase::WaxingGibbous),
            (48, MoonPhase::Full),
            (52, MoonPhase::Full),
            (53, MoonPhase::WaningGibbous),
            (67, MoonPhase::WaningGibbous),
            (68, MoonPhase::LastQuarter),
            (82, MoonPhase::LastQuarter),
            (83, MoonPhase::WaningCrescent),
            (97, MoonPhase::WaningCrescent),
            (98, MoonPhase::New),
            (100, MoonPhase::New),
        ];

        for (percent, expected) in cases {
            assert_eq!(MoonPhase::from_percent(percent), expected, "{percent}%");
        }
    }

    #[test]
    fn test_moon_icons_distinct() {
        let icons: std::collections::HashSet<_> =
            (0..=100).map(|p| MoonPhase::from_percent(p).icon()).collect();
        assert_eq!(icons.len(), 8);
    }

    #[test]
    fn test_moon_percent_rounding() {
        assert_eq!(moon_percent(0.0), 0);
        assert_eq!(moon_percent(0.476), 48);
        assert_eq!(moon_percent(0.999), 100);
        assert_eq!(moon_percent(1.2), 100);
    }

    #[test]
    fn test_moon_from_fraction() {
        let moon = Moon::from_fraction(0.5);
        assert_eq!(moon.percent, 50);
        assert_eq!(moon.phase, MoonPhase::Full);
        assert_eq!(Moon::from_fraction(0.02).phase.icon(), "moon-0");
    }

    #[test]
    fn test_truncate_summary() {
        assert_eq!(
            truncate_summary("Clear and cold for the rest of the day.", 20),
            "Clear and cold for t..."
        );
        assert_eq!(truncate_summary("Leichter Regen", 20), "Leichter Regen");
        assert_eq!(truncate_summary("Exactly twenty chars", 20), "Exactly twenty chars");
    }

    #[test]
    fn test_truncate_summary_multibyte() {
        // Umlauts count as one character each
        let long = "Überwiegend bewölkt und später Regen";
        assert_eq!(truncate_summary(long, 20), "Überwiegend bewölkt ...");
    }

    #[test]
    fn test_hourly_rain_visibility() {
        let mut hour = HourlyForecast {
            hour_label: "14".into(),
            icon: "cloudy".into(),
            temperature: 12.0,
            rain_probability: 29.0,
            wind_gust: 10.0,
        };
        assert!(!hour.shows_rain());
        hour.rain_probability = 30.0;
        assert!(hour.shows_rain());
        hour.rain_probability = 5.0;
        hour.icon = "rain".into();
        assert!(hour.shows_rain());
    }
}
