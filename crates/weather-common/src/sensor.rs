//! Sensor readings reported by home-automation devices.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Kind of measurement a datapoint carries, resolved from its name suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SensorKind {
    Temperature,
    Humidity,
    RainCounter,
    WindDirection,
    WindSpeed,
}

impl SensorKind {
    pub const ALL: [SensorKind; 5] = [
        SensorKind::Temperature,
        SensorKind::Humidity,
        SensorKind::RainCounter,
        SensorKind::WindDirection,
        SensorKind::WindSpeed,
    ];

    /// Datapoint name suffix used by the CCU for this kind.
    pub fn suffix(&self) -> &'static str {
        match self {
            Self::Temperature => ".ACTUAL_TEMPERATURE",
            Self::Humidity => ".HUMIDITY",
            Self::RainCounter => ".RAIN_COUNTER",
            Self::WindDirection => ".WIND_DIR",
            Self::WindSpeed => ".WIND_SPEED",
        }
    }

    /// Resolve a datapoint name such as `HmIP-SWO-PL 000:1.ACTUAL_TEMPERATURE`.
    ///
    /// Returns `None` for datapoints that are not recorded.
    pub fn from_datapoint_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| name.ends_with(kind.suffix()))
    }
}

/// A single persisted measurement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    /// Datapoint id (`ise_id`) on the CCU
    pub sensor_id: String,
    pub kind: SensorKind,
    pub value: f64,
    /// Server-local time of the measurement
    pub timestamp: NaiveDateTime,
}

/// Eight-point compass bucket for wind direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WindOctant {
    N,
    NE,
    E,
    SE,
    S,
    SW,
    W,
    NW,
}

impl WindOctant {
    /// Bucket a wind direction in degrees.
    ///
    /// The value is rounded to one decimal first, so readings between two
    /// tabulated ranges (22.46°) still resolve. Values outside 0..=360 wrap.
    pub fn from_degrees(degrees: f64) -> Self {
        let mut d = (degrees * 10.0).round() / 10.0;
        if !(0.0..=360.0).contains(&d) {
            d = d.rem_euclid(360.0);
        }

        match d {
            d if d < 22.5 => Self::N,
            d if d < 67.5 => Self::NE,
            d if d < 112.5 => Self::E,
            d if d < 157.5 => Self::SE,
            d if d < 202.5 => Self::S,
            d if d < 247.5 => Self::SW,
            d if d < 292.5 => Self::W,
            d if d < 337.5 => Self::NW,
            _ => Self::N,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::N => "N",
            Self::NE => "NE",
            Self::E => "E",
            Self::SE => "SE",
            Self::S => "S",
            Self::SW => "SW",
            Self::W => "W",
            Self::NW => "NW",
        }
    }
}

impl std::fmt::Display for WindOctant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Current outdoor values and today's extremes from the weather sensor.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct OutdoorConditions {
    pub temperature: Option<f64>,
    pub temperature_min: Option<f64>,
    pub temperature_max: Option<f64>,
    pub humidity: Option<f64>,
    pub humidity_min: Option<f64>,
    pub humidity_max: Option<f64>,
    /// mm accumulated over the last 24 hours
    pub rain_24h: Option<f64>,
    pub wind_direction: Option<WindOctant>,
    /// km/h
    pub wind_speed: Option<f64>,
    pub wind_speed_max: Option<f64>,
}

/// Current indoor values and today's extremes for one room.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct IndoorConditions {
    pub temperature: Option<f64>,
    pub temperature_min: Option<f64>,
    pub temperature_max: Option<f64>,
    pub humidity: Option<f64>,
    pub humidity_min: Option<f64>,
    pub humidity_max: Option<f64>,
}

impl IndoorConditions {
    /// Replace all humidity values with a fixed number, for rooms whose
    /// device has no humidity channel.
    pub fn with_humidity_override(mut self, humidity: Option<f64>) -> Self {
        if let Some(value) = humidity {
            self.humidity = Some(value);
            self.humidity_min = Some(value);
            self.humidity_max = Some(value);
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_from_suffix() {
        assert_eq!(
            SensorKind::from_datapoint_name("HmIP-STHO 0001:1.ACTUAL_TEMPERATURE"),
            Some(SensorKind::Temperature)
        );
        assert_eq!(
            SensorKind::from_datapoint_name("HmIP-SWO-PL 0002:1.RAIN_COUNTER"),
            Some(SensorKind::RainCounter)
        );
        assert_eq!(
            SensorKind::from_datapoint_name("HmIP-SWO-PL 0002:1.WIND_DIR"),
            Some(SensorKind::WindDirection)
        );
        assert_eq!(
            SensorKind::from_datapoint_name("HmIP-SWO-PL 0002:1.WIND_DIR_RANGE"),
            None
        );
        assert_eq!(SensorKind::from_datapoint_name("HmIP-STHO 0001:0.LOW_BAT"), None);
    }

    #[test]
    fn test_humidity_override() {
        let room = IndoorConditions {
            temperature: Some(21.0),
            humidity: Some(48.0),
            ..Default::default()
        };

        let fixed = room.with_humidity_override(Some(0.0));
        assert_eq!(fixed.humidity, Some(0.0));
        assert_eq!(fixed.humidity_min, Some(0.0));
        assert_eq!(fixed.humidity_max, Some(0.0));
        assert_eq!(fixed.temperature, Some(21.0));

        assert_eq!(room.with_humidity_override(None), room);
    }

    #[test]
    fn test_octant_boundaries() {
        let cases = [
            (0.0, WindOctant::N),
            (22.4, WindOctant::N),
            (22.5, WindOctant::NE),
            (67.4, WindOctant::NE),
            (67.5, WindOctant::E),
            (112.4, WindOctant::E),
            (112.5, WindOctant::SE),
            (157.4, WindOctant::SE),
            (157.5, WindOctant::S),
            (202.4, WindOctant::S),
            (202.5, WindOctant::SW),
            (247.4, WindOctant::SW),
            (247.5, WindOctant::W),
            (292.4, WindOctant::W),
            (292.5, WindOctant::NW),
            (337.4, WindOctant::NW),
            (337.5, WindOctant::N),
            (360.0, WindOctant::N),
        ];

        for (degrees, expected) in cases {
            assert_eq!(WindOctant::from_degrees(degrees), expected, "{degrees}°");
        }
    }

    #[test]
    fn test_octant_rounds_before_bucketing() {
        // 22.46 rounds to 22.5 and must not fall into a gap
        assert_eq!(WindOctant::from_degrees(22.46), WindOctant::NE);
        assert_eq!(WindOctant::from_degrees(22.44), WindOctant::N);
    }

    #[test]
    fn test_octant_total_over_range() {
        let mut tenth = 0;
        while tenth <= 3600 {
            let _ = WindOctant::from_degrees(tenth as f64 / 10.0);
            tenth += 1;
        }
        assert_eq!(WindOctant::from_degrees(-45.0), WindOctant::NW);
        assert_eq!(WindOctant::from_degrees(405.0), WindOctant::NE);
    }
}
