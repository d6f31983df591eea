//! Air-quality index and pollutant snapshot.
//!
//! Index categories follow the Umweltbundesamt air-quality index (LQI):
//! the pollutant with the worst category at a station determines the index.

use serde::{Deserialize, Serialize};

/// Ordinal air-quality category, 1 = worst, 5 = best, 99 = unknown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AirQualityIndex {
    VeryBad = 1,
    Bad = 2,
    Moderate = 3,
    Good = 4,
    VeryGood = 5,
    Unknown = 99,
}

impl AirQualityIndex {
    pub fn code(&self) -> u8 {
        *self as u8
    }

    pub fn from_code(code: i64) -> Self {
        match code {
            1 => Self::VeryBad,
            2 => Self::Bad,
            3 => Self::Moderate,
            4 => Self::Good,
            5 => Self::VeryGood,
            _ => Self::Unknown,
        }
    }

    /// Parse an index label as published by UBA (German) or in English.
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_lowercase().as_str() {
            "sehr schlecht" | "very bad" => Self::VeryBad,
            "schlecht" | "bad" => Self::Bad,
            "mäßig" | "maessig" | "moderate" => Self::Moderate,
            "gut" | "good" => Self::Good,
            "sehr gut" | "very good" => Self::VeryGood,
            _ => Self::Unknown,
        }
    }

    /// Display label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::VeryBad => "very bad",
            Self::Bad => "bad",
            Self::Moderate => "moderate",
            Self::Good => "good",
            Self::VeryGood => "very good",
            Self::Unknown => "unknown",
        }
    }

    /// Combine two station categories, keeping the worse one.
    ///
    /// `Unknown` has the highest code, so it only survives when no station
    /// reported a category.
    pub fn worst(self, other: Self) -> Self {
        self.min(other)
    }
}

impl Default for AirQualityIndex {
    fn default() -> Self {
        Self::Unknown
    }
}

/// Pollutants persisted per air-quality snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Pollutant {
    Pm10,
    O3,
    No2,
    /// The combined index, stored alongside the pollutant values
    Lqi,
}

impl Pollutant {
    pub const ALL: [Pollutant; 4] = [Pollutant::Pm10, Pollutant::O3, Pollutant::No2, Pollutant::Lqi];

    /// Key stored in the `pollutant` column.
    pub fn key(&self) -> &'static str {
        match self {
            Self::Pm10 => "PM10",
            Self::O3 => "O3",
            Self::No2 => "NO2",
            Self::Lqi => "LQI",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.key() == key)
    }
}

/// Pollutant concentrations in µg/m³ and the resulting index.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct AirQualitySnapshot {
    pub pm10: Option<f64>,
    pub o3: Option<f64>,
    pub no2: Option<f64>,
    pub index: AirQualityIndex,
}

impl AirQualitySnapshot {
    pub fn value(&self, pollutant: Pollutant) -> Option<f64> {
        match pollutant {
            Pollutant::Pm10 => self.pm10,
            Pollutant::O3 => self.o3,
            Pollutant::No2 => self.no2,
            Pollutant::Lqi => Some(self.index.code() as f64),
        }
    }

    /// Merge another station's values: maximum per pollutant, worst index.
    pub fn merge(self, other: Self) -> Self {
        Self {
            pm10: max_present(self.pm10, other.pm10),
            o3: max_present(self.o3, other.o3),
            no2: max_present(self.no2, other.no2),
            index: self.index.worst(other.index),
        }
    }
}

fn max_present(a: Option<f64>, b: Option<f64>) -> Option<f64> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a.max(b)),
        (a, None) => a,
        (None, b) => b,
    }
}
