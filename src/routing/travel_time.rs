//! Travel-time estimates from distance and transport mode

use std::fmt::Display;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// How the traveller moves between stops
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum TravelMode {
    #[default]
    Driving,
    Walking,
    Transit,
    Cycling,
}

impl TravelMode {
    /// Average speed assumed when no live routing result is available
    #[must_use]
    pub fn average_speed_kmh(self) -> f64 {
        match self {
            Self::Driving => 50.0,
            Self::Walking => 5.0,
            Self::Transit => 30.0,
            Self::Cycling => 15.0,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Driving => "driving",
            Self::Walking => "walking",
            Self::Transit => "transit",
            Self::Cycling => "cycling",
        }
    }
}

/// Unknown names fall back to driving
impl From<&str> for TravelMode {
    fn from(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "walking" | "walk" => Self::Walking,
            "transit" | "public_transport" => Self::Transit,
            "cycling" | "bicycle" | "bike" => Self::Cycling,
            _ => Self::Driving,
        }
    }
}

impl From<String> for TravelMode {
    fn from(value: String) -> Self {
        Self::from(value.as_str())
    }
}

impl FromStr for TravelMode {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from(s))
    }
}

impl Display for TravelMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Estimated minutes to cover `distance_km`, rounded to one decimal place
#[must_use]
pub fn estimate(distance_km: f64, mode: TravelMode) -> f64 {
    let minutes = distance_km.max(0.0) / mode.average_speed_kmh() * 60.0;
    (minutes * 10.0).round() / 10.0
}
