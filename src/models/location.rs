//! Geographic coordinate model

use serde::{Deserialize, Serialize};

use crate::{PlannerError, Result};

/// Latitude/longitude pair in decimal degrees
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct Coordinate {
    /// Latitude in decimal degrees
    pub latitude: f64,
    /// Longitude in decimal degrees
    pub longitude: f64,
}

impl Coordinate {
    /// Create a validated coordinate
    pub fn new(latitude: f64, longitude: f64) -> Result<Self> {
        let coordinate = Self {
            latitude,
            longitude,
        };
        coordinate.validate()?;
        Ok(coordinate)
    }

    /// Validate a raw upstream pair, mapping the `(0, 0)` placeholder to `None`
    pub fn from_raw(latitude: f64, longitude: f64) -> Result<Option<Self>> {
        if latitude == 0.0 && longitude == 0.0 {
            return Ok(None);
        }
        Self::new(latitude, longitude).map(Some)
    }

    /// Parse a bracketed textual pair such as `"[49.28, -123.12]"`
    #[must_use]
    pub fn parse_text(text: &str) -> Option<Self> {
        let inner = text
            .trim()
            .trim_start_matches(['[', '('])
            .trim_end_matches([']', ')']);
        let mut parts = inner.split(',').map(str::trim);
        let latitude = parts.next()?.parse::<f64>().ok()?;
        let longitude = parts.next()?.parse::<f64>().ok()?;
        Self::new(latitude, longitude).ok()
    }

    pub fn validate(&self) -> Result<()> {
        let in_range = self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude);
        if in_range {
            Ok(())
        } else {
            Err(PlannerError::invalid_coordinate(
                self.latitude,
                self.longitude,
            ))
        }
    }

    /// Format location as coordinates string
    #[must_use]
    pub fn format_coordinates(&self) -> String {
        format!("{:.4}, {:.4}", self.latitude, self.longitude)
    }

    /// Round coordinates for cache key generation
    #[must_use]
    pub fn rounded_coordinates(&self, precision: u32) -> (f64, f64) {
        let multiplier = 10_f64.powi(i32::try_from(precision).unwrap_or(4));
        let lat = (self.latitude * multiplier).round() / multiplier;
        let lon = (self.longitude * multiplier).round() / multiplier;
        (lat, lon)
    }

    /// Cache key fragment, stable to ~10 m
    #[must_use]
    pub fn to_key(&self) -> String {
        let (lat, lon) = self.rounded_coordinates(4);
        format!("{lat:.4}:{lon:.4}")
    }
}

impl From<Coordinate> for haversine::Location {
    fn from(value: Coordinate) -> Self {
        haversine::Location {
            latitude: value.latitude,
            longitude: value.longitude,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_zero_pair_is_missing() {
        assert_eq!(Coordinate::from_raw(0.0, 0.0).unwrap(), None);
        assert!(Coordinate::from_raw(0.0, 12.5).unwrap().is_some());
    }

    #[rstest]
    #[case(90.5, 0.0)]
    #[case(-91.0, 10.0)]
    #[case(45.0, 180.1)]
    #[case(f64::NAN, 10.0)]
    #[case(10.0, f64::INFINITY)]
    fn test_invalid_coordinates_rejected(#[case] lat: f64, #[case] lon: f64) {
        let result = Coordinate::new(lat, lon);
        assert!(matches!(result, Err(PlannerError::InvalidCoordinate { .. })));
    }

    #[rstest]
    #[case("[49.2827, -123.1207]", 49.2827, -123.1207)]
    #[case("(49.2827,-123.1207)", 49.2827, -123.1207)]
    #[case(" [ -33.86 , 151.2 ] ", -33.86, 151.2)]
    fn test_parse_text(#[case] text: &str, #[case] lat: f64, #[case] lon: f64) {
        let coordinate = Coordinate::parse_text(text).unwrap();
        assert_eq!(coordinate.latitude, lat);
        assert_eq!(coordinate.longitude, lon);
    }

    #[rstest]
    #[case("")]
    #[case("[49.28]")]
    #[case("[north, west]")]
    #[case("[95.0, 10.0]")]
    fn test_parse_text_rejects_malformed(#[case] text: &str) {
        assert!(Coordinate::parse_text(text).is_none());
    }

    #[test]
    fn test_cache_key() {
        let coordinate = Coordinate::new(49.282_734, -123.120_74).unwrap();
        assert_eq!(coordinate.to_key(), "49.2827:-123.1207");
    }
}
