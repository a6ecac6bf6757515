//! Route output models: per-day ordered stops and the day-keyed plan

use std::collections::BTreeMap;

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

use super::LocatedVenue;

/// Format a 1-based day as its display label, e.g. `"Day 3"`
#[must_use]
pub fn day_label(day: u32) -> String {
    format!("Day {day}")
}

/// Parse a `"Day N"` label (case-insensitive, N ≥ 1)
#[must_use]
pub fn parse_day_label(label: &str) -> Option<u32> {
    let label = label.trim();
    let (prefix, number) = label.split_at_checked(3)?;
    if !prefix.eq_ignore_ascii_case("day") {
        return None;
    }
    number
        .trim()
        .parse::<u32>()
        .ok()
        .filter(|day| *day >= 1)
}

/// Whether a leg's timing came from a live routing service
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LegStatus {
    Measured,
    Estimated,
}

/// A venue in visiting order with the derived distance to its successor
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct RouteStop {
    #[serde(flatten)]
    pub venue: LocatedVenue,
    pub distance_to_next_km: f64,
}

/// One leg between consecutive stops of a day route
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct RouteSegment {
    /// Index of the origin stop
    pub from: usize,
    /// Index of the destination stop
    pub to: usize,
    /// Great-circle distance
    pub distance_km: f64,
    pub duration_minutes: f64,
    pub status: LegStatus,
    /// Road distance reported by the live service, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub road_distance_km: Option<f64>,
}

/// Ordered, distance-annotated stops for a single day
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct DayRoute {
    pub day: u32,
    #[serde(rename = "locations")]
    pub stops: Vec<RouteStop>,
    pub segments: Vec<RouteSegment>,
    pub total_distance_km: f64,
    pub estimated_time_minutes: f64,
}

impl DayRoute {
    /// Route for a day with nothing to visit
    #[must_use]
    pub fn empty(day: u32) -> Self {
        Self {
            day,
            stops: Vec::new(),
            segments: Vec::new(),
            total_distance_km: 0.0,
            estimated_time_minutes: 0.0,
        }
    }

    #[must_use]
    pub fn label(&self) -> String {
        day_label(self.day)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stops.is_empty()
    }

    pub fn venue_names(&self) -> impl Iterator<Item = &str> {
        self.stops.iter().map(|stop| stop.venue.name.as_str())
    }

    /// Whether every leg was timed by a live routing service
    #[must_use]
    pub fn fully_measured(&self) -> bool {
        !self.segments.is_empty()
            && self
                .segments
                .iter()
                .all(|segment| segment.status == LegStatus::Measured)
    }
}

/// Raw venue listing plus the day-keyed routes derived from it
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RoutePlan {
    /// Every venue received, including ones that could not be located
    pub venues: Vec<LocatedVenue>,
    pub days: BTreeMap<u32, DayRoute>,
}

impl RoutePlan {
    #[must_use]
    pub fn day(&self, day: u32) -> Option<&DayRoute> {
        self.days.get(&day)
    }

    #[must_use]
    pub fn total_distance_km(&self) -> f64 {
        self.days.values().map(|route| route.total_distance_km).sum()
    }

    /// Venues left off every route for lack of a position
    pub fn unlocated(&self) -> impl Iterator<Item = &LocatedVenue> {
        self.venues.iter().filter(|venue| !venue.is_locatable())
    }
}

/// Serialises as `{"venues": [...], "routes": {"Day 1": {...}, "Day 2": {...}}}`
/// with days in numeric rather than lexical order.
impl Serialize for RoutePlan {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        struct Routes<'a>(&'a BTreeMap<u32, DayRoute>);

        impl Serialize for Routes<'_> {
            fn serialize<S: Serializer>(
                &self,
                serializer: S,
            ) -> std::result::Result<S::Ok, S::Error> {
                let mut map = serializer.serialize_map(Some(self.0.len()))?;
                for (day, route) in self.0 {
                    map.serialize_entry(&day_label(*day), route)?;
                }
                map.end()
            }
        }

        let mut map = serializer.serialize_map(Some(2))?;
        map.serialize_entry("venues", &self.venues)?;
        map.serialize_entry("routes", &Routes(&self.days))?;
        map.end()
    }
}
