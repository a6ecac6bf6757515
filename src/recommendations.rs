//! Recommender outputs consumed by the route assembler
//!
//! The recommenders themselves live elsewhere; these are the shapes of what
//! they hand over. Coordinates follow the upstream convention where a missing
//! position is written as `0, 0`.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::PlannerError;
use crate::models::{Meal, parse_day_label};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HotelRecommendation {
    pub name: String,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub rating: f64,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub latitude: f64,
    #[serde(default)]
    pub longitude: f64,
    /// Explicit day assignment; hotels are shared across days otherwise
    #[serde(default)]
    pub day: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AttractionRecommendation {
    pub name: String,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub rating: f64,
    #[serde(default)]
    pub latitude: f64,
    #[serde(default)]
    pub longitude: f64,
    #[serde(default)]
    pub address: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RestaurantRecommendation {
    pub name: String,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub rating: f64,
    #[serde(default)]
    pub latitude: f64,
    #[serde(default)]
    pub longitude: f64,
    #[serde(default)]
    pub address: String,
}

/// Attractions recommended for one day, split by time slot
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AttractionDay {
    pub morning: Vec<AttractionRecommendation>,
    pub evening: Vec<AttractionRecommendation>,
}

/// Everything the recommenders produced for one trip request
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RecommendationSet {
    pub hotels: Vec<HotelRecommendation>,
    /// Keyed by day label, e.g. `"Day 1"`
    pub attractions: BTreeMap<String, AttractionDay>,
    /// Keyed by day label, then meal
    pub restaurants: BTreeMap<String, BTreeMap<Meal, Vec<RestaurantRecommendation>>>,
    /// Attractions with no day yet; the planner spreads them over days by proximity
    pub unscheduled: Vec<AttractionRecommendation>,
}

impl RecommendationSet {
    /// Read a recommendation set from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read recommendations from {}", path.display()))?;
        serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse recommendations in {}", path.display()))
    }

    /// Combine per-recommender results. A failed recommender contributes
    /// nothing and is logged; the plan goes ahead with what did arrive.
    pub fn from_sources(
        hotels: std::result::Result<Vec<HotelRecommendation>, PlannerError>,
        attractions: std::result::Result<BTreeMap<String, AttractionDay>, PlannerError>,
        restaurants: std::result::Result<
            BTreeMap<String, BTreeMap<Meal, Vec<RestaurantRecommendation>>>,
            PlannerError,
        >,
    ) -> Self {
        Self {
            hotels: received("hotel recommender", hotels),
            attractions: received("attraction recommender", attractions),
            restaurants: received("restaurant recommender", restaurants),
            unscheduled: Vec::new(),
        }
    }

    /// Attraction days in numeric day order; unparseable labels are skipped
    pub fn attraction_days(&self) -> Vec<(u32, &AttractionDay)> {
        numbered(&self.attractions)
    }

    /// Restaurant days in numeric day order; unparseable labels are skipped
    pub fn restaurant_days(&self) -> Vec<(u32, &BTreeMap<Meal, Vec<RestaurantRecommendation>>)> {
        numbered(&self.restaurants)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.hotels.is_empty()
            && self.attractions.is_empty()
            && self.restaurants.is_empty()
            && self.unscheduled.is_empty()
    }
}

fn received<T: Default>(source: &str, result: std::result::Result<T, PlannerError>) -> T {
    match result {
        Ok(value) => value,
        Err(e) => {
            let e = match e {
                e @ PlannerError::UpstreamUnavailable { .. } => e,
                other => PlannerError::upstream(source, other.to_string()),
            };
            warn!("{}; continuing without it", e);
            T::default()
        }
    }
}

fn numbered<V>(by_label: &BTreeMap<String, V>) -> Vec<(u32, &V)> {
    let mut days: Vec<(u32, &V)> = by_label
        .iter()
        .filter_map(|(label, value)| match parse_day_label(label) {
            Some(day) => Some((day, value)),
            None => {
                warn!("Ignoring recommendations under unrecognised day label '{}'", label);
                None
            }
        })
        .collect();
    days.sort_by_key(|(day, _)| *day);
    days
}
