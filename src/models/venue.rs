//! Venue model shared by all recommendation kinds

use std::fmt::Display;

use serde::{Deserialize, Serialize};

use super::Coordinate;

/// Attraction visiting slot
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum TimeSlot {
    Morning,
    Evening,
}

/// Restaurant meal slot
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Meal {
    Breakfast,
    Lunch,
    Dinner,
}

/// Highest rating a recommender may give
pub const MAX_RATING: f64 = 5.0;

/// What a venue is, with the tags only that kind carries
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum VenueKind {
    Hotel,
    Attraction { time_slot: TimeSlot },
    Restaurant { meal: Meal },
}

/// A recommended venue as the routing engine sees it
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct LocatedVenue {
    pub name: String,
    #[serde(flatten)]
    pub kind: VenueKind,
    /// `None` when neither the record nor the fallback lookup had a position
    pub coordinate: Option<Coordinate>,
    /// Never negative
    pub price: f64,
    /// Between 0 and `MAX_RATING`
    pub rating: f64,
    /// 1-based trip day; hotels usually carry none
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

impl LocatedVenue {
    #[must_use]
    pub fn is_locatable(&self) -> bool {
        self.coordinate.is_some()
    }

    /// Pull `price` and `rating` back into range; NaN becomes 0.
    /// Returns whether anything changed.
    pub fn clamp_scores(&mut self) -> bool {
        let price = if self.price.is_nan() { 0.0 } else { self.price.max(0.0) };
        let rating = if self.rating.is_nan() {
            0.0
        } else {
            self.rating.clamp(0.0, MAX_RATING)
        };
        let changed = price.to_bits() != self.price.to_bits()
            || rating.to_bits() != self.rating.to_bits();
        self.price = price;
        self.rating = rating;
        changed
    }

    /// Day bucket used for route grouping; untagged venues fall into Day 1
    #[must_use]
    pub fn route_day(&self) -> u32 {
        self.day.unwrap_or(1)
    }

    #[must_use]
    pub fn kind_label(&self) -> &'static str {
        match self.kind {
            VenueKind::Hotel => "hotel",
            VenueKind::Attraction { .. } => "attraction",
            VenueKind::Restaurant { .. } => "restaurant",
        }
    }
}

impl Display for LocatedVenue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.kind {
            VenueKind::Hotel => write!(f, "🏨 {}", self.name)?,
            VenueKind::Attraction { time_slot } => {
                let slot = match time_slot {
                    TimeSlot::Morning => "morning",
                    TimeSlot::Evening => "evening",
                };
                write!(f, "🎯 {} ({slot})", self.name)?;
            }
            VenueKind::Restaurant { meal } => {
                let meal = match meal {
                    Meal::Breakfast => "breakfast",
                    Meal::Lunch => "lunch",
                    Meal::Dinner => "dinner",
                };
                write!(f, "🍽️ {} ({meal})", self.name)?;
            }
        }
        write!(f, " - ${:.2}, ⭐ {:.1}/5.0", self.price, self.rating)
    }
}
