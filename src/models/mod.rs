//! Data models for the trip planner
//!
//! This module contains the core domain models organized by concern:
//! - Location: geographic coordinates
//! - Venue: hotels, attractions and restaurants as the router sees them
//! - Route: ordered day routes and the day-keyed plan
//! - Weather: per-day conditions used for itinerary notes

pub mod location;
pub mod route;
pub mod venue;
pub mod weather;

// Re-export all public types for convenient access
pub use location::Coordinate;
pub use route::{
    DayRoute, LegStatus, RoutePlan, RouteSegment, RouteStop, day_label, parse_day_label,
};
pub use venue::{LocatedVenue, Meal, TimeSlot, VenueKind};
pub use weather::{ActivityType, DayWeather, WeatherCondition};
