//! `tripplanner` - Route optimisation and day clustering for multi-day trips
//!
//! Takes hotel, attraction and restaurant recommendations, fills in missing
//! coordinates, groups venues by day and orders each day with a
//! nearest-neighbor heuristic. Optional live services add road travel times
//! and weather notes.

pub mod assembler;
pub mod cache;
pub mod cli;
pub mod config;
pub mod error;
pub mod geo;
pub mod itinerary;
pub mod location_resolver;
pub mod logging;
pub mod models;
pub mod recommendations;
pub mod routing;
pub mod weather;

// Re-export core types for public API
pub use assembler::DayRouteAssembler;
pub use config::PlannerConfig;
pub use error::PlannerError;
pub use itinerary::{DayPlan, Itinerary, ItineraryPlanner, TripRequest};
pub use location_resolver::{CoordinateLookup, DatasetResolver, NoLookup};
pub use models::{Coordinate, DayRoute, LocatedVenue, RoutePlan, VenueKind};
pub use recommendations::RecommendationSet;
pub use routing::{TravelMode, cluster_by_proximity, estimate, nearest_neighbor_route};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, PlannerError>;
