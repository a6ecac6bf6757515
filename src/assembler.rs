//! Day Route Assembly Module
//!
//! Turns heterogeneous recommender output into one flat venue listing, groups
//! the locatable venues by day and orders each day with the nearest-neighbor
//! router.

use std::collections::BTreeMap;

use tracing::{debug, info, warn};

use crate::geo;
use crate::location_resolver::CoordinateLookup;
use crate::models::{
    Coordinate, DayRoute, LegStatus, LocatedVenue, Meal, RoutePlan, RouteSegment, RouteStop,
    TimeSlot, VenueKind,
};
use crate::recommendations::RecommendationSet;
use crate::routing::{TravelMode, cluster_by_proximity, estimate, nearest_neighbor_route};
use crate::{PlannerError, Result};

/// Builds day routes from recommender output for one planning request
pub struct DayRouteAssembler<'a> {
    resolver: &'a dyn CoordinateLookup,
    mode: TravelMode,
}

impl<'a> DayRouteAssembler<'a> {
    pub fn new(resolver: &'a dyn CoordinateLookup, mode: TravelMode) -> Self {
        Self { resolver, mode }
    }

    #[must_use]
    pub fn mode(&self) -> TravelMode {
        self.mode
    }

    /// Flatten all recommendations into a single venue listing.
    ///
    /// Order: hotels, then attractions by day (morning before evening), then
    /// restaurants by day (breakfast, lunch, dinner). Every venue is kept;
    /// ones whose position cannot be found carry `coordinate: None`.
    pub fn extract_locations(&self, recommendations: &RecommendationSet) -> Result<Vec<LocatedVenue>> {
        let mut venues = Vec::new();

        for hotel in &recommendations.hotels {
            venues.push(LocatedVenue {
                name: hotel.name.clone(),
                kind: VenueKind::Hotel,
                coordinate: self.locate(&hotel.name, &hotel.address, hotel.latitude, hotel.longitude)?,
                price: hotel.price,
                rating: hotel.rating,
                day: hotel.day,
                address: non_empty(&hotel.address),
            });
        }

        for (day, slots) in recommendations.attraction_days() {
            for (time_slot, attractions) in [
                (TimeSlot::Morning, &slots.morning),
                (TimeSlot::Evening, &slots.evening),
            ] {
                for attraction in attractions {
                    venues.push(LocatedVenue {
                        name: attraction.name.clone(),
                        kind: VenueKind::Attraction { time_slot },
                        coordinate: self.locate(
                            &attraction.name,
                            &attraction.address,
                            attraction.latitude,
                            attraction.longitude,
                        )?,
                        price: attraction.price,
                        rating: attraction.rating,
                        day: Some(day),
                        address: non_empty(&attraction.address),
                    });
                }
            }
        }

        for (day, meals) in recommendations.restaurant_days() {
            for meal in [Meal::Breakfast, Meal::Lunch, Meal::Dinner] {
                for restaurant in meals.get(&meal).into_iter().flatten() {
                    venues.push(LocatedVenue {
                        name: restaurant.name.clone(),
                        kind: VenueKind::Restaurant { meal },
                        coordinate: self.locate(
                            &restaurant.name,
                            &restaurant.address,
                            restaurant.latitude,
                            restaurant.longitude,
                        )?,
                        price: restaurant.price,
                        rating: restaurant.rating,
                        day: Some(day),
                        address: non_empty(&restaurant.address),
                    });
                }
            }
        }

        venues.iter_mut().for_each(check_scores);
        debug!("Extracted {} venues from recommendations", venues.len());
        Ok(venues)
    }

    /// Attractions the recommender left without a day, as morning visits
    /// with no day assigned yet
    pub fn extract_unscheduled(
        &self,
        recommendations: &RecommendationSet,
    ) -> Result<Vec<LocatedVenue>> {
        recommendations
            .unscheduled
            .iter()
            .map(|attraction| {
                let mut venue = LocatedVenue {
                    name: attraction.name.clone(),
                    kind: VenueKind::Attraction {
                        time_slot: TimeSlot::Morning,
                    },
                    coordinate: self.locate(
                        &attraction.name,
                        &attraction.address,
                        attraction.latitude,
                        attraction.longitude,
                    )?,
                    price: attraction.price,
                    rating: attraction.rating,
                    day: None,
                    address: non_empty(&attraction.address),
                };
                check_scores(&mut venue);
                Ok(venue)
            })
            .collect()
    }

    /// Position from the record, else from the fallback lookup, else none
    fn locate(
        &self,
        name: &str,
        address: &str,
        latitude: f64,
        longitude: f64,
    ) -> Result<Option<Coordinate>> {
        if let Some(coordinate) = Coordinate::from_raw(latitude, longitude)? {
            return Ok(Some(coordinate));
        }

        let resolved = self.resolver.resolve(name, address);
        if resolved.is_none() {
            warn!("{}; excluded from routing", PlannerError::unresolved(name));
        }
        Ok(resolved)
    }

    /// Locatable venues by route day. Venues without a day (hotels, normally)
    /// go to Day 1 for grouping only; the venue itself is not modified.
    #[must_use]
    pub fn group_by_day(venues: &[LocatedVenue]) -> BTreeMap<u32, Vec<LocatedVenue>> {
        let mut by_day: BTreeMap<u32, Vec<LocatedVenue>> = BTreeMap::new();
        for venue in venues.iter().filter(|v| v.is_locatable()) {
            by_day.entry(venue.route_day()).or_default().push(venue.clone());
        }
        by_day
    }

    /// Order one day's venues and annotate each leg.
    ///
    /// Fewer than two venues need no ordering and give a zero-length route.
    /// Otherwise stops follow the nearest-neighbor order from the first venue,
    /// each stop records the distance to its successor (0 for the last one)
    /// and the day total is the exact sum of those legs.
    pub fn build_day_route(&self, day: u32, venues: Vec<LocatedVenue>) -> Result<DayRoute> {
        let venues: Vec<LocatedVenue> = venues.into_iter().filter(|v| v.is_locatable()).collect();

        if venues.len() < 2 {
            return Ok(DayRoute {
                day,
                stops: venues
                    .into_iter()
                    .map(|venue| RouteStop {
                        venue,
                        distance_to_next_km: 0.0,
                    })
                    .collect(),
                segments: Vec::new(),
                total_distance_km: 0.0,
                estimated_time_minutes: 0.0,
            });
        }

        let coordinates: Vec<Coordinate> = venues.iter().filter_map(|v| v.coordinate).collect();
        let order = nearest_neighbor_route(&coordinates, None)?;

        let mut stops: Vec<RouteStop> = order
            .iter()
            .map(|&i| RouteStop {
                venue: venues[i].clone(),
                distance_to_next_km: 0.0,
            })
            .collect();

        let mut segments = Vec::with_capacity(stops.len() - 1);
        let mut total_distance_km = 0.0;
        for i in 0..order.len() - 1 {
            let d = geo::distance(&coordinates[order[i]], &coordinates[order[i + 1]])?;
            stops[i].distance_to_next_km = d;
            total_distance_km += d;
            segments.push(RouteSegment {
                from: i,
                to: i + 1,
                distance_km: d,
                duration_minutes: estimate(d, self.mode),
                status: LegStatus::Estimated,
                road_distance_km: None,
            });
        }

        debug!(
            "Day {} route: {} stops, {:.2}km",
            day,
            stops.len(),
            total_distance_km
        );

        Ok(DayRoute {
            day,
            stops,
            segments,
            total_distance_km,
            estimated_time_minutes: estimate(total_distance_km, self.mode),
        })
    }

    /// Full pipeline: raw listing plus one route per day that has venues
    pub fn assemble(&self, recommendations: &RecommendationSet) -> Result<RoutePlan> {
        let venues = self.extract_locations(recommendations)?;
        let mut days = BTreeMap::new();
        for (day, day_venues) in Self::group_by_day(&venues) {
            days.insert(day, self.build_day_route(day, day_venues)?);
        }

        let unlocated = venues.iter().filter(|v| !v.is_locatable()).count();
        info!(
            "Assembled {} day routes from {} venues ({} without coordinates)",
            days.len(),
            venues.len(),
            unlocated
        );
        Ok(RoutePlan { venues, days })
    }

    /// Spread venues that carry no day over `days` trip days.
    ///
    /// Venues are clustered by proximity, then each cluster in turn goes to
    /// the day holding the fewest locatable venues so far, counting the
    /// already `scheduled` ones (lowest day on ties). Only the newly placed
    /// venues are returned, each carrying its assigned day.
    pub fn schedule_by_proximity(
        venues: &[LocatedVenue],
        scheduled: &[LocatedVenue],
        days: u32,
        max_distance_km: f64,
    ) -> Result<BTreeMap<u32, Vec<LocatedVenue>>> {
        if days == 0 {
            return Err(PlannerError::validation("a trip needs at least one day"));
        }

        let mut load: BTreeMap<u32, usize> = (1..=days).map(|day| (day, 0)).collect();
        for venue in scheduled.iter().filter(|v| v.is_locatable()) {
            if let Some(count) = load.get_mut(&venue.route_day()) {
                *count += 1;
            }
        }

        let mut schedule: BTreeMap<u32, Vec<LocatedVenue>> = BTreeMap::new();
        for cluster in cluster_by_proximity(venues, max_distance_km)? {
            let day = load
                .iter()
                .min_by_key(|(day, count)| (**count, **day))
                .map_or(1, |(day, _)| *day);
            *load.entry(day).or_default() +=
                cluster.members.iter().filter(|v| v.is_locatable()).count();
            schedule
                .entry(day)
                .or_default()
                .extend(cluster.members.into_iter().map(|mut venue| {
                    venue.day = Some(day);
                    venue
                }));
        }

        debug!("Scheduled {} venues over {} days", venues.len(), days);
        Ok(schedule)
    }
}

fn check_scores(venue: &mut LocatedVenue) {
    let (price, rating) = (venue.price, venue.rating);
    if venue.clamp_scores() {
        warn!(
            "'{}' has price {} and rating {}; using {} and {}",
            venue.name, price, rating, venue.price, venue.rating
        );
    }
}

fn non_empty(text: &str) -> Option<String> {
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}
