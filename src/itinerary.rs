//! Itinerary planning: day routes, live leg timings and weather notes for one
//! trip request.

use std::collections::BTreeMap;
use std::time::Duration;

use chrono::{Days, NaiveDate};
use futures::future::join_all;
use serde::Serialize;
use tracing::{info, instrument, warn};

use crate::assembler::DayRouteAssembler;
use crate::config::PlannerConfig;
use crate::location_resolver::{CoordinateLookup, DatasetResolver};
use crate::models::{ActivityType, DayRoute, DayWeather, LocatedVenue};
use crate::recommendations::RecommendationSet;
use crate::routing::{LegTimer, OsrmClient, TravelMode};
use crate::weather::{self, OpenMeteoClient, WeatherProvider};
use crate::{PlannerError, Result};

const GOOD_WEATHER_NOTE: &str = "Great weather for outdoor activities!";
const BAD_WEATHER_NOTE: &str = "Consider indoor activities due to weather";

/// What the traveller asked for
#[derive(Debug, Clone, PartialEq)]
pub struct TripRequest {
    pub destination: String,
    pub start_date: NaiveDate,
    pub days: u32,
    pub mode: TravelMode,
}

impl TripRequest {
    /// Last day of the trip, inclusive
    pub fn end_date(&self) -> Result<NaiveDate> {
        if self.days == 0 {
            return Err(PlannerError::validation("a trip needs at least one day"));
        }
        self.start_date
            .checked_add_days(Days::new(u64::from(self.days - 1)))
            .ok_or_else(|| PlannerError::validation("trip ends beyond the supported calendar"))
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DayPlan {
    pub day: u32,
    pub date: NaiveDate,
    pub weather: DayWeather,
    pub notes: Vec<String>,
    pub route: DayRoute,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Itinerary {
    pub destination: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub days: Vec<DayPlan>,
    /// Every venue considered, including unplaced ones
    pub venues: Vec<LocatedVenue>,
}

impl Itinerary {
    #[must_use]
    pub fn total_distance_km(&self) -> f64 {
        self.days.iter().map(|d| d.route.total_distance_km).sum()
    }

    #[must_use]
    pub fn total_travel_minutes(&self) -> f64 {
        self.days.iter().map(|d| d.route.estimated_time_minutes).sum()
    }
}

/// Per-request planner; holds the lookups and live services for one run
pub struct ItineraryPlanner {
    resolver: Box<dyn CoordinateLookup>,
    timer: LegTimer,
    weather: Option<Box<dyn WeatherProvider>>,
    cluster_radius_km: f64,
}

impl ItineraryPlanner {
    pub fn new(
        resolver: Box<dyn CoordinateLookup>,
        timer: LegTimer,
        weather: Option<Box<dyn WeatherProvider>>,
        cluster_radius_km: f64,
    ) -> Self {
        Self {
            resolver,
            timer,
            weather,
            cluster_radius_km,
        }
    }

    /// Planner wired to the configured services. `offline` skips every
    /// network service regardless of configuration.
    pub fn from_config(config: &PlannerConfig, offline: bool) -> anyhow::Result<Self> {
        let timer = if offline || !config.traffic.enabled {
            LegTimer::offline()
        } else {
            LegTimer::new(Some(Box::new(OsrmClient::new(&config.traffic)?)))
                .with_cache_ttl(Duration::from_hours(u64::from(config.cache.ttl_hours)))
        };

        let weather: Option<Box<dyn WeatherProvider>> = if offline || !config.weather.enabled {
            None
        } else {
            Some(Box::new(OpenMeteoClient::new(&config.weather)?))
        };

        Ok(Self::new(
            Box::new(DatasetResolver::from_config(&config.resolver)),
            timer,
            weather,
            config.routing.cluster_max_distance_km,
        ))
    }

    #[instrument(skip(self, recommendations), fields(destination = %request.destination))]
    pub async fn plan(
        &self,
        request: &TripRequest,
        recommendations: &RecommendationSet,
    ) -> Result<Itinerary> {
        let end_date = request.end_date()?;
        let assembler = DayRouteAssembler::new(self.resolver.as_ref(), request.mode);

        let mut venues = assembler.extract_locations(recommendations)?;
        let unscheduled = assembler.extract_unscheduled(recommendations)?;
        if !unscheduled.is_empty() {
            let schedule = DayRouteAssembler::schedule_by_proximity(
                &unscheduled,
                &venues,
                request.days,
                self.cluster_radius_km,
            )?;
            venues.extend(schedule.into_values().flatten());
        }

        let mut by_day = DayRouteAssembler::group_by_day(&venues);
        let mut routes = Vec::with_capacity(request.days as usize);
        for day in 1..=request.days {
            let day_venues = by_day.remove(&day).unwrap_or_default();
            routes.push(assembler.build_day_route(day, day_venues)?);
        }
        for (day, left_over) in &by_day {
            warn!(
                "Dropping {} venues for Day {} of a {}-day trip",
                left_over.len(),
                day,
                request.days
            );
        }

        join_all(
            routes
                .iter_mut()
                .map(|route| self.timer.annotate(route, request.mode)),
        )
        .await
        .into_iter()
        .collect::<Result<Vec<()>>>()?;

        let forecast = weather::forecast_or_mock(
            self.weather.as_deref(),
            &request.destination,
            request.start_date,
            request.days,
        )
        .await;

        let unplaced = unplaced_by_day(&venues);
        let days: Vec<DayPlan> = routes
            .into_iter()
            .zip(forecast)
            .map(|(route, weather)| {
                let mut notes = vec![weather_note(&weather).to_string()];
                if let Some(names) = unplaced.get(&route.day) {
                    notes.push(format!("Not on the map (no coordinates): {}", names.join(", ")));
                }
                DayPlan {
                    day: route.day,
                    date: weather.date,
                    weather,
                    notes,
                    route,
                }
            })
            .collect();

        let itinerary = Itinerary {
            destination: request.destination.clone(),
            start_date: request.start_date,
            end_date,
            days,
            venues,
        };
        info!(
            "Planned {} days in {}: {:.1}km, {:.0} minutes of travel",
            itinerary.days.len(),
            itinerary.destination,
            itinerary.total_distance_km(),
            itinerary.total_travel_minutes()
        );
        Ok(itinerary)
    }
}

fn weather_note(weather: &DayWeather) -> &'static str {
    if weather.is_good_for(ActivityType::Outdoor) {
        GOOD_WEATHER_NOTE
    } else {
        BAD_WEATHER_NOTE
    }
}

fn unplaced_by_day(venues: &[LocatedVenue]) -> BTreeMap<u32, Vec<&str>> {
    let mut by_day: BTreeMap<u32, Vec<&str>> = BTreeMap::new();
    for venue in venues.iter().filter(|v| !v.is_locatable()) {
        by_day.entry(venue.route_day()).or_default().push(&venue.name);
    }
    by_day
}
