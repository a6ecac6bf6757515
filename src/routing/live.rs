//! Live leg timing through a routing service, with estimator fallback

use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use rand::RngExt;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{RetryTransientMiddleware, policies::ExponentialBackoff};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use super::travel_time::{TravelMode, estimate};
use crate::cache::{self, PersistentCache};
use crate::config::TrafficConfig;
use crate::geo;
use crate::models::{Coordinate, DayRoute, LegStatus};

/// Road distance and duration reported by a routing service
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MeasuredLeg {
    pub distance_km: f64,
    pub duration_minutes: f64,
}

/// Timing for one leg, tagged with where it came from
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LegEstimate {
    pub distance_km: f64,
    pub duration_minutes: f64,
    pub status: LegStatus,
    pub service: String,
}

#[async_trait]
pub trait RouteProvider: Send + Sync {
    async fn route(
        &self,
        origin: &Coordinate,
        destination: &Coordinate,
        mode: TravelMode,
    ) -> Result<MeasuredLeg>;

    /// Get service name for logging
    fn name(&self) -> &str;
}

/// OSRM HTTP client (public demo server by default, no key required)
pub struct OsrmClient {
    client: ClientWithMiddleware,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct OsrmRoute {
    /// metres
    distance: f64,
    /// seconds
    duration: f64,
}

#[derive(Debug, Deserialize)]
struct OsrmResponse {
    code: String,
    #[serde(default)]
    routes: Vec<OsrmRoute>,
}

impl OsrmClient {
    pub fn new(config: &TrafficConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(u64::from(config.timeout_seconds)))
            .user_agent(concat!("tripplanner/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to create HTTP client")?;
        let retry_policy = ExponentialBackoff::builder().build_with_max_retries(config.max_retries);
        let client = ClientBuilder::new(http)
            .with(RetryTransientMiddleware::new_with_policy(retry_policy))
            .build();

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn profile(mode: TravelMode) -> Option<&'static str> {
        match mode {
            TravelMode::Driving => Some("driving"),
            TravelMode::Walking => Some("walking"),
            TravelMode::Cycling => Some("cycling"),
            TravelMode::Transit => None,
        }
    }
}

#[async_trait]
impl RouteProvider for OsrmClient {
    #[instrument(skip(self))]
    async fn route(
        &self,
        origin: &Coordinate,
        destination: &Coordinate,
        mode: TravelMode,
    ) -> Result<MeasuredLeg> {
        let profile =
            Self::profile(mode).ok_or_else(|| anyhow!("OSRM has no profile for {mode}"))?;
        // OSRM takes lon,lat pairs
        let url = format!(
            "{}/{}/{},{};{},{}?overview=false&alternatives=false&steps=false",
            self.base_url,
            profile,
            origin.longitude,
            origin.latitude,
            destination.longitude,
            destination.latitude,
        );

        debug!("Calling the routing API");
        let response = self
            .client
            .get(url)
            .send()
            .await?
            .error_for_status()?;
        let response: OsrmResponse = response
            .json()
            .await
            .context("Failed to parse OSRM route response")?;

        if response.code != "Ok" {
            return Err(anyhow!("OSRM returned code {}", response.code));
        }
        response
            .routes
            .first()
            .map(|route| MeasuredLeg {
                distance_km: route.distance / 1000.0,
                duration_minutes: route.duration / 60.0,
            })
            .ok_or(anyhow!("No routes in response"))
    }

    fn name(&self) -> &str {
        "OSRM"
    }
}

/// Times legs with a live provider when one is configured, otherwise (or on
/// any provider failure) with the average-speed estimate.
pub struct LegTimer {
    provider: Option<Box<dyn RouteProvider>>,
    cache: Option<PersistentCache>,
    cache_ttl: Duration,
}

impl LegTimer {
    #[must_use]
    pub fn new(provider: Option<Box<dyn RouteProvider>>) -> Self {
        Self {
            provider,
            cache: None,
            cache_ttl: Duration::from_hours(24 * 7),
        }
    }

    /// Estimator only
    #[must_use]
    pub fn offline() -> Self {
        Self::new(None)
    }

    /// Use `cache` instead of the global one
    #[must_use]
    pub fn with_cache(mut self, cache: PersistentCache) -> Self {
        self.cache = Some(cache);
        self
    }

    #[must_use]
    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    /// Time a single leg; never fails, degrades to an estimate
    pub async fn time_leg(
        &self,
        origin: &Coordinate,
        destination: &Coordinate,
        mode: TravelMode,
    ) -> crate::Result<LegEstimate> {
        if let Some(provider) = &self.provider {
            match self.measured(provider.as_ref(), origin, destination, mode).await {
                Ok(leg) => {
                    return Ok(LegEstimate {
                        distance_km: leg.distance_km,
                        duration_minutes: (leg.duration_minutes * 10.0).round() / 10.0,
                        status: LegStatus::Measured,
                        service: provider.name().to_string(),
                    });
                }
                Err(e) => {
                    warn!(
                        "{} routing failed: {:#}. Using estimated travel time.",
                        provider.name(),
                        e
                    );
                }
            }
        }

        let distance_km = geo::distance(origin, destination)?;
        Ok(LegEstimate {
            distance_km,
            duration_minutes: estimate(distance_km, mode),
            status: LegStatus::Estimated,
            service: "fallback".to_string(),
        })
    }

    async fn measured(
        &self,
        provider: &dyn RouteProvider,
        origin: &Coordinate,
        destination: &Coordinate,
        mode: TravelMode,
    ) -> Result<MeasuredLeg> {
        let key = leg_key(origin, destination, mode);
        let cache = self.cache.as_ref().or_else(|| cache::global());

        if let Some(cache) = cache {
            match cache.get::<MeasuredLeg>(&key).await {
                Ok(Some(cached)) => return Ok(cached),
                Ok(None) => {}
                Err(e) => warn!("Ignoring unreadable cached leg {key}: {e:#}"),
            }
        }

        let leg = provider.route(origin, destination, mode).await?;

        if let Some(cache) = cache {
            let jitter: f32 = rand::rng().random_range(0.9..1.1);
            let ttl = self.cache_ttl.mul_f32(jitter);
            if let Err(e) = cache.put(&key, leg, ttl).await {
                warn!("Failed to cache leg timing: {e:#}");
            }
        }
        Ok(leg)
    }

    /// Replace the estimated durations of `route` with live timings where
    /// available. Segment `distance_km` stays the great-circle value so the
    /// day total keeps matching its segments; road distance is stored beside it.
    pub async fn annotate(&self, route: &mut DayRoute, mode: TravelMode) -> crate::Result<()> {
        if self.provider.is_none() || route.segments.is_empty() {
            return Ok(());
        }

        for segment in &mut route.segments {
            let (Some(origin), Some(destination)) = (
                route.stops[segment.from].venue.coordinate,
                route.stops[segment.to].venue.coordinate,
            ) else {
                continue;
            };
            let leg = self.time_leg(&origin, &destination, mode).await?;
            segment.duration_minutes = leg.duration_minutes;
            segment.status = leg.status;
            if leg.status == LegStatus::Measured {
                segment.road_distance_km = Some(leg.distance_km);
            }
        }

        let total: f64 = route.segments.iter().map(|s| s.duration_minutes).sum();
        route.estimated_time_minutes = (total * 10.0).round() / 10.0;
        Ok(())
    }
}

fn leg_key(origin: &Coordinate, destination: &Coordinate, mode: TravelMode) -> String {
    format!("leg:{}:{}-{}", mode, origin.to_key(), destination.to_key())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{LocatedVenue, RouteSegment, RouteStop, VenueKind};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FixedProvider {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl RouteProvider for FixedProvider {
        async fn route(
            &self,
            _origin: &Coordinate,
            _destination: &Coordinate,
            _mode: TravelMode,
        ) -> Result<MeasuredLeg> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(MeasuredLeg {
                distance_km: 3.0,
                duration_minutes: 7.25,
            })
        }

        fn name(&self) -> &str {
            "fixed"
        }
    }

    struct FailingProvider;

    #[async_trait]
    impl RouteProvider for FailingProvider {
        async fn route(
            &self,
            _origin: &Coordinate,
            _destination: &Coordinate,
            _mode: TravelMode,
        ) -> Result<MeasuredLeg> {
            Err(anyhow!("service unavailable"))
        }

        fn name(&self) -> &str {
            "failing"
        }
    }

    fn coord(lat: f64, lon: f64) -> Coordinate {
        Coordinate::new(lat, lon).unwrap()
    }

    fn stop(name: &str, position: Coordinate, distance_to_next_km: f64) -> RouteStop {
        RouteStop {
            venue: LocatedVenue {
                name: name.to_string(),
                kind: VenueKind::Hotel,
                coordinate: Some(position),
                price: 0.0,
                rating: 0.0,
                day: Some(1),
                address: None,
            },
            distance_to_next_km,
        }
    }

    #[tokio::test]
    async fn test_offline_timer_estimates() {
        let timer = LegTimer::offline();
        let leg = timer
            .time_leg(&coord(49.28, -123.12), &coord(49.29, -123.10), TravelMode::Walking)
            .await
            .unwrap();
        assert_eq!(leg.status, LegStatus::Estimated);
        assert_eq!(leg.service, "fallback");
        assert_eq!(leg.duration_minutes, estimate(leg.distance_km, TravelMode::Walking));
    }

    #[tokio::test]
    async fn test_failed_provider_falls_back() {
        let timer = LegTimer::new(Some(Box::new(FailingProvider)));
        let leg = timer
            .time_leg(&coord(49.28, -123.12), &coord(49.29, -123.10), TravelMode::Driving)
            .await
            .unwrap();
        assert_eq!(leg.status, LegStatus::Estimated);
    }

    #[tokio::test]
    async fn test_measured_leg() {
        let timer = LegTimer::new(Some(Box::new(FixedProvider {
            calls: AtomicUsize::new(0),
        })));
        let leg = timer
            .time_leg(&coord(49.28, -123.12), &coord(49.29, -123.10), TravelMode::Driving)
            .await
            .unwrap();
        assert_eq!(leg.status, LegStatus::Measured);
        assert_eq!(leg.service, "fixed");
        assert_eq!(leg.distance_km, 3.0);
        assert_eq!(leg.duration_minutes, 7.3);
    }

    #[tokio::test]
    async fn test_annotate_keeps_geodesic_total() {
        let a = coord(49.28, -123.12);
        let b = coord(49.29, -123.10);
        let d = geo::distance(&a, &b).unwrap();
        let mut route = DayRoute {
            day: 1,
            stops: vec![stop("a", a, d), stop("b", b, 0.0)],
            segments: vec![RouteSegment {
                from: 0,
                to: 1,
                distance_km: d,
                duration_minutes: estimate(d, TravelMode::Driving),
                status: LegStatus::Estimated,
                road_distance_km: None,
            }],
            total_distance_km: d,
            estimated_time_minutes: estimate(d, TravelMode::Driving),
        };

        let timer = LegTimer::new(Some(Box::new(FixedProvider {
            calls: AtomicUsize::new(0),
        })));
        timer.annotate(&mut route, TravelMode::Driving).await.unwrap();

        assert_eq!(route.total_distance_km, d);
        assert_eq!(route.segments[0].distance_km, d);
        assert_eq!(route.segments[0].road_distance_km, Some(3.0));
        assert_eq!(route.segments[0].status, LegStatus::Measured);
        assert_eq!(route.estimated_time_minutes, 7.3);
        assert!(route.fully_measured());
    }

    #[tokio::test]
    async fn test_unreadable_cache_entry_still_measures() {
        let dir = tempfile::tempdir().unwrap();
        let cache = PersistentCache::open(dir.path()).unwrap();
        let (a, b) = (coord(49.28, -123.12), coord(49.29, -123.10));
        let key = leg_key(&a, &b, TravelMode::Driving);
        cache
            .put(&key, "x".to_string(), Duration::from_secs(60))
            .await
            .unwrap();

        let timer = LegTimer::new(Some(Box::new(FixedProvider {
            calls: AtomicUsize::new(0),
        })))
        .with_cache(cache);
        let leg = timer.time_leg(&a, &b, TravelMode::Driving).await.unwrap();

        assert_eq!(leg.status, LegStatus::Measured);
        assert_eq!(leg.distance_km, 3.0);
        let stored = timer.cache.as_ref().unwrap();
        assert_eq!(
            stored.get::<MeasuredLeg>(&key).await.unwrap(),
            Some(MeasuredLeg {
                distance_km: 3.0,
                duration_minutes: 7.25,
            })
        );
    }

    #[test]
    fn test_transit_has_no_osrm_profile() {
        assert_eq!(OsrmClient::profile(TravelMode::Transit), None);
        assert_eq!(OsrmClient::profile(TravelMode::Cycling), Some("cycling"));
    }
}
