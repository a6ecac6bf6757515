//! `OpenMeteo` geocoding and daily forecast client (no API key required)

use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{RetryTransientMiddleware, policies::ExponentialBackoff};
use serde::Deserialize;
use tracing::{debug, instrument};

use super::WeatherProvider;
use crate::config::WeatherConfig;
use crate::models::{Coordinate, DayWeather, WeatherCondition};

pub struct OpenMeteoClient {
    client: ClientWithMiddleware,
    base_url: String,
    geocoding_url: String,
    forecast_days: u32,
}

#[derive(Debug, Deserialize)]
struct GeocodingResponse {
    results: Option<Vec<GeocodingResult>>,
}

#[derive(Debug, Deserialize)]
struct GeocodingResult {
    name: String,
    latitude: f64,
    longitude: f64,
    country: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    daily: Option<DailyData>,
}

#[derive(Debug, Deserialize)]
struct DailyData {
    time: Vec<String>,
    #[serde(rename = "weathercode")]
    weather_code: Option<Vec<Option<u8>>>,
    #[serde(rename = "temperature_2m_max")]
    temperature_max: Option<Vec<Option<f32>>>,
    #[serde(rename = "temperature_2m_min")]
    temperature_min: Option<Vec<Option<f32>>>,
}

impl DailyData {
    /// Days with a parseable date, a weather code and at least one
    /// temperature; anything else is dropped.
    fn into_days(self) -> Vec<DayWeather> {
        let at = |values: &Option<Vec<Option<f32>>>, i: usize| {
            values.as_ref().and_then(|v| v.get(i).copied().flatten())
        };

        self.time
            .iter()
            .enumerate()
            .filter_map(|(i, time)| {
                let date = NaiveDate::parse_from_str(time, "%Y-%m-%d").ok()?;
                let code = self
                    .weather_code
                    .as_ref()
                    .and_then(|codes| codes.get(i).copied().flatten())?;
                let temperature = match (at(&self.temperature_max, i), at(&self.temperature_min, i)) {
                    (Some(max), Some(min)) => ((max + min) / 2.0 * 10.0).round() / 10.0,
                    (Some(t), None) | (None, Some(t)) => t,
                    (None, None) => return None,
                };
                let condition = WeatherCondition::from_wmo_code(code);
                Some(DayWeather {
                    date,
                    temperature,
                    condition,
                    description: condition.description().to_string(),
                    forecast: true,
                })
            })
            .collect()
    }
}

impl OpenMeteoClient {
    pub fn new(config: &WeatherConfig) -> Result<Self> {
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
            geocoding_url: config.geocoding_url.trim_end_matches('/').to_string(),
            forecast_days: config.forecast_days,
        })
    }

    /// Position of the best match for a place name
    #[instrument(skip(self))]
    pub async fn geocode(&self, name: &str) -> Result<Coordinate> {
        let url = format!(
            "{}/search?name={}&count=1&language=en&format=json",
            self.geocoding_url,
            urlencoding::encode(name)
        );

        let response: GeocodingResponse = self
            .client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
            .with_context(|| "Failed to parse OpenMeteo geocoding response")?;

        let place = response
            .results
            .unwrap_or_default()
            .into_iter()
            .next()
            .ok_or_else(|| anyhow!("No geocoding result for '{name}'"))?;
        debug!(
            "Geocoded '{}' to {} ({}) at ({}, {})",
            name,
            place.name,
            place.country.as_deref().unwrap_or("unknown country"),
            place.latitude,
            place.longitude
        );
        Ok(Coordinate::new(place.latitude, place.longitude)?)
    }

    /// Daily conditions at a position over the configured horizon
    #[instrument(skip(self))]
    pub async fn daily(&self, location: &Coordinate) -> Result<Vec<DayWeather>> {
        let url = format!(
            "{}/forecast?latitude={}&longitude={}&daily=weathercode,temperature_2m_max,temperature_2m_min&timezone=auto&forecast_days={}",
            self.base_url, location.latitude, location.longitude, self.forecast_days
        );

        debug!("Calling the weather API");
        let response: ForecastResponse = self
            .client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
            .with_context(|| "Failed to parse OpenMeteo forecast response")?;

        response
            .daily
            .map(DailyData::into_days)
            .ok_or_else(|| anyhow!("Forecast response has no daily data"))
    }
}

#[async_trait]
impl WeatherProvider for OpenMeteoClient {
    async fn daily_forecast(
        &self,
        destination: &str,
        _start: NaiveDate,
        _days: u32,
    ) -> Result<Vec<DayWeather>> {
        let location = self.geocode(destination).await?;
        self.daily(&location).await
    }

    fn name(&self) -> &str {
        "OpenMeteo"
    }
}
