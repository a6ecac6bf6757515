//! Per-day weather for itinerary notes
//!
//! Weather is advisory: when no provider is configured, or the provider
//! fails, each day gets a placeholder value instead.

use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use tracing::{debug, warn};

use crate::PlannerError;
use crate::models::{DayWeather, WeatherCondition};

pub mod open_meteo;

pub use open_meteo::OpenMeteoClient;

#[async_trait]
pub trait WeatherProvider: Send + Sync {
    /// Daily forecast for a named destination. May cover fewer or more days
    /// than asked for; callers pick the dates they need.
    async fn daily_forecast(
        &self,
        destination: &str,
        start: NaiveDate,
        days: u32,
    ) -> Result<Vec<DayWeather>>;

    /// Get service name for logging
    fn name(&self) -> &str;
}

/// Placeholder forecast used when no real one is available
#[must_use]
pub fn mock_forecast(start: NaiveDate, days: u32) -> Vec<DayWeather> {
    start
        .iter_days()
        .take(days as usize)
        .enumerate()
        .map(|(i, date)| DayWeather {
            date,
            temperature: 20.0 + (i % 3) as f32 * 2.0,
            condition: WeatherCondition::Clouds,
            description: WeatherCondition::Clouds.description().to_string(),
            forecast: false,
        })
        .collect()
}

/// One entry per trip day, from the provider where it has the date and
/// from the placeholder otherwise.
pub async fn forecast_or_mock(
    provider: Option<&dyn WeatherProvider>,
    destination: &str,
    start: NaiveDate,
    days: u32,
) -> Vec<DayWeather> {
    let mut placeholder = mock_forecast(start, days);

    let Some(provider) = provider else {
        debug!("No weather provider configured, using placeholder forecast");
        return placeholder;
    };

    let forecast = match provider.daily_forecast(destination, start, days).await {
        Ok(forecast) => forecast,
        Err(e) => {
            warn!(
                "{}",
                PlannerError::upstream(provider.name(), format!("{e:#}"))
            );
            return placeholder;
        }
    };

    let mut matched = 0;
    for day in &mut placeholder {
        if let Some(found) = forecast.iter().find(|f| f.date == day.date) {
            *day = found.clone();
            matched += 1;
        }
    }
    debug!(
        "{} forecast covers {}/{} trip days",
        provider.name(),
        matched,
        days
    );
    placeholder
}
