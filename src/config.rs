//! Configuration management for the trip planner
//!
//! Handles loading configuration from files, environment variables,
//! and provides validation for all configuration settings.

use crate::PlannerError;
use crate::routing::TravelMode;
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct PlannerConfig {
    /// Route optimization settings
    pub routing: RoutingConfig,
    /// Live routing service settings
    pub traffic: TrafficConfig,
    /// Weather service settings
    pub weather: WeatherConfig,
    /// Coordinate fallback dataset settings
    pub resolver: ResolverConfig,
    /// Cache configuration
    pub cache: CacheConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RoutingConfig {
    /// Radius used when grouping venues into days
    pub cluster_max_distance_km: f64,
    /// Default transport mode for travel-time estimates
    pub travel_mode: TravelMode,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrafficConfig {
    /// Query the live routing service for leg timings
    pub enabled: bool,
    /// OSRM route endpoint, without profile
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_seconds: u32,
    /// Maximum number of retries for failed requests
    pub max_retries: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WeatherConfig {
    pub enabled: bool,
    /// Base URL for the forecast API
    pub base_url: String,
    /// Base URL for the geocoding API
    pub geocoding_url: String,
    /// Request timeout in seconds
    pub timeout_seconds: u32,
    /// Maximum number of retries for failed requests
    pub max_retries: u32,
    /// Forecast horizon requested from the API
    pub forecast_days: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Directory of JSON-lines venue records
    pub dataset_dir: String,
    /// Number of files scanned per lookup
    pub max_files: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub enabled: bool,
    /// Cache TTL in hours for measured legs
    pub ttl_hours: u32,
    /// Cache directory; empty means the platform cache dir
    pub location: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    pub level: String,
    /// Log format (pretty or json)
    pub format: String,
}

// Default value functions
fn default_cluster_max_distance() -> f64 {
    5.0
}

fn default_traffic_base_url() -> String {
    "https://router.project-osrm.org/route/v1".to_string()
}

fn default_traffic_timeout() -> u32 {
    5
}

fn default_weather_base_url() -> String {
    "https://api.open-meteo.com/v1".to_string()
}

fn default_geocoding_url() -> String {
    "https://geocoding-api.open-meteo.com/v1".to_string()
}

fn default_weather_timeout() -> u32 {
    30
}

fn default_max_retries() -> u32 {
    2
}

fn default_forecast_days() -> u32 {
    16
}

fn default_dataset_dir() -> String {
    "etl/del_dup".to_string()
}

fn default_max_files() -> usize {
    5
}

fn default_cache_ttl() -> u32 {
    168
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            cluster_max_distance_km: default_cluster_max_distance(),
            travel_mode: TravelMode::Driving,
        }
    }
}

impl Default for TrafficConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: default_traffic_base_url(),
            timeout_seconds: default_traffic_timeout(),
            max_retries: default_max_retries(),
        }
    }
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: default_weather_base_url(),
            geocoding_url: default_geocoding_url(),
            timeout_seconds: default_weather_timeout(),
            max_retries: default_max_retries(),
            forecast_days: default_forecast_days(),
        }
    }
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            dataset_dir: default_dataset_dir(),
            max_files: default_max_files(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            ttl_hours: default_cache_ttl(),
            location: String::new(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl CacheConfig {
    /// Cache directory with the platform default filled in
    #[must_use]
    pub fn resolved_location(&self) -> PathBuf {
        if self.location.is_empty() {
            dirs::cache_dir()
                .unwrap_or_else(std::env::temp_dir)
                .join("tripplanner")
        } else {
            PathBuf::from(&self.location)
        }
    }
}

impl PlannerConfig {
    /// Load configuration from file and environment variables
    pub fn load() -> Result<Self> {
        Self::load_from_path(None)
    }

    /// Load configuration from specified path
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder();

        let config_file = config_path.unwrap_or_else(|| {
            Self::get_config_path().unwrap_or_else(|| PathBuf::from("config.toml"))
        });

        if config_file.exists() {
            builder = builder.add_source(
                File::from(config_file.clone())
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        // TRIPPLANNER__ROUTING__TRAVEL_MODE=walking
        builder = builder.add_source(
            Environment::with_prefix("TRIPPLANNER")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let mut config: PlannerConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        config.apply_defaults();
        config.validate()?;

        Ok(config)
    }

    /// Get the default configuration file path
    #[must_use]
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("tripplanner").join("config.toml"))
    }

    /// Apply default values to empty or zeroed configuration fields
    pub fn apply_defaults(&mut self) {
        if self.traffic.base_url.is_empty() {
            self.traffic.base_url = default_traffic_base_url();
        }
        if self.traffic.timeout_seconds == 0 {
            self.traffic.timeout_seconds = default_traffic_timeout();
        }
        if self.weather.base_url.is_empty() {
            self.weather.base_url = default_weather_base_url();
        }
        if self.weather.geocoding_url.is_empty() {
            self.weather.geocoding_url = default_geocoding_url();
        }
        if self.weather.timeout_seconds == 0 {
            self.weather.timeout_seconds = default_weather_timeout();
        }
        if self.weather.forecast_days == 0 {
            self.weather.forecast_days = default_forecast_days();
        }
        if self.resolver.dataset_dir.is_empty() {
            self.resolver.dataset_dir = default_dataset_dir();
        }
        if self.cache.ttl_hours == 0 {
            self.cache.ttl_hours = default_cache_ttl();
        }
        if self.logging.level.is_empty() {
            self.logging.level = default_log_level();
        }
        if self.logging.format.is_empty() {
            self.logging.format = default_log_format();
        }
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        self.validate_numeric_ranges()?;
        self.validate_string_values()?;
        Ok(())
    }

    /// Validate numeric configuration ranges
    fn validate_numeric_ranges(&self) -> Result<()> {
        let radius = self.routing.cluster_max_distance_km;
        if !radius.is_finite() || radius <= 0.0 || radius > 500.0 {
            return Err(
                PlannerError::config("Cluster radius must be between 0 and 500 km").into(),
            );
        }

        if self.traffic.timeout_seconds > 60 {
            return Err(
                PlannerError::config("Routing API timeout cannot exceed 60 seconds").into(),
            );
        }

        if self.weather.timeout_seconds > 300 {
            return Err(
                PlannerError::config("Weather API timeout cannot exceed 300 seconds").into(),
            );
        }

        if self.traffic.max_retries > 10 || self.weather.max_retries > 10 {
            return Err(PlannerError::config("API max retries cannot exceed 10").into());
        }

        if self.weather.forecast_days > 16 {
            return Err(PlannerError::config("Weather forecast cannot exceed 16 days").into());
        }

        if self.resolver.max_files == 0 || self.resolver.max_files > 50 {
            return Err(
                PlannerError::config("Resolver max files must be between 1 and 50").into(),
            );
        }

        if self.cache.ttl_hours > 24 * 30 {
            return Err(PlannerError::config("Cache TTL cannot exceed 720 hours (30 days)").into());
        }

        Ok(())
    }

    /// Validate string configuration values
    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(PlannerError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            ))
            .into());
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(PlannerError::config(format!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            ))
            .into());
        }

        for (name, url) in [
            ("Routing API base URL", &self.traffic.base_url),
            ("Weather API base URL", &self.weather.base_url),
            ("Geocoding API base URL", &self.weather.geocoding_url),
        ] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(PlannerError::config(format!(
                    "{name} must be a valid HTTP or HTTPS URL"
                ))
                .into());
            }
        }

        Ok(())
    }
}
