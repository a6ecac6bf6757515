//! Error types and handling for the trip planner

use thiserror::Error;

/// Main error type for the trip planner
#[derive(Error, Debug)]
pub enum PlannerError {
    /// Latitude/longitude that is not a finite, in-range pair
    #[error("Invalid coordinate: ({latitude}, {longitude})")]
    InvalidCoordinate { latitude: f64, longitude: f64 },

    /// A venue without coordinates whose fallback lookup found nothing
    #[error("Unresolved location: {name}")]
    UnresolvedLocation { name: String },

    /// A recommender or live-data service could not deliver
    #[error("Upstream unavailable ({service}): {message}")]
    UpstreamUnavailable { service: String, message: String },

    /// Input validation errors
    #[error("Invalid input: {message}")]
    Validation { message: String },

    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// API communication errors
    #[error("API error: {message}")]
    Api { message: String },

    /// Cache operation errors
    #[error("Cache error: {message}")]
    Cache { message: String },

    /// I/O operation errors
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

impl PlannerError {
    pub fn invalid_coordinate(latitude: f64, longitude: f64) -> Self {
        Self::InvalidCoordinate {
            latitude,
            longitude,
        }
    }

    pub fn unresolved<S: Into<String>>(name: S) -> Self {
        Self::UnresolvedLocation { name: name.into() }
    }

    pub fn upstream<S: Into<String>, M: Into<String>>(service: S, message: M) -> Self {
        Self::UpstreamUnavailable {
            service: service.into(),
            message: message.into(),
        }
    }

    /// Create a new validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new API error
    pub fn api<S: Into<String>>(message: S) -> Self {
        Self::Api {
            message: message.into(),
        }
    }

    /// Create a new cache error
    pub fn cache<S: Into<String>>(message: S) -> Self {
        Self::Cache {
            message: message.into(),
        }
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            PlannerError::InvalidCoordinate { latitude, longitude } => format!(
                "A venue has an invalid position ({latitude}, {longitude}). Please check the recommendation data."
            ),
            PlannerError::UnresolvedLocation { name } => {
                format!("Could not find a position for '{name}'; it is left off the map.")
            }
            PlannerError::UpstreamUnavailable { service, .. } => {
                format!("{service} is currently unavailable. The plan uses the data that was received.")
            }
            PlannerError::Validation { message } => format!("Invalid input: {message}"),
            PlannerError::Config { .. } => {
                "Configuration error. Please check your config file.".to_string()
            }
            PlannerError::Api { .. } => {
                "Unable to connect to external services. Please check your internet connection."
                    .to_string()
            }
            PlannerError::Cache { .. } => {
                "Cache operation failed. You may need to clear your cache.".to_string()
            }
            PlannerError::Io { .. } => {
                "File operation failed. Please check file permissions.".to_string()
            }
        }
    }
}
