use reqwest::StatusCode;
use thiserror::Error;

/// Which upstream API a request went to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Service {
    Geocoding,
    Forecast,
}

impl Service {
    pub fn as_str(&self) -> &'static str {
        match self {
            Service::Geocoding => "geocoding",
            Service::Forecast => "forecast",
        }
    }
}

impl std::fmt::Display for Service {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors returned by the geocoding and forecast calls.
#[derive(Debug, Error)]
pub enum WeatherError {
    #[error("no geocoding match for '{query}'")]
    NotFound { query: String },

    #[error("{service} request failed with status {status}: {body}")]
    Upstream {
        service: Service,
        status: StatusCode,
        body: String,
    },

    #[error("{service} request could not be sent: {source}")]
    Network {
        service: Service,
        #[source]
        source: reqwest::Error,
    },

    #[error("{service} response could not be decoded: {reason}")]
    Malformed { service: Service, reason: String },
}

impl WeatherError {
    /// The single line shown to the user in the error region.
    pub fn user_message(&self) -> String {
        match self {
            WeatherError::NotFound { .. } => {
                "City not found. Please check spelling and try again.".to_string()
            }
            WeatherError::Upstream {
                service: Service::Geocoding,
                status,
                ..
            } => format!("HTTP error! Status: {}", status.as_u16()),
            WeatherError::Upstream {
                service: Service::Forecast,
                status,
                ..
            } => format!("Weather API error! Status: {}", status.as_u16()),
            WeatherError::Network {
                service: Service::Geocoding,
                ..
            }
            | WeatherError::Malformed {
                service: Service::Geocoding,
                ..
            } => "Failed to fetch city data. Please try again.".to_string(),
            WeatherError::Network { .. } | WeatherError::Malformed { .. } => {
                "Failed to fetch weather data. Please try again.".to_string()
            }
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, WeatherError::NotFound { .. })
    }
}

/// Failures of the durable key-value storage. These never reach the user.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage I/O failed for key '{key}': {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },

    #[error("could not serialize value for key '{key}': {source}")]
    Serialize {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("storage backend rejected key '{key}': {reason}")]
    Backend { key: String, reason: String },
}
