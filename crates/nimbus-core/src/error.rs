//! Centralized error types for Nimbus.
//!
//! Upstream (provider) failures are kept apart from local configuration
//! problems. `WeatherError` carries the caller-facing message and status.

use thiserror::Error;

/// Network-related errors (HTTP, connectivity).
#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Request timed out")]
    Timeout,

    #[error("Server error: {status} - {message}")]
    ServerError { status: u16, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Configuration parse error: {0}")]
    ParseError(String),
}

/// Weather service errors, as surfaced at the API boundary.
#[derive(Debug, Error)]
pub enum WeatherError {
    #[error("Weather provider unreachable: {0}")]
    Unreachable(String),

    #[error("Weather provider returned status {0}")]
    UpstreamStatus(u16),

    #[error("Weather provider returned malformed data: {0}")]
    InvalidShape(String),
}

impl WeatherError {
    pub fn user_message(&self) -> &'static str {
        match self {
            WeatherError::Unreachable(_) => {
                "Weather service unavailable. Cached data is still being served."
            }
            WeatherError::UpstreamStatus(status) if *status >= 500 => {
                "Weather provider is down. Cached data is still being served."
            }
            WeatherError::UpstreamStatus(_) => "Weather provider rejected the request.",
            WeatherError::InvalidShape(_) => "Weather provider sent unexpected data.",
        }
    }

    /// HTTP status the API layer should answer with.
    pub fn http_status(&self) -> u16 {
        match self {
            WeatherError::Unreachable(_) => 503,
            WeatherError::UpstreamStatus(_) | WeatherError::InvalidShape(_) => 502,
        }
    }
}

/// Extension trait for converting reqwest errors to our error types.
pub trait ReqwestErrorExt {
    fn into_network_error(self) -> NetworkError;
}

impl ReqwestErrorExt for reqwest::Error {
    fn into_network_error(self) -> NetworkError {
        if self.is_timeout() {
            NetworkError::Timeout
        } else if self.is_connect() {
            NetworkError::ConnectionFailed(self.to_string())
        } else if let Some(status) = self.status() {
            NetworkError::ServerError {
                status: status.as_u16(),
                message: self.to_string(),
            }
        } else if self.is_decode() || self.is_body() {
            NetworkError::InvalidResponse(self.to_string())
        } else {
            NetworkError::ConnectionFailed(self.to_string())
        }
    }
}
