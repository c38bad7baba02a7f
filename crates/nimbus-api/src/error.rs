//! Mapping of service errors onto HTTP responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use nimbus_core::WeatherError;

#[derive(Debug)]
pub enum ApiError {
    /// Missing or malformed request input
    BadRequest(String),
    /// Area did not resolve; carries the areas the caller could have asked for
    AreaNotFound {
        message: String,
        available_areas: Vec<String>,
    },
    Weather(WeatherError),
}

impl From<WeatherError> for ApiError {
    fn from(e: WeatherError) -> Self {
        ApiError::Weather(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::BadRequest(message) => (
                StatusCode::BAD_REQUEST,
                Json(json!({ "success": false, "message": message })),
            )
                .into_response(),
            ApiError::AreaNotFound {
                message,
                available_areas,
            } => (
                StatusCode::NOT_FOUND,
                Json(json!({ "message": message, "availableAreas": available_areas })),
            )
                .into_response(),
            ApiError::Weather(e) => {
                let status = StatusCode::from_u16(e.http_status())
                    .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
                if status.is_server_error() {
                    tracing::error!("Weather request failed: {}", e);
                }
                (
                    status,
                    Json(json!({
                        "success": false,
                        "message": e.user_message(),
                        "error": e.to_string(),
                    })),
                )
                    .into_response()
            }
        }
    }
}
