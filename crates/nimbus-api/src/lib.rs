//! HTTP surface of the weather service for the reminders app.

pub mod error;
mod weather;

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use nimbus_weather::{ForecastProvider, ForecastSource, WeatherService};

pub use error::ApiError;

pub struct AppState<S = ForecastProvider> {
    weather: Arc<WeatherService<S>>,
}

impl<S> AppState<S> {
    pub fn new(weather: Arc<WeatherService<S>>) -> Self {
        Self { weather }
    }
}

// Manual impl so `S` itself need not be Clone
impl<S> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            weather: Arc::clone(&self.weather),
        }
    }
}

/// Build the router the binary serves
pub fn router<S: ForecastSource + 'static>(state: AppState<S>) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/api/weather/areas/list", get(weather::list_areas::<S>))
        .route("/api/weather/status", get(weather::status::<S>))
        .route("/api/weather/check-event", post(weather::check_event::<S>))
        .route(
            "/api/weather/reminders-batch",
            post(weather::reminders_batch::<S>),
        )
        .route("/api/weather/refresh", post(weather::refresh::<S>))
        .route("/api/weather/{area}", get(weather::get_area::<S>))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}
