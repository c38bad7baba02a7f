use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use nimbus_core::WeatherError;
use nimbus_weather::{
    ClassifiedForecast, EventWeatherCheck, ForecastSource, LookupResult, OutdoorEvent,
    RefreshOutcome, ServiceStatus,
};

use crate::error::ApiError;
use crate::AppState;

pub(crate) async fn get_area<S: ForecastSource + 'static>(
    State(state): State<AppState<S>>,
    Path(area): Path<String>,
) -> Result<Json<ClassifiedForecast>, ApiError> {
    if area.trim().is_empty() {
        return Err(ApiError::BadRequest("Area parameter is required".to_string()));
    }

    let result = state.weather.resolve(&area);
    let message = result.not_found_message();
    match result {
        LookupResult::Found { weather, .. } => Ok(Json(weather)),
        LookupResult::NotFound {
            available_areas, ..
        } => Err(ApiError::AreaNotFound {
            message: message.unwrap_or_default(),
            available_areas,
        }),
    }
}

pub(crate) async fn check_event<S: ForecastSource + 'static>(
    State(state): State<AppState<S>>,
    payload: Result<Json<OutdoorEvent>, JsonRejection>,
) -> Result<Json<EventWeatherCheck>, ApiError> {
    let Json(event) = payload.map_err(|e| bad_body("Event data is required", &e))?;
    Ok(Json(state.weather.check_event_weather(&event)))
}

fn bad_body(message: &str, rejection: &JsonRejection) -> ApiError {
    tracing::debug!("Rejected request body: {}", rejection.body_text());
    ApiError::BadRequest(message.to_string())
}

#[derive(Serialize)]
pub(crate) struct AreasResponse {
    success: bool,
    areas: Vec<String>,
    count: usize,
}

pub(crate) async fn list_areas<S: ForecastSource + 'static>(
    State(state): State<AppState<S>>,
) -> Json<AreasResponse> {
    let areas = state.weather.get_all_areas();
    Json(AreasResponse {
        success: true,
        count: areas.len(),
        areas,
    })
}

#[derive(Deserialize)]
pub(crate) struct RemindersBatchRequest {
    #[serde(default)]
    reminders: Value,
}

#[derive(Serialize)]
pub(crate) struct RemindersBatchResponse {
    success: bool,
    reminders: Vec<Value>,
}

pub(crate) async fn reminders_batch<S: ForecastSource + 'static>(
    State(state): State<AppState<S>>,
    payload: Result<Json<RemindersBatchRequest>, JsonRejection>,
) -> Result<Json<RemindersBatchResponse>, ApiError> {
    const REQUIRED: &str = "Reminders array is required";
    let Json(body) = payload.map_err(|e| bad_body(REQUIRED, &e))?;
    let Value::Array(reminders) = body.reminders else {
        return Err(ApiError::BadRequest(REQUIRED.to_string()));
    };

    Ok(Json(RemindersBatchResponse {
        success: true,
        reminders: state.weather.annotate_reminders(reminders),
    }))
}

pub(crate) async fn status<S: ForecastSource + 'static>(
    State(state): State<AppState<S>>,
) -> Json<ServiceStatus> {
    Json(state.weather.status())
}

#[derive(Debug, Serialize)]
pub(crate) struct RefreshResponse {
    outcome: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    areas: Option<usize>,
}

pub(crate) async fn refresh<S: ForecastSource + 'static>(
    State(state): State<AppState<S>>,
) -> Result<Json<RefreshResponse>, ApiError> {
    match state.weather.refresh_now().await {
        RefreshOutcome::Installed { areas } => Ok(Json(RefreshResponse {
            outcome: "installed",
            areas: Some(areas),
        })),
        RefreshOutcome::Skipped => Ok(Json(RefreshResponse {
            outcome: "skipped",
            areas: None,
        })),
        RefreshOutcome::Failed(e) => Err(ApiError::Weather(WeatherError::from(e))),
    }
}
