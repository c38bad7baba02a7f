//! Forecast fetcher for the region-wide nowcast endpoint.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use url::Url;

use nimbus_core::{ReqwestErrorExt, WeatherConfig};

use crate::types::{AreaForecast, FetchError, ForecastBatch};

/// Anything that can produce one region-wide forecast batch.
///
/// Implementations perform at most one upstream call per `fetch` and never retry.
#[async_trait]
pub trait ForecastSource: Send + Sync {
    async fn fetch(&self) -> Result<ForecastBatch, FetchError>;
}

#[derive(Debug, Deserialize)]
struct RawPayload {
    items: Option<Vec<RawItem>>,
    api_info: Option<RawApiInfo>,
}

#[derive(Debug, Deserialize)]
struct RawItem {
    timestamp: Option<String>,
    forecasts: Option<Vec<RawForecast>>,
}

#[derive(Debug, Deserialize)]
struct RawForecast {
    area: Option<String>,
    forecast: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawApiInfo {
    timestamp: Option<String>,
}

fn parse_timestamp(raw: Option<&str>) -> Option<DateTime<Utc>> {
    raw.and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc))
}

/// Validate and normalize a provider response body.
///
/// Uses the first item's forecasts. The observation time falls back from
/// `items[0].timestamp` to `api_info.timestamp` to `fetched_at`.
pub fn parse_payload(body: &[u8], fetched_at: DateTime<Utc>) -> Result<ForecastBatch, FetchError> {
    let payload: RawPayload = serde_json::from_slice(body)
        .map_err(|e| FetchError::InvalidShape(format!("undecodable body: {}", e)))?;

    let item = payload
        .items
        .and_then(|items| items.into_iter().next())
        .ok_or_else(|| FetchError::InvalidShape("missing or empty 'items'".to_string()))?;

    let raw_forecasts = item
        .forecasts
        .filter(|f| !f.is_empty())
        .ok_or_else(|| FetchError::InvalidShape("missing or empty 'forecasts'".to_string()))?;

    let observed_at = parse_timestamp(item.timestamp.as_deref())
        .or_else(|| {
            parse_timestamp(
                payload
                    .api_info
                    .as_ref()
                    .and_then(|info| info.timestamp.as_deref()),
            )
        })
        .unwrap_or(fetched_at);

    let forecasts = raw_forecasts
        .into_iter()
        .enumerate()
        .map(|(i, raw)| match (raw.area, raw.forecast) {
            (Some(area), Some(forecast)) if !area.trim().is_empty() => {
                Ok(AreaForecast { area, forecast })
            }
            (Some(_), Some(_)) => Err(FetchError::InvalidShape(format!(
                "forecast #{} has a blank area",
                i
            ))),
            _ => Err(FetchError::InvalidShape(format!(
                "forecast #{} is missing 'area' or 'forecast'",
                i
            ))),
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(ForecastBatch {
        observed_at,
        forecasts,
    })
}

/// HTTP client for the configured forecast endpoint
#[derive(Debug, Clone)]
pub struct ForecastProvider {
    client: Arc<Client>,
    endpoint: Url,
}

impl ForecastProvider {
    pub fn new(endpoint: &str, timeout: Duration, user_agent: &str) -> Result<Self> {
        let endpoint = Url::parse(endpoint)
            .with_context(|| format!("Invalid forecast endpoint: {}", endpoint))?;

        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()
            .context("Failed to create forecast HTTP client")?;

        Ok(Self {
            client: Arc::new(client),
            endpoint,
        })
    }

    pub fn from_config(config: &WeatherConfig) -> Result<Self> {
        Self::new(&config.endpoint, config.timeout(), &config.user_agent)
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl ForecastSource for ForecastProvider {
    async fn fetch(&self) -> Result<ForecastBatch, FetchError> {
        tracing::debug!("Fetching forecasts from {}", self.endpoint);

        let response = self
            .client
            .get(self.endpoint.clone())
            .send()
            .await
            .map_err(|e| FetchError::from(e.into_network_error()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::UpstreamStatus(status.as_u16()));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| FetchError::from(e.into_network_error()))?;

        let batch = parse_payload(&body, Utc::now())?;
        tracing::debug!("Fetched forecasts for {} areas", batch.forecasts.len());
        Ok(batch)
    }
}
