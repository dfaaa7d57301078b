use crate::config::{GeocoderConfig, ServerConfig};
use crate::models::{AnalysisRequest, AnalysisResult, ErrorPayload, HistoryItem, ReverseGeocodeResponse};
use reqwest::{Client, ClientBuilder};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("server answered {status}: {}", message.as_deref().unwrap_or("no message"))]
    Status { status: u16, message: Option<String> },

    #[error("could not decode response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ApiError {
    /// The `error` field of the server's error payload, when there was one.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ApiError::Status { message, .. } => message.as_deref(),
            _ => None,
        }
    }
}

fn build_client(user_agent: &str, timeout_seconds: Option<u64>) -> Result<Client, ApiError> {
    let mut builder = ClientBuilder::new().user_agent(user_agent);
    if let Some(secs) = timeout_seconds {
        builder = builder.timeout(Duration::from_secs(secs));
    }
    Ok(builder.build()?)
}

/// Client for the historical-weather server.
pub struct WeatherApi {
    client: Client,
    base_url: String,
}

impl WeatherApi {
    pub fn new(config: &ServerConfig) -> Result<Self, ApiError> {
        Ok(Self {
            client: build_client(
                concat!("fairweather-tui/", env!("CARGO_PKG_VERSION")),
                config.request_timeout_seconds,
            )?,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn history_url(&self) -> String {
        format!("{}/api/history", self.base_url)
    }

    pub fn analysis_url(&self) -> String {
        format!("{}/api/historical_averages", self.base_url)
    }

    pub async fn fetch_history(&self) -> Result<Vec<HistoryItem>, ApiError> {
        let res = self.client.get(self.history_url()).send().await?;
        let status = res.status();
        let body = res.bytes().await?;
        if !status.is_success() {
            return Err(status_error(status.as_u16(), &body));
        }
        Ok(serde_json::from_slice(&body)?)
    }

    /// Posts the query. A non-2xx answer is decoded as the server's error
    /// payload and returned as [`ApiError::Status`].
    pub async fn request_analysis(&self, request: &AnalysisRequest) -> Result<AnalysisResult, ApiError> {
        debug!("POST {} for {}", self.analysis_url(), request.date);
        let res = self
            .client
            .post(self.analysis_url())
            .json(request)
            .send()
            .await?;
        let status = res.status();
        let body = res.bytes().await?;
        if !status.is_success() {
            return Err(status_error(status.as_u16(), &body));
        }
        Ok(serde_json::from_slice(&body)?)
    }
}

fn status_error(status: u16, body: &[u8]) -> ApiError {
    let payload: ErrorPayload = serde_json::from_slice(body).unwrap_or_default();
    ApiError::Status {
        status,
        message: payload.error,
    }
}

/// Reverse geocoding against a Nominatim-compatible endpoint.
pub struct Geocoder {
    client: Client,
    base_url: String,
}

impl Geocoder {
    pub fn new(config: &GeocoderConfig) -> Result<Self, ApiError> {
        Ok(Self {
            client: build_client(&config.user_agent, config.request_timeout_seconds)?,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn reverse_url(&self, lat: f64, lon: f64) -> String {
        format!(
            "{}/reverse?format=json&lat={}&lon={}&zoom=10",
            self.base_url, lat, lon
        )
    }

    /// Returns the provider's full display name, if it sent one.
    pub async fn reverse(&self, lat: f64, lon: f64) -> Result<Option<String>, ApiError> {
        let body = self
            .client
            .get(self.reverse_url(lat, lon))
            .send()
            .await?
            .error_for_status()?
            .bytes()
            .await?;
        let res: ReverseGeocodeResponse = serde_json::from_slice(&body)?;
        Ok(res.display_name)
    }
}
