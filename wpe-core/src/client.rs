//! HTTP client for the weather statistics backend.
//!
//! Every call is a single round trip: no retries, no timeout, no caching.
//! Any non-success status becomes [`WeatherError::Status`] carrying the
//! status text.

use log::{debug, info};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{Result, WeatherError};
use crate::format::ExportFormat;
use crate::query::QueryRequest;
use crate::result::{HealthStatus, QueryResult};
use crate::service::QueryService;
use crate::variable::VariablesResponse;

/// Backend used when nothing is configured.
pub const DEFAULT_API_URL: &str = "http://localhost:8000/api/v1";

/// Body of `POST /weather/download`: the query plus the wanted format.
#[derive(Serialize)]
struct DownloadRequest<'a> {
    #[serde(flatten)]
    request: &'a QueryRequest,
    format: ExportFormat,
}

/// Turn a non-success response into an error named after `operation`.
pub(crate) fn check_status(response: Response, operation: &'static str) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(WeatherError::Status {
            operation,
            status: status.as_u16(),
            status_text: status
                .canonical_reason()
                .unwrap_or("Unknown status")
                .to_string(),
        })
    }
}

async fn read_json<T: DeserializeOwned>(response: Response, operation: &'static str) -> Result<T> {
    let response = check_status(response, operation)?;
    let body = response.bytes().await?;
    Ok(serde_json::from_slice(&body)?)
}

#[derive(Debug, Clone)]
pub struct WeatherApi {
    client: Client,
    base_url: String,
}

impl WeatherApi {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// `POST /weather/query`, validated against the request it answers.
    pub async fn query_weather(&self, request: &QueryRequest) -> Result<QueryResult> {
        info!(
            "Querying {} variable(s) at ({}, {}) for {}",
            request.variables.len(),
            request.location.lat,
            request.location.lon,
            request.day_of_year.label()
        );
        let response = self
            .client
            .post(self.url("/weather/query"))
            .json(request)
            .send()
            .await?;
        let result: QueryResult = read_json(response, "API request").await?;
        result.validate_against(request)?;
        debug!(
            "Query returned {} variable(s) over {}",
            result.historical_data.len(),
            result.query_info.data_period
        );
        Ok(result)
    }

    /// `POST /weather/download`; the body is returned untouched.
    pub async fn download_data(
        &self,
        request: &QueryRequest,
        format: ExportFormat,
    ) -> Result<Vec<u8>> {
        info!("Downloading {} data from {}", format, self.base_url);
        let response = self
            .client
            .post(self.url("/weather/download"))
            .json(&DownloadRequest { request, format })
            .send()
            .await?;
        let response = check_status(response, "Download")?;
        Ok(response.bytes().await?.to_vec())
    }

    /// `GET /weather/variables`
    pub async fn get_variables(&self) -> Result<VariablesResponse> {
        let response = self
            .client
            .get(self.url("/weather/variables"))
            .send()
            .await?;
        read_json(response, "API request").await
    }

    /// `GET /health`
    pub async fn health_check(&self) -> Result<HealthStatus> {
        let response = self.client.get(self.url("/health")).send().await?;
        read_json(response, "Health check").await
    }
}

impl Default for WeatherApi {
    fn default() -> Self {
        Self::new(DEFAULT_API_URL)
    }
}

impl QueryService for WeatherApi {
    async fn query(&self, request: &QueryRequest) -> Result<QueryResult> {
        self.query_weather(request).await
    }
}
