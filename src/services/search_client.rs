//! HTTP client for the search API.
//!
//! Two endpoints: `POST {base}/search` and `GET {base}/health`. Failures are
//! returned to the caller as they happen; there is no retry.

use std::time::Duration;

use reqwest::{Client, Response};
use serde::de::DeserializeOwned;

use crate::types::errors::SearchApiError;
use crate::types::search::{HealthStatus, SearchRequest, SearchResponse};
use crate::types::settings::ApiSettings;

/// Search API client. Cheap to clone; clones share one connection pool.
#[derive(Debug, Clone)]
pub struct SearchClient {
    http: Client,
    base_url: String,
    default_limit: u32,
}

impl SearchClient {
    /// Builds a client for the endpoint described by `settings`.
    pub fn new(settings: &ApiSettings) -> Result<Self, SearchApiError> {
        let base_url = settings.base_url.trim().trim_end_matches('/').to_string();
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(SearchApiError::InvalidConfig(format!(
                "base url must start with http:// or https://: {}",
                settings.base_url
            )));
        }

        let http = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs.max(1)))
            .build()
            .map_err(|e| SearchApiError::InvalidConfig(e.to_string()))?;

        Ok(Self {
            http,
            base_url,
            default_limit: settings.default_limit,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn default_limit(&self) -> u32 {
        self.default_limit
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    /// Searches for `keyword`, asking for at most `limit` results.
    pub async fn search(&self, keyword: &str, limit: u32) -> Result<SearchResponse, SearchApiError> {
        let url = self.endpoint("search");
        tracing::debug!(%url, keyword, limit, "sending search request");

        let request = SearchRequest {
            keyword: keyword.to_string(),
            limit,
        };
        let response = self.http.post(&url).json(&request).send().await?;
        Self::decode(response).await
    }

    /// Queries the service health endpoint.
    pub async fn health(&self) -> Result<HealthStatus, SearchApiError> {
        let url = self.endpoint("health");
        let response = self.http.get(&url).send().await?;
        Self::decode(response).await
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, SearchApiError> {
        let status = response.status();
        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), url = %response.url(), "search API returned an error status");
            return Err(SearchApiError::HttpStatus(status.as_u16()));
        }
        response
            .json::<T>()
            .await
            .map_err(|e| SearchApiError::Decode(e.to_string()))
    }
}
