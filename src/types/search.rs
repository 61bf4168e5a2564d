use serde::{Deserialize, Serialize};

/// Body of a `POST /search` request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchRequest {
    pub keyword: String,
    pub limit: u32,
}

/// Response of the search endpoint. Every field is optional on the wire.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub data: Vec<serde_json::Value>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub total: Option<u64>,
    #[serde(default)]
    pub page: Option<u32>,
}

impl SearchResponse {
    /// Number of results to record against the keyword: the server's total
    /// when it reports one, otherwise the size of the returned page.
    pub fn result_count(&self) -> u64 {
        self.total.unwrap_or(self.data.len() as u64)
    }
}

/// Response of the health endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthStatus {
    #[serde(default)]
    pub status: String,
    #[serde(flatten)]
    pub details: serde_json::Map<String, serde_json::Value>,
}
