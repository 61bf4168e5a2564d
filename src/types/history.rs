use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Version tag written into every persisted history blob.
pub const HISTORY_FORMAT_VERSION: u32 = 1;

/// Summary of one keyword's search activity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub keyword: String,
    pub search_count: u32,
    pub first_searched: DateTime<Utc>,
    pub last_searched: DateTime<Utc>,
    pub last_result_count: u64,
}

impl HistoryRecord {
    /// Creates a record for a keyword searched for the first time at `now`.
    pub fn first_search(keyword: &str, result_count: u64, now: DateTime<Utc>) -> Self {
        Self {
            keyword: keyword.to_string(),
            search_count: 1,
            first_searched: now,
            last_searched: now,
            last_result_count: result_count,
        }
    }
}

/// Aggregate figures over the whole history.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct HistoryStats {
    pub total_searches: u64,
    pub unique_keywords: usize,
    /// Keywords whose latest search returned results.
    pub successful_searches: usize,
    /// Keywords whose latest search returned nothing or failed.
    pub failed_searches: usize,
    pub most_searched: Option<String>,
    pub last_search: Option<String>,
}

/// On-disk layout of the history blob.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistedHistory {
    pub version: u32,
    pub last_updated: DateTime<Utc>,
    pub history: Vec<HistoryRecord>,
}

/// Any layout the loader accepts. Older clients stored a bare array.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum StoredHistory {
    Versioned(PersistedHistory),
    Legacy(Vec<HistoryRecord>),
}
