use serde::{Deserialize, Serialize};

/// Top-level client settings container.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ClientSettings {
    pub api: ApiSettings,
    pub history: HistorySettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

/// Search API endpoint settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ApiSettings {
    pub base_url: String,
    pub timeout_secs: u64,
    pub default_limit: u32,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000/api".to_string(),
            timeout_secs: 30,
            default_limit: 20,
        }
    }
}

/// Search history settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HistorySettings {
    pub max_items: usize,
    pub backend: StorageBackendKind,
    #[serde(default = "default_popular_limit")]
    pub popular_limit: usize,
    #[serde(default = "default_suggestion_limit")]
    pub suggestion_limit: usize,
}

fn default_popular_limit() -> usize {
    10
}

fn default_suggestion_limit() -> usize {
    5
}

impl Default for HistorySettings {
    fn default() -> Self {
        Self {
            max_items: crate::managers::search_history::MAX_HISTORY_ITEMS,
            backend: StorageBackendKind::File,
            popular_limit: default_popular_limit(),
            suggestion_limit: default_suggestion_limit(),
        }
    }
}

/// Where the history blob is kept.
///
/// Spelled in lowercase in settings files, like the environment override.
/// Capitalized names written by older versions are still read.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackendKind {
    #[serde(alias = "File")]
    File,
    #[serde(alias = "Sqlite")]
    Sqlite,
    #[serde(alias = "Memory")]
    Memory,
}

impl StorageBackendKind {
    /// Parses a case-insensitive backend name, as used by environment overrides.
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "file" => Some(Self::File),
            "sqlite" => Some(Self::Sqlite),
            "memory" => Some(Self::Memory),
            _ => None,
        }
    }
}

/// Diagnostics output settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoggingSettings {
    pub level: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}
