use thiserror::Error;

// === StorageError ===

/// Errors raised by key-value storage backends.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Reading or writing the backing file failed.
    #[error("Storage I/O error: {0}")]
    Io(String),
    /// The write would exceed the backend's capacity.
    #[error("Storage quota exceeded: {needed} bytes requested, {available} available")]
    QuotaExceeded { needed: usize, available: usize },
    /// Database operation failed.
    #[error("Storage database error: {0}")]
    Database(String),
    /// The key cannot be used by this backend.
    #[error("Invalid storage key: {0}")]
    InvalidKey(String),
}

impl From<std::io::Error> for StorageError {
    fn from(err: std::io::Error) -> Self {
        StorageError::Io(err.to_string())
    }
}

impl From<rusqlite::Error> for StorageError {
    fn from(err: rusqlite::Error) -> Self {
        StorageError::Database(err.to_string())
    }
}

// === HistoryError ===

/// Errors related to search history operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum HistoryError {
    /// The keyword was empty or whitespace only.
    #[error("Search keyword cannot be empty")]
    EmptyKeyword,
}

// === SearchApiError ===

/// Errors returned by the search API client.
#[derive(Debug, Error)]
pub enum SearchApiError {
    /// The request never produced a response.
    #[error("Search network error: {0}")]
    Network(String),
    /// The server answered with a non-success status.
    #[error("Search API returned HTTP {0}")]
    HttpStatus(u16),
    /// The response body was not the expected JSON.
    #[error("Search response decode error: {0}")]
    Decode(String),
    /// The server answered but reported the search as failed.
    #[error("Search failed: {0}")]
    Unsuccessful(String),
    /// The client could not be built from the given settings.
    #[error("Invalid search client configuration: {0}")]
    InvalidConfig(String),
}

impl From<reqwest::Error> for SearchApiError {
    fn from(err: reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            SearchApiError::HttpStatus(status.as_u16())
        } else if err.is_decode() {
            SearchApiError::Decode(err.to_string())
        } else if err.is_builder() {
            SearchApiError::InvalidConfig(err.to_string())
        } else {
            SearchApiError::Network(err.to_string())
        }
    }
}

// === SettingsError ===

/// Errors related to settings management.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// An I/O error occurred while reading or writing settings.
    #[error("Settings I/O error: {0}")]
    IoError(String),
    /// Failed to serialize or deserialize settings.
    #[error("Settings serialization error: {0}")]
    SerializationError(String),
    /// The provided settings key is invalid.
    #[error("Invalid settings key: {0}")]
    InvalidKey(String),
    /// The provided settings value is invalid.
    #[error("Invalid settings value: {0}")]
    InvalidValue(String),
}

// === AppError ===

/// Errors surfaced by the application layer.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    History(#[from] HistoryError),
    #[error(transparent)]
    SearchApi(#[from] SearchApiError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}
