//! App Core for vidsearch.
//!
//! Wires settings, the history storage backend, the shared search history
//! and the search API client together.

use std::fs;
use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::managers::search_history::{SearchHistory, SharedHistory};
use crate::services::search_client::SearchClient;
use crate::services::settings_engine::{SettingsEngine, SettingsEngineTrait};
use crate::storage::{FileStorage, KeyValueStorage, MemoryStorage, SqliteStorage};
use crate::types::errors::{AppError, HistoryError, SearchApiError, StorageError};
use crate::types::search::SearchResponse;
use crate::types::settings::{ClientSettings, StorageBackendKind};

/// File name of the SQLite database inside the data directory.
pub const DATABASE_FILE: &str = "vidsearch.db";

/// Central application struct holding the history, the client and settings.
pub struct App {
    pub history: SharedHistory,
    pub search_client: SearchClient,
    settings_engine: Mutex<SettingsEngine>,
}

impl App {
    /// Loads settings (falling back to defaults if the file is unreadable),
    /// applies environment overrides and builds the app.
    pub fn new(settings_path: Option<String>, data_dir: &Path) -> Result<Self, AppError> {
        let mut settings_engine = SettingsEngine::new(settings_path);
        if let Err(error) = settings_engine.load() {
            tracing::warn!(%error, "failed to load settings, using defaults");
        }
        settings_engine.apply_env_overrides();
        Self::with_settings(settings_engine, data_dir)
    }

    /// Builds the app from an already loaded settings engine.
    pub fn with_settings(settings_engine: SettingsEngine, data_dir: &Path) -> Result<Self, AppError> {
        let settings = settings_engine.get_settings().clone();

        let storage = open_storage(settings.history.backend, data_dir)?;
        let mut history = SearchHistory::new(storage).with_max_items(settings.history.max_items);
        history.load();
        tracing::info!(
            backend = ?settings.history.backend,
            records = history.len(),
            "search history ready"
        );

        let search_client = SearchClient::new(&settings.api)?;

        Ok(Self {
            history: SharedHistory::new(history),
            search_client,
            settings_engine: Mutex::new(settings_engine),
        })
    }

    /// Locks the settings engine for reading or updating.
    pub fn settings_engine(&self) -> MutexGuard<'_, SettingsEngine> {
        self.settings_engine.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Snapshot of the current settings.
    pub fn settings(&self) -> ClientSettings {
        self.settings_engine().get_settings().clone()
    }

    /// Runs a search and records the keyword with the number of results.
    ///
    /// Every attempted search is recorded. A failed one (error status,
    /// network or decode failure, or a reply with `success: false`) is
    /// recorded with zero results and its error is returned. A client
    /// configuration error records nothing.
    pub async fn search(&self, keyword: &str, limit: Option<u32>) -> Result<SearchResponse, AppError> {
        let keyword = keyword.trim();
        if keyword.is_empty() {
            return Err(HistoryError::EmptyKeyword.into());
        }

        let limit = limit.unwrap_or_else(|| self.search_client.default_limit());
        let outcome = match self.search_client.search(keyword, limit).await {
            Ok(response) if response.success => Ok(response),
            Ok(response) => Err(SearchApiError::Unsuccessful(
                response
                    .message
                    .unwrap_or_else(|| "search reported no success".to_string()),
            )),
            Err(error) => Err(error),
        };

        match outcome {
            Ok(response) => {
                self.history.record(keyword, response.result_count())?;
                Ok(response)
            }
            Err(error @ SearchApiError::InvalidConfig(_)) => Err(error.into()),
            Err(error) => {
                tracing::warn!(%error, keyword, "search failed, recording it with no results");
                self.history.record(keyword, 0)?;
                Err(error.into())
            }
        }
    }
}

/// Opens the storage backend selected in settings.
pub fn open_storage(
    kind: StorageBackendKind,
    data_dir: &Path,
) -> Result<Box<dyn KeyValueStorage>, StorageError> {
    match kind {
        StorageBackendKind::File => Ok(Box::new(FileStorage::new(data_dir))),
        StorageBackendKind::Sqlite => {
            fs::create_dir_all(data_dir)?;
            Ok(Box::new(SqliteStorage::open(data_dir.join(DATABASE_FILE))?))
        }
        StorageBackendKind::Memory => Ok(Box::new(MemoryStorage::new())),
    }
}
