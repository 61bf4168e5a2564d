//! Search history store for vidsearch.
//!
//! Keeps a bounded list of [`HistoryRecord`]s, one per keyword, ordered by
//! most recent search first. Every mutation writes the whole list back to a
//! [`KeyValueStorage`] slot and publishes the new list on a `watch` channel.
//! Storage failures are logged and never reach the caller: the in-memory
//! list stays authoritative.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::watch;

use crate::storage::KeyValueStorage;
use crate::types::errors::HistoryError;
use crate::types::history::{
    HistoryRecord, HistoryStats, StoredHistory, HISTORY_FORMAT_VERSION,
};

/// Default upper bound on the number of stored keywords.
pub const MAX_HISTORY_ITEMS: usize = 50;

/// Storage slot holding the serialized history.
pub const STORAGE_KEY: &str = "video_search_history";

pub const DEFAULT_POPULAR_LIMIT: usize = 10;
pub const DEFAULT_SUGGESTION_LIMIT: usize = 5;

/// Queries shorter than this (in characters) get no suggestions.
pub const MIN_SUGGESTION_QUERY_CHARS: usize = 2;

/// Identity key of a keyword: surrounding whitespace and case are ignored.
pub fn keyword_identity(keyword: &str) -> String {
    keyword.trim().to_lowercase()
}

/// Trait defining search history operations.
pub trait SearchHistoryTrait {
    fn record(&mut self, keyword: &str, result_count: u64) -> Result<HistoryRecord, HistoryError>;
    fn remove(&mut self, keyword: &str) -> bool;
    fn clear(&mut self);
    fn records(&self) -> &[HistoryRecord];
    fn recent(&self, limit: usize) -> Vec<HistoryRecord>;
    fn popular(&self, limit: usize) -> Vec<HistoryRecord>;
    fn suggestions(&self, query: &str, limit: usize) -> Vec<String>;
    fn stats(&self) -> HistoryStats;
}

#[derive(Serialize)]
struct PersistedHistoryRef<'a> {
    version: u32,
    last_updated: DateTime<Utc>,
    history: &'a [HistoryRecord],
}

/// Search history backed by a key-value storage slot.
pub struct SearchHistory {
    storage: Box<dyn KeyValueStorage>,
    storage_key: String,
    max_items: usize,
    records: Vec<HistoryRecord>,
    notifier: watch::Sender<Vec<HistoryRecord>>,
}

impl SearchHistory {
    /// Creates an empty, unloaded history over `storage`.
    ///
    /// Call [`SearchHistory::load`] to restore persisted records, or use
    /// [`SearchHistory::open`] to do both.
    pub fn new<S: KeyValueStorage + 'static>(storage: S) -> Self {
        let (notifier, _) = watch::channel(Vec::new());
        Self {
            storage: Box::new(storage),
            storage_key: STORAGE_KEY.to_string(),
            max_items: MAX_HISTORY_ITEMS,
            records: Vec::new(),
            notifier,
        }
    }

    /// Creates a history over `storage` and loads it.
    pub fn open<S: KeyValueStorage + 'static>(storage: S) -> Self {
        let mut history = Self::new(storage);
        history.load();
        history
    }

    /// Sets the maximum number of records kept. Zero is raised to one.
    pub fn with_max_items(mut self, max_items: usize) -> Self {
        self.max_items = max_items.max(1);
        self
    }

    /// Uses a different storage slot than [`STORAGE_KEY`].
    pub fn with_storage_key(mut self, key: &str) -> Self {
        self.storage_key = key.to_string();
        self
    }

    pub fn max_items(&self) -> usize {
        self.max_items
    }

    pub fn storage_key(&self) -> &str {
        &self.storage_key
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Returns a receiver that observes the full record list after every change.
    pub fn subscribe(&self) -> watch::Receiver<Vec<HistoryRecord>> {
        self.notifier.subscribe()
    }

    /// Replaces the in-memory list with what the storage slot holds.
    ///
    /// Missing, empty or unreadable data yields an empty history. Records
    /// from older layouts are migrated and written back in the current one.
    pub fn load(&mut self) {
        let (records, migrated) = match self.storage.get(&self.storage_key) {
            Ok(Some(blob)) if !blob.trim().is_empty() => self.decode(&blob),
            Ok(_) => (Vec::new(), false),
            Err(error) => {
                tracing::warn!(%error, key = %self.storage_key, "failed to read search history");
                (Vec::new(), false)
            }
        };

        self.records = records;
        let repaired = self.normalize();
        tracing::debug!(count = self.records.len(), "search history loaded");

        if migrated || repaired {
            self.persist();
        }
        self.notifier.send_replace(self.records.clone());
    }

    fn decode(&self, blob: &str) -> (Vec<HistoryRecord>, bool) {
        match serde_json::from_str::<StoredHistory>(blob) {
            Ok(StoredHistory::Versioned(stored)) if stored.version <= HISTORY_FORMAT_VERSION => {
                (stored.history, stored.version < HISTORY_FORMAT_VERSION)
            }
            Ok(StoredHistory::Versioned(stored)) => {
                tracing::warn!(
                    version = stored.version,
                    supported = HISTORY_FORMAT_VERSION,
                    "search history written by a newer format, starting empty"
                );
                (Vec::new(), false)
            }
            Ok(StoredHistory::Legacy(records)) => {
                tracing::info!(count = records.len(), "migrating unversioned search history");
                (records, true)
            }
            Err(error) => {
                tracing::warn!(%error, key = %self.storage_key, "discarding unreadable search history");
                (Vec::new(), false)
            }
        }
    }

    /// Re-establishes ordering, uniqueness and the size bound on loaded data.
    /// Returns whether anything had to change.
    fn normalize(&mut self) -> bool {
        let before = self.records.clone();

        self.records.retain(|r| !r.keyword.trim().is_empty());
        for record in &mut self.records {
            record.search_count = record.search_count.max(1);
            if record.last_searched < record.first_searched {
                record.last_searched = record.first_searched;
            }
        }
        self.sort_by_recency();

        let mut seen = HashSet::new();
        self.records.retain(|r| seen.insert(keyword_identity(&r.keyword)));
        self.records.truncate(self.max_items);

        before != self.records
    }

    fn sort_by_recency(&mut self) {
        // Stable, so among equal timestamps the record moved to the front stays first.
        self.records.sort_by(|a, b| b.last_searched.cmp(&a.last_searched));
    }

    fn position(&self, identity: &str) -> Option<usize> {
        self.records
            .iter()
            .position(|r| keyword_identity(&r.keyword) == identity)
    }

    fn persist(&mut self) {
        let blob = PersistedHistoryRef {
            version: HISTORY_FORMAT_VERSION,
            last_updated: Utc::now(),
            history: &self.records,
        };
        let json = match serde_json::to_string(&blob) {
            Ok(json) => json,
            Err(error) => {
                tracing::warn!(%error, "failed to serialize search history");
                return;
            }
        };
        if let Err(error) = self.storage.set(&self.storage_key, &json) {
            tracing::warn!(%error, key = %self.storage_key, "failed to save search history");
        }
    }

    fn commit(&mut self) {
        self.persist();
        self.notifier.send_replace(self.records.clone());
    }
}

impl SearchHistoryTrait for SearchHistory {
    /// Records a search for `keyword` that produced `result_count` results.
    ///
    /// A known keyword has its count bumped and moves to the front; a new one
    /// is inserted at the front. The list is then re-sorted by recency and
    /// cut to the size bound, dropping the oldest records. The returned record
    /// is always kept: its timestamp is raised to the newest stored one if the
    /// clock is behind.
    fn record(&mut self, keyword: &str, result_count: u64) -> Result<HistoryRecord, HistoryError> {
        let keyword = keyword.trim();
        if keyword.is_empty() {
            return Err(HistoryError::EmptyKeyword);
        }

        // Never older than the newest stored record, so a clock running behind
        // stored timestamps cannot make the record being written the one evicted.
        let now = match self.records.first() {
            Some(newest) => Utc::now().max(newest.last_searched),
            None => Utc::now(),
        };
        let record = match self.position(&keyword_identity(keyword)) {
            Some(index) => {
                let mut existing = self.records.remove(index);
                existing.search_count = existing.search_count.saturating_add(1);
                existing.last_searched = now;
                existing.last_result_count = result_count;
                existing
            }
            None => HistoryRecord::first_search(keyword, result_count, now),
        };
        self.records.insert(0, record.clone());

        self.sort_by_recency();
        if self.records.len() > self.max_items {
            let dropped = self.records.len() - self.max_items;
            self.records.truncate(self.max_items);
            tracing::debug!(dropped, "search history trimmed to size bound");
        }

        self.commit();
        Ok(record)
    }

    /// Deletes the record for `keyword`. Returns whether one existed.
    fn remove(&mut self, keyword: &str) -> bool {
        let Some(index) = self.position(&keyword_identity(keyword)) else {
            return false;
        };
        self.records.remove(index);
        self.commit();
        true
    }

    fn clear(&mut self) {
        self.records.clear();
        self.commit();
    }

    fn records(&self) -> &[HistoryRecord] {
        &self.records
    }

    fn recent(&self, limit: usize) -> Vec<HistoryRecord> {
        self.records.iter().take(limit).cloned().collect()
    }

    /// Most frequently searched keywords among those that returned results.
    /// Ties keep history order.
    fn popular(&self, limit: usize) -> Vec<HistoryRecord> {
        let mut hits: Vec<HistoryRecord> = self
            .records
            .iter()
            .filter(|r| r.last_result_count > 0)
            .cloned()
            .collect();
        hits.sort_by(|a, b| b.search_count.cmp(&a.search_count));
        hits.truncate(limit);
        hits
    }

    /// Keywords containing `query` case-insensitively, most recent first.
    /// The keyword the query already names in full is left out.
    fn suggestions(&self, query: &str, limit: usize) -> Vec<String> {
        if query.chars().count() < MIN_SUGGESTION_QUERY_CHARS {
            return Vec::new();
        }

        let needle = query.to_lowercase();
        let typed = keyword_identity(query);
        self.records
            .iter()
            .filter(|r| {
                let lowered = r.keyword.to_lowercase();
                lowered.contains(&needle) && lowered.trim() != typed
            })
            .take(limit)
            .map(|r| r.keyword.clone())
            .collect()
    }

    fn stats(&self) -> HistoryStats {
        let successful_searches = self
            .records
            .iter()
            .filter(|r| r.last_result_count > 0)
            .count();
        HistoryStats {
            total_searches: self.records.iter().map(|r| u64::from(r.search_count)).sum(),
            unique_keywords: self.records.len(),
            successful_searches,
            failed_searches: self.records.len() - successful_searches,
            // min_by_key keeps the first of equal elements, i.e. the most recent.
            most_searched: self
                .records
                .iter()
                .min_by_key(|r| std::cmp::Reverse(r.search_count))
                .map(|r| r.keyword.clone()),
            last_search: self.records.first().map(|r| r.keyword.clone()),
        }
    }
}

/// Process-wide handle to one [`SearchHistory`].
///
/// Clones share the same history. Each call holds the lock for its whole
/// read-modify-write, so concurrent `record`s cannot duplicate a keyword.
#[derive(Clone)]
pub struct SharedHistory {
    inner: Arc<Mutex<SearchHistory>>,
}

impl SharedHistory {
    pub fn new(history: SearchHistory) -> Self {
        Self {
            inner: Arc::new(Mutex::new(history)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, SearchHistory> {
        // No operation leaves the list half-updated, so a poisoned lock is still usable.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn record(&self, keyword: &str, result_count: u64) -> Result<HistoryRecord, HistoryError> {
        self.lock().record(keyword, result_count)
    }

    pub fn remove(&self, keyword: &str) -> bool {
        self.lock().remove(keyword)
    }

    pub fn clear(&self) {
        self.lock().clear()
    }

    pub fn records(&self) -> Vec<HistoryRecord> {
        self.lock().records().to_vec()
    }

    pub fn recent(&self, limit: usize) -> Vec<HistoryRecord> {
        self.lock().recent(limit)
    }

    pub fn popular(&self, limit: usize) -> Vec<HistoryRecord> {
        self.lock().popular(limit)
    }

    pub fn suggestions(&self, query: &str, limit: usize) -> Vec<String> {
        self.lock().suggestions(query, limit)
    }

    pub fn stats(&self) -> HistoryStats {
        self.lock().stats()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn subscribe(&self) -> watch::Receiver<Vec<HistoryRecord>> {
        self.lock().subscribe()
    }

    /// Reloads from storage, discarding in-memory state.
    pub fn reload(&self) {
        self.lock().load()
    }
}

impl From<SearchHistory> for SharedHistory {
    fn from(history: SearchHistory) -> Self {
        Self::new(history)
    }
}
