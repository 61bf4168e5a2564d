//! In-memory key-value storage.
//!
//! Clones share the same map, so a test can hand one clone to a store and
//! inspect what was persisted through another. An optional byte quota mimics
//! the capacity limit of browser local storage.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use super::KeyValueStorage;
use crate::types::errors::StorageError;

#[derive(Debug, Default)]
struct Inner {
    entries: HashMap<String, String>,
    quota: Option<usize>,
}

impl Inner {
    fn used_bytes_without(&self, key: &str) -> usize {
        self.entries
            .iter()
            .filter(|(k, _)| k.as_str() != key)
            .map(|(k, v)| k.len() + v.len())
            .sum()
    }
}

/// Shared in-memory map implementing [`KeyValueStorage`].
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryStorage {
    /// Creates an empty storage with no capacity limit.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty storage that rejects writes once keys plus values
    /// would exceed `quota` bytes.
    pub fn with_quota(quota: usize) -> Self {
        let storage = Self::default();
        storage.set_quota(Some(quota));
        storage
    }

    /// Changes the capacity limit. Existing entries are kept even if they
    /// already exceed the new limit.
    pub fn set_quota(&self, quota: Option<usize>) {
        self.lock().quota = quota;
    }

    /// Stores a value without checking the quota. Used to seed fixtures.
    pub fn insert_raw(&self, key: &str, value: &str) {
        self.lock().entries.insert(key.to_string(), value.to_string());
    }

    /// Returns the raw value stored under `key`.
    pub fn raw(&self, key: &str) -> Option<String> {
        self.lock().entries.get(key).cloned()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl KeyValueStorage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.raw(key))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut inner = self.lock();
        if let Some(quota) = inner.quota {
            let needed = inner.used_bytes_without(key) + key.len() + value.len();
            if needed > quota {
                return Err(StorageError::QuotaExceeded {
                    needed,
                    available: quota,
                });
            }
        }
        inner.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        self.lock().entries.remove(key);
        Ok(())
    }
}
