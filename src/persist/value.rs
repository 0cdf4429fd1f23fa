// PersistedValue - a value mirrored to a key-value store on every change

use crate::persist::store::{KeyValueStore, StorageError};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;

/// A value loaded from storage once and written back after each update
///
/// Storage failures never interrupt the caller: loading falls back to the
/// default, and a failed write keeps the new value in memory only. Both are
/// logged, and `is_persisted()` reports whether the last write landed.
pub struct PersistedValue<T> {
    key: String,
    value: T,
    store: Arc<dyn KeyValueStore>,
    persisted: bool,
}

impl<T> PersistedValue<T>
where
    T: Serialize + DeserializeOwned,
{
    /// Read `key` from `store`, using `default` when the entry is missing or
    /// cannot be decoded
    pub fn load(store: Arc<dyn KeyValueStore>, key: impl Into<String>, default: T) -> Self {
        let key = key.into();

        let value = match store.read(&key) {
            Ok(Some(raw)) => match serde_json::from_str(&raw) {
                Ok(value) => value,
                Err(e) => {
                    log::warn!("Ignoring invalid stored value for {}: {}", key, e);
                    default
                }
            },
            Ok(None) => default,
            Err(e) => {
                log::error!("Failed to load {}: {}", key, e);
                default
            }
        };

        Self {
            key,
            value,
            store,
            persisted: true,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn get(&self) -> &T {
        &self.value
    }

    /// False if the most recent write to storage failed
    pub fn is_persisted(&self) -> bool {
        self.persisted
    }

    /// Replace the value and write it back
    pub fn set(&mut self, value: T) {
        self.value = value;
        self.write_back();
    }

    /// Derive the new value from the previous one and write it back
    pub fn update<F>(&mut self, f: F)
    where
        F: FnOnce(&T) -> T,
    {
        let next = f(&self.value);
        self.set(next);
    }

    /// Mutate the value in place and write it back
    pub fn modify<F, R>(&mut self, f: F) -> R
    where
        F: FnOnce(&mut T) -> R,
    {
        let result = f(&mut self.value);
        self.write_back();
        result
    }

    fn write_back(&mut self) {
        let result = serde_json::to_string(&self.value)
            .map_err(StorageError::from)
            .and_then(|json| self.store.write(&self.key, &json));

        match result {
            Ok(()) => self.persisted = true,
            Err(e) => {
                log::error!("Failed to save {}: {}", self.key, e);
                self.persisted = false;
            }
        }
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for PersistedValue<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PersistedValue")
            .field("key", &self.key)
            .field("value", &self.value)
            .field("persisted", &self.persisted)
            .finish()
    }
}
