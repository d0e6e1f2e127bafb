//! Typed draft store over a single storage key.

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::storage::{DraftStorage, StorageError};

/// Typed view of one draft key.
///
/// - `load()` never fails on bad content: a missing key or malformed JSON
///   yields the fallback value.
/// - `save()` overwrites the stored value (no merge).
/// - `update()` is load, transform, save.
#[derive(Debug, Clone)]
pub struct DraftStore<T, S> {
    storage: S,
    key: String,
    fallback: T,
}

impl<T, S> DraftStore<T, S>
where
    T: Serialize + DeserializeOwned + Clone,
    S: DraftStorage,
{
    pub fn new(storage: S, key: impl Into<String>, fallback: T) -> Self {
        Self {
            storage,
            key: key.into(),
            fallback,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn into_storage(self) -> S {
        self.storage
    }

    /// Value returned when nothing usable is stored.
    pub fn fallback(&self) -> &T {
        &self.fallback
    }

    /// Load the stored draft, falling back to the default on absence or
    /// malformed content. Only backend failures are errors.
    pub fn load(&self) -> Result<T, StorageError> {
        let Some(raw) = self.storage.get(&self.key)? else {
            return Ok(self.fallback.clone());
        };

        match serde_json::from_str(&raw) {
            Ok(value) => Ok(value),
            Err(err) => {
                tracing::warn!(key = %self.key, error = %err, "malformed draft; using default");
                Ok(self.fallback.clone())
            }
        }
    }

    pub fn save(&self, value: &T) -> Result<(), StorageError> {
        let payload = serde_json::to_string(value)?;
        self.storage.set(&self.key, &payload)
    }

    pub fn update<F>(&self, f: F) -> Result<T, StorageError>
    where
        F: FnOnce(T) -> T,
    {
        let next = f(self.load()?);
        self.save(&next)?;
        Ok(next)
    }

    /// Drop the stored draft; the next `load()` returns the fallback.
    pub fn clear(&self) -> Result<(), StorageError> {
        self.storage.remove(&self.key)
    }
}
