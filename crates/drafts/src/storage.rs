//! Key-value storage abstraction for drafts.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to serialize draft: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("invalid storage key: {0:?}")]
    InvalidKey(String),

    /// Internal lock poisoning in a shared backend.
    #[error("storage lock poisoned")]
    Poisoned,
}

/// String key-value storage, the shape of browser `localStorage`.
///
/// Implementations take `&self`; backends that need mutation use interior
/// mutability so one handle can be shared between a store and its caller.
pub trait DraftStorage {
    /// Read the raw value stored under `key`, if any.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Overwrite the value stored under `key`.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove `key`. Removing a missing key is not an error.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

impl<S: DraftStorage + ?Sized> DraftStorage for Box<S> {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        (**self).remove(key)
    }
}

impl<S: DraftStorage + ?Sized> DraftStorage for &S {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        (**self).remove(key)
    }
}
