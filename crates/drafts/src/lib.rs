//! `checkout-drafts`
//!
//! **Responsibility:** client-side persistence of in-progress form drafts.
//!
//! This crate provides:
//! - a [`DraftStorage`] key-value abstraction (string keys, JSON string values)
//! - in-memory and file-backed storage backends
//! - [`DraftStore`], a typed `load()/save()/update()` wrapper over one key
//!
//! Writes overwrite the whole value; there is no merging.

pub mod config;
pub mod file;
pub mod memory;
pub mod storage;
pub mod store;

pub use config::{DraftBackend, DraftConfig};
pub use file::FileStorage;
pub use memory::InMemoryStorage;
pub use storage::{DraftStorage, StorageError};
pub use store::DraftStore;
