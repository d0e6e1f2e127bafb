//! Draft storage configuration (environment driven).

use std::path::PathBuf;
use std::str::FromStr;

use anyhow::Context;

use crate::file::FileStorage;
use crate::memory::InMemoryStorage;
use crate::storage::DraftStorage;

pub const BACKEND_ENV: &str = "CHECKOUT_DRAFT_BACKEND";
pub const DIR_ENV: &str = "CHECKOUT_DRAFT_DIR";

/// Which storage backend drafts go to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftBackend {
    /// Process-local; drafts vanish on exit.
    Memory,
    /// One JSON file per key under [`DraftConfig::dir`].
    File,
}

impl FromStr for DraftBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(Self::Memory),
            "file" => Ok(Self::File),
            other => anyhow::bail!("unknown draft backend {other:?} (expected memory|file)"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DraftConfig {
    pub backend: DraftBackend,
    pub dir: PathBuf,
}

impl DraftConfig {
    /// Read `CHECKOUT_DRAFT_BACKEND` (default `file`) and `CHECKOUT_DRAFT_DIR`
    /// (default `{data_dir}/checkout/drafts`).
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as [`Self::from_env`] with an injectable variable lookup.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let backend = match lookup(BACKEND_ENV) {
            Some(raw) => raw
                .parse::<DraftBackend>()
                .with_context(|| format!("invalid {BACKEND_ENV}"))?,
            None => DraftBackend::File,
        };

        let dir = match lookup(DIR_ENV) {
            Some(raw) if !raw.trim().is_empty() => PathBuf::from(raw),
            _ => default_draft_dir()?,
        };

        Ok(Self { backend, dir })
    }

    /// Build the configured storage backend.
    pub fn open(&self) -> Box<dyn DraftStorage> {
        tracing::info!(backend = ?self.backend, dir = %self.dir.display(), "opening draft storage");
        match self.backend {
            DraftBackend::Memory => Box::new(InMemoryStorage::new()),
            DraftBackend::File => Box::new(FileStorage::new(self.dir.clone())),
        }
    }
}

/// `{app_data_dir}/checkout/drafts`, falling back to `~/.local/share`.
fn default_draft_dir() -> anyhow::Result<PathBuf> {
    let mut dir = dirs::data_dir()
        .or_else(|| {
            dirs::home_dir().map(|mut h| {
                h.push(".local");
                h.push("share");
                h
            })
        })
        .context("failed to resolve OS app data directory - tried data_dir() and home_dir()/.local/share")?;

    dir.push("checkout");
    dir.push("drafts");
    Ok(dir)
}
