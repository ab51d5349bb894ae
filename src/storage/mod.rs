//! Persistence boundary for the flight store.
//!
//! A port holds one opaque blob. The store owns the encoding; ports only move
//! bytes.

use anyhow::{bail, Result};
use async_trait::async_trait;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Mutex, PoisonError,
};

mod sqlite;

pub use sqlite::SqliteStorage;

#[async_trait]
pub trait StoragePort: Send + Sync {
    /// `Ok(None)` when nothing has been saved yet.
    async fn load(&self) -> Result<Option<Vec<u8>>>;
    async fn save(&self, bytes: Vec<u8>) -> Result<()>;
}

/// Process-local storage, used by tests and previews.
#[derive(Default)]
pub struct MemoryStorage {
    blob: Mutex<Option<Vec<u8>>>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_contents(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            blob: Mutex::new(Some(bytes.into())),
            ..Self::default()
        }
    }

    pub fn contents(&self) -> Option<Vec<u8>> {
        self.blob
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Makes subsequent loads fail, as an unavailable medium would.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.fail_reads.store(unavailable, Ordering::SeqCst);
    }

    pub fn set_read_only(&self, read_only: bool) {
        self.fail_writes.store(read_only, Ordering::SeqCst);
    }
}

#[async_trait]
impl StoragePort for MemoryStorage {
    async fn load(&self) -> Result<Option<Vec<u8>>> {
        if self.fail_reads.load(Ordering::SeqCst) {
            bail!("storage unavailable");
        }
        Ok(self.contents())
    }

    async fn save(&self, bytes: Vec<u8>) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            bail!("storage is read-only");
        }
        *self.blob.lock().unwrap_or_else(PoisonError::into_inner) = Some(bytes);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn memory_storage_round_trips_and_fails_on_demand() {
        let storage = MemoryStorage::new();
        assert!(storage.load().await.unwrap().is_none());

        storage.save(b"[]".to_vec()).await.unwrap();
        assert_eq!(storage.load().await.unwrap(), Some(b"[]".to_vec()));

        storage.set_unavailable(true);
        assert!(storage.load().await.is_err());

        storage.set_read_only(true);
        assert!(storage.save(b"x".to_vec()).await.is_err());
        assert_eq!(storage.contents(), Some(b"[]".to_vec()));
    }
}
