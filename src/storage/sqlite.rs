use anyhow::Result;
use async_trait::async_trait;

use super::StoragePort;
use crate::db::Database;

/// Storage port over one database key.
#[derive(Clone)]
pub struct SqliteStorage {
    db: Database,
    key: String,
}

impl SqliteStorage {
    pub fn new(db: Database, key: impl Into<String>) -> Self {
        Self {
            db,
            key: key.into(),
        }
    }
}

#[async_trait]
impl StoragePort for SqliteStorage {
    async fn load(&self) -> Result<Option<Vec<u8>>> {
        self.db.load_blob(&self.key).await
    }

    async fn save(&self, bytes: Vec<u8>) -> Result<()> {
        self.db.store_blob(&self.key, bytes).await
    }
}
