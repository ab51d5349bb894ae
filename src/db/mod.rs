//! SQLite persistence for keyed blobs.
//!
//! One connection lives on the `flyrely-db` thread. Callers send typed
//! requests and await the reply, so statements run one at a time in send
//! order.

use std::{
    path::Path,
    sync::{mpsc, Arc, Mutex, PoisonError},
    thread::{self, JoinHandle},
};

use anyhow::{anyhow, Context, Result};
use log::{error, info};
use rusqlite::Connection;
use tokio::sync::oneshot;

mod migrations;
mod worker;

use worker::Request;

struct Worker {
    requests: Mutex<Option<mpsc::Sender<Request>>>,
    thread: Mutex<Option<JoinHandle<()>>>,
}

impl Drop for Worker {
    fn drop(&mut self) {
        // Closing the channel ends the worker loop.
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        let handle = self
            .thread
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(handle) = handle {
            if handle.join().is_err() {
                error!("Database thread panicked");
            }
        }
    }
}

/// Cloneable handle to the database thread.
#[derive(Clone)]
pub struct Database {
    worker: Arc<Worker>,
}

impl Database {
    /// Opens `path`, brings the schema up to date, and starts the worker.
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }

        let mut conn = Connection::open(path)
            .with_context(|| format!("failed to open SQLite database {}", path.display()))?;
        if let Err(err) = conn.pragma_update(None, "journal_mode", "WAL") {
            error!("Failed to enable WAL mode: {err}");
        }
        migrations::migrate(&mut conn).context("failed to migrate database")?;

        let (tx, rx) = mpsc::channel();
        let thread = thread::Builder::new()
            .name("flyrely-db".into())
            .spawn(move || worker::run(conn, rx))
            .context("failed to spawn database thread")?;

        info!("Database ready at {}", path.display());
        Ok(Self {
            worker: Arc::new(Worker {
                requests: Mutex::new(Some(tx)),
                thread: Mutex::new(Some(thread)),
            }),
        })
    }

    /// Bytes stored under `key`, if any.
    pub async fn load_blob(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let (reply, answer) = oneshot::channel();
        self.send(Request::Load {
            key: key.to_string(),
            reply,
        })?;
        answer.await.map_err(|_| anyhow!("database thread dropped the request"))?
    }

    /// Replaces the bytes under `key`.
    pub async fn store_blob(&self, key: &str, bytes: Vec<u8>) -> Result<()> {
        let (reply, answer) = oneshot::channel();
        self.send(Request::Store {
            key: key.to_string(),
            bytes,
            reply,
        })?;
        answer.await.map_err(|_| anyhow!("database thread dropped the request"))?
    }

    fn send(&self, request: Request) -> Result<()> {
        let requests = self
            .worker
            .requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        requests
            .as_ref()
            .ok_or_else(|| anyhow!("database is closed"))?
            .send(request)
            .map_err(|_| anyhow!("database thread is not running"))
    }
}
