use std::sync::mpsc::Receiver;

use anyhow::{Context, Result};
use chrono::Utc;
use log::{debug, error};
use rusqlite::{params, Connection, OptionalExtension};
use tokio::sync::oneshot;

pub(super) enum Request {
    Load {
        key: String,
        reply: oneshot::Sender<Result<Option<Vec<u8>>>>,
    },
    Store {
        key: String,
        bytes: Vec<u8>,
        reply: oneshot::Sender<Result<()>>,
    },
}

/// Serves requests until every sender is gone.
pub(super) fn run(conn: Connection, requests: Receiver<Request>) {
    for request in requests {
        let delivered = match request {
            Request::Load { key, reply } => reply.send(read_blob(&conn, &key)).is_ok(),
            Request::Store { key, bytes, reply } => {
                reply.send(write_blob(&conn, &key, &bytes)).is_ok()
            }
        };
        if !delivered {
            error!("Database caller went away before its reply");
        }
    }
    debug!("Database thread exiting");
}

fn read_blob(conn: &Connection, key: &str) -> Result<Option<Vec<u8>>> {
    conn.query_row(
        "SELECT value FROM kv_store WHERE key = ?1",
        params![key],
        |row| row.get(0),
    )
    .optional()
    .with_context(|| format!("failed to read '{key}'"))
}

fn write_blob(conn: &Connection, key: &str, bytes: &[u8]) -> Result<()> {
    conn.execute(
        "INSERT INTO kv_store (key, value, updated_at) VALUES (?1, ?2, ?3)
         ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
        params![key, bytes, Utc::now().to_rfc3339()],
    )
    .with_context(|| format!("failed to write '{key}'"))?;
    Ok(())
}
