use anyhow::{bail, Context, Result};
use rusqlite::Connection;

/// Schema steps in order; step `i` takes the database to version `i + 1`.
const STEPS: &[&str] = &[include_str!("schemas/schema_v1.sql")];

fn schema_version() -> i64 {
    STEPS.len() as i64
}

fn user_version(conn: &Connection) -> Result<i64> {
    conn.pragma_query_value(None, "user_version", |row| row.get(0))
        .context("failed to read user_version")
}

/// Applies pending steps, each in its own transaction.
pub(super) fn migrate(conn: &mut Connection) -> Result<()> {
    let current = user_version(conn)?;
    if current > schema_version() {
        bail!(
            "database schema v{current} is newer than this build understands (v{})",
            schema_version()
        );
    }

    for (index, sql) in STEPS.iter().enumerate().skip(current as usize) {
        let target = index as i64 + 1;
        let tx = conn.transaction()?;
        tx.execute_batch(sql)
            .with_context(|| format!("schema step v{target} failed"))?;
        tx.pragma_update(None, "user_version", target)?;
        tx.commit()
            .with_context(|| format!("failed to commit schema v{target}"))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_database_reaches_latest_version() {
        let mut conn = Connection::open_in_memory().unwrap();
        migrate(&mut conn).unwrap();
        migrate(&mut conn).unwrap();

        assert_eq!(user_version(&conn).unwrap(), schema_version());
        let tables: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'kv_store'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(tables, 1);
    }

    #[test]
    fn newer_schema_is_refused() {
        let mut conn = Connection::open_in_memory().unwrap();
        conn.pragma_update(None, "user_version", schema_version() + 1)
            .unwrap();
        assert!(migrate(&mut conn).is_err());
    }
}
