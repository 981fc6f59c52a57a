//! Cache storage schema.
//!
//! Version 1 creates `caches` (one row per generation, ids in creation order)
//! and `cache_entries` (keyed by generation and request hash, removed with
//! their generation). Applied versions are recorded in `_migrations`.

use std::num::ParseIntError;

use super::Error;
use tokio_rusqlite::{Connection, params};

/// Schema versions in application order: (version, SQL).
const MIGRATIONS: &[(&str, &str)] = &[("1", include_str!("../../migrations/001_cache_storage.sql"))];

/// Bring the cache schema up to the latest version.
///
/// # Errors
///
/// Returns `Error::MigrationFailed` for a malformed version tag, or the
/// database error of the failing statement.
pub async fn run(conn: &Connection) -> Result<(), Error> {
    conn.call(|conn| -> Result<(), Error> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS _migrations (
                version INTEGER PRIMARY KEY,
                applied_at TEXT NOT NULL
            )",
            [],
        )
        .map_err(Error::from)?;

        let current: i64 = conn
            .query_row("SELECT COALESCE(MAX(version), 0) FROM _migrations", [], |row| {
                row.get(0)
            })
            .map_err(Error::from)?;

        for (version, sql) in MIGRATIONS {
            let version_num: i64 = version
                .parse()
                .map_err(|e: ParseIntError| Error::MigrationFailed(e.to_string()))?;
            if version_num > current {
                conn.execute_batch(sql)?;
                conn.execute(
                    "INSERT INTO _migrations (version, applied_at) VALUES (?1, ?2)",
                    params![version_num, chrono::Utc::now().to_rfc3339()],
                )
                .map_err(Error::from)?;
                tracing::debug!(version = version_num, "applied cache migration");
            }
        }

        Ok(())
    })
    .await
    .map_err(Error::from)
}
