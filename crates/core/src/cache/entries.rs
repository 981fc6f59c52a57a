//! Generation and entry operations on the SQLite cache storage.
//!
//! Provides creating, enumerating and deleting named generations, and
//! storing and matching request/response entries inside them.

use super::connection::CacheDb;
use super::hash::{compute_cache_key, normalize_url};
use crate::http::{InterceptedRequest, Response};
use crate::Error;
use tokio_rusqlite::params;
use tokio_rusqlite::rusqlite;

/// An entry ready to be written, detached from the request/response types so it
/// can move onto the database thread.
#[derive(Debug, Clone)]
struct EntryRow {
    key_hash: String,
    method: String,
    url: String,
    status: u16,
    status_text: String,
    headers_json: String,
    body: Vec<u8>,
}

impl EntryRow {
    fn new(request: &InterceptedRequest, response: &Response) -> Result<Self, Error> {
        let headers_json =
            serde_json::to_string(&response.headers).map_err(|e| Error::CorruptEntry(e.to_string()))?;
        Ok(Self {
            key_hash: compute_cache_key(&request.method, &request.url),
            method: request.method.clone(),
            url: normalize_url(&request.url),
            status: response.status,
            status_text: response.status_text.clone(),
            headers_json,
            body: response.body.to_vec(),
        })
    }
}

/// Create the generation if missing and return its row id.
fn ensure_cache(conn: &rusqlite::Connection, name: &str) -> Result<i64, Error> {
    conn.execute(
        "INSERT OR IGNORE INTO caches (name, created_at) VALUES (?1, ?2)",
        params![name, chrono::Utc::now().to_rfc3339()],
    )?;
    let id = conn.query_row("SELECT id FROM caches WHERE name = ?1", params![name], |row| row.get(0))?;
    Ok(id)
}

fn upsert_row(conn: &rusqlite::Connection, cache_id: i64, row: &EntryRow) -> Result<(), Error> {
    conn.execute(
        "INSERT INTO cache_entries (
            cache_id, key_hash, method, url, status, status_text, headers_json, body, stored_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
        ON CONFLICT(cache_id, key_hash) DO UPDATE SET
            method = excluded.method,
            url = excluded.url,
            status = excluded.status,
            status_text = excluded.status_text,
            headers_json = excluded.headers_json,
            body = excluded.body,
            stored_at = excluded.stored_at",
        params![
            cache_id,
            &row.key_hash,
            &row.method,
            &row.url,
            row.status,
            &row.status_text,
            &row.headers_json,
            &row.body,
            chrono::Utc::now().to_rfc3339(),
        ],
    )?;
    Ok(())
}

fn decode_response(status: u16, status_text: String, headers_json: &str, body: Vec<u8>) -> Result<Response, Error> {
    let headers: Vec<(String, String)> =
        serde_json::from_str(headers_json).map_err(|e| Error::CorruptEntry(e.to_string()))?;
    Ok(Response { status, status_text, headers, body: body.into() })
}

impl CacheDb {
    /// Open (create if missing) a named generation.
    pub async fn open_cache(&self, name: &str) -> Result<(), Error> {
        let name = name.to_string();
        self.conn
            .call(move |conn| -> Result<(), Error> {
                ensure_cache(conn, &name)?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    /// Check whether a generation exists.
    pub async fn has_cache(&self, name: &str) -> Result<bool, Error> {
        let name = name.to_string();
        self.conn
            .call(move |conn| -> Result<bool, Error> {
                let exists: bool = conn
                    .query_row("SELECT EXISTS(SELECT 1 FROM caches WHERE name = ?1)", params![name], |row| {
                        row.get(0)
                    })
                    .map_err(Error::from)?;
                Ok(exists)
            })
            .await
            .map_err(Error::from)
    }

    /// All generation names, in creation order.
    pub async fn cache_names(&self) -> Result<Vec<String>, Error> {
        self.conn
            .call(move |conn| -> Result<Vec<String>, Error> {
                let mut stmt = conn.prepare("SELECT name FROM caches ORDER BY id ASC")?;
                let names = stmt
                    .query_map([], |row| row.get(0))?
                    .collect::<Result<Vec<String>, _>>()?;
                Ok(names)
            })
            .await
            .map_err(Error::from)
    }

    /// Delete a generation and every entry in it.
    ///
    /// Returns false if no generation had that name.
    pub async fn delete_cache(&self, name: &str) -> Result<bool, Error> {
        let name = name.to_string();
        self.conn
            .call(move |conn| -> Result<bool, Error> {
                let count = conn.execute("DELETE FROM caches WHERE name = ?1", params![name])?;
                Ok(count > 0)
            })
            .await
            .map_err(Error::from)
    }

    /// Store a response under the request's key, creating the generation if needed.
    ///
    /// Uses UPSERT semantics: a later write for the same request replaces the entry.
    pub async fn put_entry(&self, name: &str, request: &InterceptedRequest, response: &Response) -> Result<(), Error> {
        let name = name.to_string();
        let row = EntryRow::new(request, response)?;
        self.conn
            .call(move |conn| -> Result<(), Error> {
                let tx = conn.transaction()?;
                let cache_id = ensure_cache(&tx, &name)?;
                upsert_row(&tx, cache_id, &row)?;
                tx.commit()?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    /// Store several entries in one transaction: either all of them land or none do.
    pub async fn put_entries(&self, name: &str, entries: &[(InterceptedRequest, Response)]) -> Result<(), Error> {
        let name = name.to_string();
        let rows = entries
            .iter()
            .map(|(request, response)| EntryRow::new(request, response))
            .collect::<Result<Vec<_>, _>>()?;
        self.conn
            .call(move |conn| -> Result<(), Error> {
                let tx = conn.transaction()?;
                let cache_id = ensure_cache(&tx, &name)?;
                for row in &rows {
                    upsert_row(&tx, cache_id, row)?;
                }
                tx.commit()?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    /// Look up a request, either inside one generation or across all of them.
    ///
    /// Unscoped lookups return the hit from the oldest generation first.
    pub async fn match_entry(&self, name: Option<&str>, request: &InterceptedRequest) -> Result<Option<Response>, Error> {
        let name = name.map(str::to_string);
        let key_hash = compute_cache_key(&request.method, &request.url);
        self.conn
            .call(move |conn| -> Result<Option<Response>, Error> {
                let mut stmt = conn.prepare(
                    "SELECT e.status, e.status_text, e.headers_json, e.body
                    FROM cache_entries e JOIN caches c ON c.id = e.cache_id
                    WHERE e.key_hash = ?1 AND (?2 IS NULL OR c.name = ?2)
                    ORDER BY c.id ASC
                    LIMIT 1",
                )?;

                let result = stmt.query_row(params![key_hash, name], |row| {
                    Ok((
                        row.get::<_, u16>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, Vec<u8>>(3)?,
                    ))
                });

                match result {
                    Ok((status, status_text, headers_json, body)) => {
                        decode_response(status, status_text, &headers_json, body).map(Some)
                    }
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(Error::from)
    }

    /// Number of entries stored in a generation (0 if it doesn't exist).
    pub async fn entry_count(&self, name: &str) -> Result<u64, Error> {
        let name = name.to_string();
        self.conn
            .call(move |conn| -> Result<u64, Error> {
                let count: i64 = conn.query_row(
                    "SELECT COUNT(*) FROM cache_entries e JOIN caches c ON c.id = e.cache_id WHERE c.name = ?1",
                    params![name],
                    |row| row.get(0),
                )?;
                Ok(count as u64)
            })
            .await
            .map_err(Error::from)
    }
}
