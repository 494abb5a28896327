//! [`SqliteStore`] — the SQLite implementation of [`SnapshotStore`].

use std::path::Path;

use rusqlite::OptionalExtension as _;

use statuswatch_core::{snapshot::CacheSnapshot, store::SnapshotStore};

use crate::{Error, Result, schema::SCHEMA};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A snapshot cache backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) the database file at `path`. The schema is not
  /// applied here; it lands with the first write.
  ///
  /// An empty path is a configuration error, reported up front instead of
  /// as a confusing open failure later.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    if path.as_ref().as_os_str().is_empty() {
      return Err(Error::NotConfigured);
    }
    let conn = tokio_rusqlite::Connection::open(path).await?;
    Ok(Self { conn })
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    Ok(Self { conn })
  }

  /// Raw stored document, or `None` when the table or row does not exist.
  async fn fetch_body(&self, key: &str) -> Result<Option<String>> {
    let key = key.to_owned();
    let body = self
      .conn
      .call(move |conn| {
        let table_exists: bool = conn
          .query_row(
            "SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = 'snapshots'",
            [],
            |_| Ok(true),
          )
          .optional()?
          .unwrap_or(false);

        if !table_exists {
          return Ok(None);
        }

        let body: Option<String> = conn
          .query_row(
            "SELECT body FROM snapshots WHERE cache_key = ?1",
            rusqlite::params![key],
            |r| r.get(0),
          )
          .optional()?;

        Ok(body)
      })
      .await?;
    Ok(body)
  }
}

#[cfg(test)]
impl SqliteStore {
  /// Test hook: run arbitrary SQL against the underlying connection.
  pub(crate) async fn raw_execute(&self, sql: &'static str) -> Result<()> {
    self
      .conn
      .call(move |conn| {
        conn.execute_batch(sql)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

impl SnapshotStore for SqliteStore {
  type Error = Error;

  async fn get(&self, key: &str) -> Result<Option<CacheSnapshot>> {
    match self.fetch_body(key).await? {
      None => Ok(None),
      Some(body) => Ok(Some(serde_json::from_str(&body)?)),
    }
  }

  async fn put(&self, key: &str, snapshot: &CacheSnapshot) -> Result<()> {
    let key = key.to_owned();
    let body = serde_json::to_string(snapshot)?;
    let written_at = snapshot.cached_at.to_rfc3339();

    self
      .conn
      .call(move |conn| {
        conn.execute_batch(SCHEMA)?;
        conn.execute(
          "INSERT INTO snapshots (cache_key, body, written_at)
           VALUES (?1, ?2, ?3)
           ON CONFLICT (cache_key) DO UPDATE
           SET body = excluded.body, written_at = excluded.written_at",
          rusqlite::params![key, body, written_at],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}
