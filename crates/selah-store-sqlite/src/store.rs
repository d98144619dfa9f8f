//! [`SqliteStore`], the SQLite implementation of [`CommentaryCache`] and
//! [`SessionStore`].

use std::path::Path;

use chrono::{SecondsFormat, Utc};
use rusqlite::OptionalExtension as _;
use serde::{Serialize, de::DeserializeOwned};

use selah_core::{
  commentary::{CommentaryCache, CommentaryRecord, VerseId},
  session::{READING_STATE_KEY, ReadingState, SessionStore},
};

use crate::{Result, error::Error, schema::SCHEMA};

// ─── Store ───────────────────────────────────────────────────────────────────

/// Local reader state backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  // ── Raw entries ───────────────────────────────────────────────────────────

  async fn read<T: DeserializeOwned + Send + 'static>(&self, key: String) -> Result<Option<T>> {
    let raw: Option<String> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT value_json FROM entries WHERE key = ?1",
              rusqlite::params![key],
              |r| r.get(0),
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(|s| serde_json::from_str(&s)).transpose().map_err(Error::Json)
  }

  async fn write<T: Serialize>(&self, key: String, value: &T) -> Result<()> {
    let value_json = serde_json::to_string(value)?;
    let updated_at = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO entries (key, value_json, updated_at) VALUES (?1, ?2, ?3)
           ON CONFLICT(key) DO UPDATE SET
             value_json = excluded.value_json,
             updated_at = excluded.updated_at",
          rusqlite::params![key, value_json, updated_at],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn delete(&self, key: String) -> Result<()> {
    self
      .conn
      .call(move |conn| {
        conn.execute("DELETE FROM entries WHERE key = ?1", rusqlite::params![key])?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Number of cached commentary records.
  pub async fn commentary_count(&self) -> Result<u64> {
    let n: i64 = self
      .conn
      .call(|conn| {
        Ok(conn.query_row(
          "SELECT COUNT(*) FROM entries WHERE key <> ?1",
          rusqlite::params![READING_STATE_KEY],
          |r| r.get(0),
        )?)
      })
      .await?;
    Ok(n.max(0) as u64)
  }
}

// ─── CommentaryCache impl ────────────────────────────────────────────────────

impl CommentaryCache for SqliteStore {
  type Error = Error;

  async fn get(&self, id: &VerseId) -> Result<Option<CommentaryRecord>> {
    self.read(id.cache_key()?).await
  }

  async fn put(&self, id: &VerseId, record: CommentaryRecord) -> Result<()> {
    self.write(id.cache_key()?, &record).await?;
    tracing::debug!(verse = %id, "commentary cached");
    Ok(())
  }

  async fn invalidate(&self, id: &VerseId) -> Result<()> {
    self.delete(id.cache_key()?).await
  }
}

// ─── SessionStore impl ───────────────────────────────────────────────────────

impl SessionStore for SqliteStore {
  type Error = Error;

  async fn load_reading_state(&self) -> Result<Option<ReadingState>> {
    self.read(READING_STATE_KEY.to_owned()).await
  }

  async fn save_reading_state(&self, state: &ReadingState) -> Result<()> {
    self.write(READING_STATE_KEY.to_owned(), state).await
  }
}
