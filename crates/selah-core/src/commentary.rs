//! Commentary records and the client-side cache abstraction.
//!
//! A [`CommentaryRecord`] is keyed by [`VerseId`] and remembers the verse text
//! it was generated for. The cache itself never validates; callers go through
//! [`cached_commentary`], which discards records whose verse text no longer
//! matches the corpus.

use std::{fmt, future::Future};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Error, Result, corpus::Verse};

/// Separator used when composing a cache key. Never valid in a book name.
pub const KEY_SEPARATOR: char = '|';

// ─── Identity ────────────────────────────────────────────────────────────────

/// The `(book, chapter, verse)` triple addressing one verse.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VerseId {
  pub book:    String,
  pub chapter: u32,
  pub verse:   u32,
}

impl VerseId {
  pub fn new(book: impl Into<String>, chapter: u32, verse: u32) -> Self {
    Self { book: book.into(), chapter, verse }
  }

  /// Collision-free storage key, `book|chapter|verse`.
  pub fn cache_key(&self) -> Result<String> {
    if self.book.contains(KEY_SEPARATOR) {
      return Err(Error::InvalidKey(self.book.clone()));
    }
    Ok(format!(
      "{}{KEY_SEPARATOR}{}{KEY_SEPARATOR}{}",
      self.book, self.chapter, self.verse
    ))
  }

  /// Inverse of [`VerseId::cache_key`].
  pub fn from_cache_key(key: &str) -> Option<Self> {
    let mut parts = key.split(KEY_SEPARATOR);
    let book = parts.next().filter(|b| !b.is_empty())?;
    let chapter = parts.next()?.parse().ok()?;
    let verse = parts.next()?.parse().ok()?;
    if parts.next().is_some() {
      return None;
    }
    Some(Self::new(book, chapter, verse))
  }
}

impl From<&Verse> for VerseId {
  fn from(v: &Verse) -> Self {
    Self::new(v.book.clone(), v.chapter, v.verse)
  }
}

impl fmt::Display for VerseId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{} {}:{}", self.book, self.chapter, self.verse)
  }
}

// ─── Record ──────────────────────────────────────────────────────────────────

/// A generated commentary together with the verse text it describes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentaryRecord {
  pub verse_text:      String,
  pub commentary_text: String,
  pub generated_at:    DateTime<Utc>,
}

impl CommentaryRecord {
  /// A record stamped with the current time.
  pub fn new(verse_text: impl Into<String>, commentary_text: impl Into<String>) -> Self {
    Self {
      verse_text:      verse_text.into(),
      commentary_text: commentary_text.into(),
      generated_at:    Utc::now(),
    }
  }

  /// Whether the record still describes `current_text`.
  pub fn is_valid_for(&self, current_text: &str) -> bool {
    self.verse_text == current_text
  }
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Durable key-value storage for commentary, one record per verse.
///
/// Writes are last-writer-wins; records never expire by time.
pub trait CommentaryCache: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// The stored record for `id`, unvalidated.
  fn get<'a>(
    &'a self,
    id: &'a VerseId,
  ) -> impl Future<Output = Result<Option<CommentaryRecord>, Self::Error>> + Send + 'a;

  /// Store `record` for `id`, replacing any previous record.
  fn put<'a>(
    &'a self,
    id: &'a VerseId,
    record: CommentaryRecord,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  /// Remove any record for `id`. Removing an absent record is not an error.
  fn invalidate<'a>(
    &'a self,
    id: &'a VerseId,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;
}

/// Read-through validation: the cached record for `id` if it was generated for
/// `current_text`.
///
/// A stale record is invalidated and reported as a miss.
pub async fn cached_commentary<C: CommentaryCache>(
  cache: &C,
  id: &VerseId,
  current_text: &str,
) -> Result<Option<CommentaryRecord>, C::Error> {
  let Some(record) = cache.get(id).await? else {
    return Ok(None);
  };
  if record.is_valid_for(current_text) {
    return Ok(Some(record));
  }
  tracing::debug!(verse = %id, "discarding stale commentary");
  cache.invalidate(id).await?;
  Ok(None)
}

#[cfg(test)]
mod tests {
  use std::{collections::HashMap, convert::Infallible, sync::Mutex};

  use super::*;

  #[derive(Default)]
  struct MemoryCache(Mutex<HashMap<VerseId, CommentaryRecord>>);

  impl CommentaryCache for MemoryCache {
    type Error = Infallible;

    async fn get(&self, id: &VerseId) -> Result<Option<CommentaryRecord>, Infallible> {
      Ok(self.0.lock().unwrap().get(id).cloned())
    }

    async fn put(&self, id: &VerseId, record: CommentaryRecord) -> Result<(), Infallible> {
      self.0.lock().unwrap().insert(id.clone(), record);
      Ok(())
    }

    async fn invalidate(&self, id: &VerseId) -> Result<(), Infallible> {
      self.0.lock().unwrap().remove(id);
      Ok(())
    }
  }

  #[test]
  fn cache_key_round_trips_and_rejects_separator() {
    let id = VerseId::new("Song of Solomon", 2, 1);
    let key = id.cache_key().unwrap();
    assert_eq!(key, "Song of Solomon|2|1");
    assert_eq!(VerseId::from_cache_key(&key), Some(id));

    assert!(matches!(
      VerseId::new("Gen|esis", 1, 1).cache_key(),
      Err(Error::InvalidKey(_))
    ));
    assert_eq!(VerseId::from_cache_key("Genesis|1"), None);
    assert_eq!(VerseId::from_cache_key("Genesis|1|1|1"), None);
  }

  #[test]
  fn numbered_books_do_not_collide() {
    let a = VerseId::new("1 John", 1, 1).cache_key().unwrap();
    let b = VerseId::new("1", 1, 1).cache_key().unwrap();
    assert_ne!(a, b);
  }

  #[tokio::test]
  async fn matching_record_is_a_hit() {
    let cache = MemoryCache::default();
    let id = VerseId::new("Genesis", 1, 1);
    let record = CommentaryRecord::new("In the beginning...", "## Creation");
    cache.put(&id, record.clone()).await.unwrap();

    let hit = cached_commentary(&cache, &id, "In the beginning...").await.unwrap();
    assert_eq!(hit, Some(record));
  }

  #[tokio::test]
  async fn stale_record_is_invalidated() {
    let cache = MemoryCache::default();
    let id = VerseId::new("Genesis", 1, 1);
    cache
      .put(&id, CommentaryRecord::new("In the beginning...", "## Creation"))
      .await
      .unwrap();

    let hit = cached_commentary(&cache, &id, "In the beginning God created")
      .await
      .unwrap();
    assert_eq!(hit, None);
    assert_eq!(cache.get(&id).await.unwrap(), None);
  }
}
