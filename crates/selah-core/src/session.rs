//! Reading session state: where the reader left off.

use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::corpus::Corpus;

/// Storage key of the singleton [`ReadingState`].
pub const READING_STATE_KEY: &str = "readingState";

/// The last viewed book and chapter. Overwritten on every navigation change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadingState {
  pub book:            String,
  pub chapter:         u32,
  /// Verse cursor within the chapter.
  #[serde(default)]
  pub scroll_position: usize,
}

impl ReadingState {
  pub fn new(book: impl Into<String>, chapter: u32) -> Self {
    Self { book: book.into(), chapter, scroll_position: 0 }
  }

  /// Chapter 1 of the first book in `corpus`.
  pub fn start_of(corpus: &Corpus) -> Option<Self> {
    corpus.book_at(0).map(|(name, _)| Self::new(name, 1))
  }
}

/// Durable storage for the singleton [`ReadingState`].
pub trait SessionStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  fn load_reading_state(
    &self,
  ) -> impl Future<Output = Result<Option<ReadingState>, Self::Error>> + Send + '_;

  fn save_reading_state<'a>(
    &'a self,
    state: &'a ReadingState,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn reads_state_without_scroll_position() {
    let state: ReadingState =
      serde_json::from_str(r#"{"book":"Psalms","chapter":23}"#).unwrap();
    assert_eq!(state, ReadingState::new("Psalms", 23));
  }

  #[test]
  fn writes_camel_case_keys() {
    let json = serde_json::to_string(&ReadingState::new("John", 3)).unwrap();
    assert_eq!(json, r#"{"book":"John","chapter":3,"scrollPosition":0}"#);
  }

  #[test]
  fn start_of_empty_corpus_is_none() {
    assert_eq!(ReadingState::start_of(&Corpus::new()), None);
  }
}
