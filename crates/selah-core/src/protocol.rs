//! JSON bodies exchanged between the API server and its clients.

use serde::{Deserialize, Serialize};

use crate::corpus::Verse;

/// One entry of a `GET /verses` response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerseEntry {
  pub verse: u32,
  pub text:  String,
}

/// `GET /verses` response body: verses in ascending order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersesResponse {
  pub verses: Vec<VerseEntry>,
}

impl VersesResponse {
  /// Re-attach the book and chapter the request was made for.
  pub fn into_verses(self, book: &str, chapter: u32) -> Vec<Verse> {
    self
      .verses
      .into_iter()
      .map(|e| Verse {
        book: book.to_owned(),
        chapter,
        verse: e.verse,
        text: e.text,
      })
      .collect()
  }
}

impl From<Vec<Verse>> for VersesResponse {
  fn from(verses: Vec<Verse>) -> Self {
    Self {
      verses: verses
        .into_iter()
        .map(|v| VerseEntry { verse: v.verse, text: v.text })
        .collect(),
    }
  }
}

/// `POST /commentary` request body.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CommentaryRequest {
  #[serde(default)]
  pub verse: Option<String>,
}

/// `POST /commentary` response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentaryResponse {
  pub commentary: String,
}

/// Error body returned with every non-success status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
  pub error: String,
}
