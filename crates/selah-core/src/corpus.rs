//! The scripture corpus: book → chapter → verse text.
//!
//! A [`Corpus`] is built once (offline, by the converter) and loaded
//! read-only per process. Book order is the order of the source document and
//! is load-bearing: navigation derives the canonical book list from it.

use std::{
  collections::{BTreeMap, HashMap},
  fmt,
  path::Path,
};

use serde::{
  Deserialize, Deserializer, Serialize, Serializer,
  de::{MapAccess, Visitor},
  ser::SerializeMap,
};

use crate::{Error, Result};

/// Highest verse number accepted when building a chapter.
pub const MAX_VERSE: u32 = 999;

// ─── Chapter ─────────────────────────────────────────────────────────────────

/// Ordered verse slots of one chapter; index 0 holds verse 1.
///
/// A slot is `None` where the source skipped a verse number. Empty strings are
/// treated exactly like `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Chapter(Vec<Option<String>>);

impl Chapter {
  pub fn new() -> Self {
    Self::default()
  }

  /// Raw positional slots, gaps included.
  pub fn slots(&self) -> &[Option<String>] {
    &self.0
  }

  /// Text of `verse` (1-based), if present and non-empty.
  pub fn text(&self, verse: u32) -> Option<&str> {
    let index = (verse as usize).checked_sub(1)?;
    self
      .0
      .get(index)?
      .as_deref()
      .filter(|t| !t.is_empty())
  }

  /// Store `text` as verse `verse` (1-based), padding any gap before it.
  ///
  /// Returns `false` (and stores nothing) for verse 0 or a verse above
  /// [`MAX_VERSE`].
  pub fn set(&mut self, verse: u32, text: impl Into<String>) -> bool {
    if verse == 0 || verse > MAX_VERSE {
      return false;
    }
    let index = verse as usize - 1;
    if self.0.len() <= index {
      self.0.resize(index + 1, None);
    }
    let text = text.into();
    self.0[index] = (!text.is_empty()).then_some(text);
    true
  }

  /// Present verses as `(verse_number, text)`, ascending.
  pub fn verses(&self) -> impl Iterator<Item = (u32, &str)> {
    self.0.iter().enumerate().filter_map(|(i, slot)| {
      slot
        .as_deref()
        .filter(|t| !t.is_empty())
        .map(|t| (i as u32 + 1, t))
    })
  }
}

// ─── Book ────────────────────────────────────────────────────────────────────

/// The chapters of one book, keyed by 1-based chapter number.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
  pub chapters: BTreeMap<u32, Chapter>,
}

impl Book {
  pub fn chapter(&self, number: u32) -> Option<&Chapter> {
    self.chapters.get(&number)
  }

  /// Number of chapter keys present.
  pub fn chapter_count(&self) -> usize {
    self.chapters.len()
  }
}

// ─── Verse ───────────────────────────────────────────────────────────────────

/// One addressable verse as returned to callers. `text` is never empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verse {
  pub book:    String,
  pub chapter: u32,
  pub verse:   u32,
  pub text:    String,
}

// ─── Corpus ──────────────────────────────────────────────────────────────────

/// Ordered mapping from book name to [`Book`].
///
/// Serialises as a JSON object whose key order is the book order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Corpus {
  books: Vec<(String, Book)>,
  index: HashMap<String, usize>,
}

impl Corpus {
  pub fn new() -> Self {
    Self::default()
  }

  /// Load a corpus document from `path`.
  ///
  /// Fails with [`Error::CorpusUnavailable`] if the file is missing or is not
  /// a valid corpus document.
  pub fn load(path: impl AsRef<Path>) -> Result<Self> {
    let path = path.as_ref();
    let raw = std::fs::read_to_string(path).map_err(|e| {
      Error::CorpusUnavailable(format!("{}: {e}", path.display()))
    })?;
    let corpus = Self::from_json(&raw)?;
    tracing::info!(books = corpus.len(), path = %path.display(), "corpus loaded");
    Ok(corpus)
  }

  pub fn from_json(raw: &str) -> Result<Self> {
    serde_json::from_str(raw)
      .map_err(|e| Error::CorpusUnavailable(format!("invalid corpus document: {e}")))
  }

  pub fn to_json_pretty(&self) -> Result<String> {
    Ok(serde_json::to_string_pretty(self)?)
  }

  pub fn len(&self) -> usize {
    self.books.len()
  }

  pub fn is_empty(&self) -> bool {
    self.books.is_empty()
  }

  pub fn book(&self, name: &str) -> Option<&Book> {
    self.index.get(name).map(|&i| &self.books[i].1)
  }

  /// Position of `name` in book order.
  pub fn position(&self, name: &str) -> Option<usize> {
    self.index.get(name).copied()
  }

  /// Books in document order.
  pub fn books(&self) -> impl Iterator<Item = (&str, &Book)> {
    self.books.iter().map(|(name, book)| (name.as_str(), book))
  }

  /// The book at `position` in document order.
  pub fn book_at(&self, position: usize) -> Option<(&str, &Book)> {
    self
      .books
      .get(position)
      .map(|(name, book)| (name.as_str(), book))
  }

  /// Insert or replace a book. A replaced book keeps its original position.
  pub fn insert_book(&mut self, name: impl Into<String>, book: Book) {
    let name = name.into();
    match self.index.get(&name) {
      Some(&i) => self.books[i].1 = book,
      None => {
        self.index.insert(name.clone(), self.books.len());
        self.books.push((name, book));
      }
    }
  }

  /// Mutable access to `name`, appending an empty book if absent.
  pub fn book_entry(&mut self, name: &str) -> &mut Book {
    let i = match self.index.get(name) {
      Some(&i) => i,
      None => {
        self.insert_book(name, Book::default());
        self.books.len() - 1
      }
    };
    &mut self.books[i].1
  }

  /// Current text of one verse, if present and non-empty.
  pub fn verse_text(&self, book: &str, chapter: u32, verse: u32) -> Option<&str> {
    self.book(book)?.chapter(chapter)?.text(verse)
  }

  // ── Verse lookup ──────────────────────────────────────────────────────────

  /// Look up a chapter from raw request parameters.
  ///
  /// Absent or empty `book`/`chapter` is [`Error::MissingParameter`]; a
  /// chapter that is not a positive integer, an unknown book, or an unknown
  /// chapter is [`Error::NotFound`].
  pub fn get_verses(
    &self,
    book: Option<&str>,
    chapter: Option<&str>,
  ) -> Result<Vec<Verse>> {
    let book = book
      .filter(|b| !b.is_empty())
      .ok_or(Error::MissingParameter("book"))?;
    let chapter = chapter
      .filter(|c| !c.is_empty())
      .ok_or(Error::MissingParameter("chapter"))?;
    let number = chapter
      .trim()
      .parse::<u32>()
      .map_err(|_| Error::NotFound(format!("{book} {chapter}")))?;
    self.verses(book, number)
  }

  /// The present verses of `book` `chapter`, ascending by verse number.
  pub fn verses(&self, book: &str, chapter: u32) -> Result<Vec<Verse>> {
    let found = self
      .book(book)
      .and_then(|b| b.chapter(chapter))
      .ok_or_else(|| Error::NotFound(format!("{book} {chapter}")))?;

    Ok(
      found
        .verses()
        .map(|(verse, text)| Verse {
          book: book.to_owned(),
          chapter,
          verse,
          text: text.to_owned(),
        })
        .collect(),
    )
  }
}

impl Serialize for Corpus {
  fn serialize<S: Serializer>(
    &self,
    serializer: S,
  ) -> std::result::Result<S::Ok, S::Error> {
    let mut map = serializer.serialize_map(Some(self.books.len()))?;
    for (name, book) in &self.books {
      map.serialize_entry(name, book)?;
    }
    map.end()
  }
}

impl<'de> Deserialize<'de> for Corpus {
  fn deserialize<D: Deserializer<'de>>(
    deserializer: D,
  ) -> std::result::Result<Self, D::Error> {
    struct CorpusVisitor;

    impl<'de> Visitor<'de> for CorpusVisitor {
      type Value = Corpus;

      fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a map of book names to books")
      }

      fn visit_map<A: MapAccess<'de>>(
        self,
        mut map: A,
      ) -> std::result::Result<Corpus, A::Error> {
        let mut corpus = Corpus::new();
        while let Some((name, book)) = map.next_entry::<String, Book>()? {
          corpus.insert_book(name, book);
        }
        Ok(corpus)
      }
    }

    deserializer.deserialize_map(CorpusVisitor)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  const FIXTURE: &str = r#"{
    "Genesis": { "chapters": {
      "1": ["In the beginning God created the heaven and the earth.",
            "And the earth was without form, and void.",
            null,
            "And God saw the light, that it was good."],
      "2": ["Thus the heavens and the earth were finished.", ""]
    }},
    "Exodus": { "chapters": {
      "3": [null, null, "And Moses said, I will now turn aside."]
    }}
  }"#;

  fn corpus() -> Corpus {
    Corpus::from_json(FIXTURE).unwrap()
  }

  #[test]
  fn preserves_document_book_order() {
    let raw = r#"{"Zephaniah":{"chapters":{}},"Acts":{"chapters":{}},"Genesis":{"chapters":{}}}"#;
    let c = Corpus::from_json(raw).unwrap();
    let names: Vec<_> = c.books().map(|(n, _)| n).collect();
    assert_eq!(names, ["Zephaniah", "Acts", "Genesis"]);

    let json = c.to_json_pretty().unwrap();
    let zeph = json.find("Zephaniah").unwrap();
    let acts = json.find("Acts").unwrap();
    assert!(zeph < acts);
    assert_eq!(Corpus::from_json(&json).unwrap(), c);
  }

  #[test]
  fn verses_skip_gaps_and_keep_positions() {
    let verses = corpus().verses("Genesis", 1).unwrap();
    let numbers: Vec<_> = verses.iter().map(|v| v.verse).collect();
    assert_eq!(numbers, [1, 2, 4]);
    assert_eq!(verses[2].text, "And God saw the light, that it was good.");
    assert!(verses.iter().all(|v| v.book == "Genesis" && v.chapter == 1));
  }

  #[test]
  fn every_chapter_is_strictly_increasing_and_non_empty() {
    let c = corpus();
    for (name, book) in c.books() {
      for &chapter in book.chapters.keys() {
        let verses = c.verses(name, chapter).unwrap();
        assert!(verses.windows(2).all(|w| w[0].verse < w[1].verse));
        assert!(verses.iter().all(|v| !v.text.is_empty()));
      }
    }
  }

  #[test]
  fn empty_string_slot_is_absent() {
    let verses = corpus().verses("Genesis", 2).unwrap();
    assert_eq!(verses.len(), 1);
    assert_eq!(corpus().verse_text("Genesis", 2, 2), None);
  }

  #[test]
  fn unknown_book_or_chapter_is_not_found() {
    let c = corpus();
    assert!(matches!(c.verses("Leviticus", 1), Err(Error::NotFound(_))));
    assert!(matches!(c.verses("Genesis", 3), Err(Error::NotFound(_))));
    assert!(matches!(
      c.get_verses(Some("Genesis"), Some("one")),
      Err(Error::NotFound(_))
    ));
    assert!(matches!(
      c.get_verses(Some("genesis"), Some("1")),
      Err(Error::NotFound(_))
    ));
  }

  #[test]
  fn missing_parameters_are_reported() {
    let c = corpus();
    assert!(matches!(
      c.get_verses(None, Some("1")),
      Err(Error::MissingParameter("book"))
    ));
    assert!(matches!(
      c.get_verses(Some("Genesis"), Some("")),
      Err(Error::MissingParameter("chapter"))
    ));
  }

  #[test]
  fn load_missing_file_is_unavailable() {
    let err = Corpus::load("/nonexistent/bible_data.json").unwrap_err();
    assert!(matches!(err, Error::CorpusUnavailable(_)));
  }

  #[test]
  fn malformed_document_is_unavailable() {
    assert!(matches!(
      Corpus::from_json(r#"["Genesis"]"#),
      Err(Error::CorpusUnavailable(_))
    ));
    assert!(matches!(
      Corpus::from_json(r#"{"Genesis":{"chapters":{"one":[]}}}"#),
      Err(Error::CorpusUnavailable(_))
    ));
  }

  #[test]
  fn chapter_set_pads_gaps_and_rejects_zero() {
    let mut ch = Chapter::new();
    assert!(ch.set(3, "third"));
    assert!(!ch.set(0, "zero"));
    assert!(!ch.set(MAX_VERSE + 1, "too far"));
    assert_eq!(ch.slots(), &[None, None, Some("third".to_owned())]);
  }
}
