//! Navigation model: book list, testament partition, chapter stepping.
//!
//! Everything here is derived from the structure of a [`Corpus`] or its
//! [`BookSummary`] snapshot; nothing is stored. The corpus producer is
//! responsible for enumerating books in canonical order.

use serde::{Deserialize, Serialize};

use crate::{corpus::Corpus, session::ReadingState};

/// Number of books in the Old Testament of the canonical ordering.
pub const OLD_TESTAMENT_LEN: usize = 39;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Testament {
  #[serde(rename = "OT")]
  Old,
  #[serde(rename = "NT")]
  New,
}

/// The 66-book canonical ordering with explicit testament membership.
pub const CANONICAL_BOOKS: [(&str, Testament); 66] = {
  use Testament::{New as N, Old as O};
  [
    ("Genesis", O), ("Exodus", O), ("Leviticus", O), ("Numbers", O),
    ("Deuteronomy", O), ("Joshua", O), ("Judges", O), ("Ruth", O),
    ("1 Samuel", O), ("2 Samuel", O), ("1 Kings", O), ("2 Kings", O),
    ("1 Chronicles", O), ("2 Chronicles", O), ("Ezra", O), ("Nehemiah", O),
    ("Esther", O), ("Job", O), ("Psalms", O), ("Proverbs", O),
    ("Ecclesiastes", O), ("Song of Solomon", O), ("Isaiah", O),
    ("Jeremiah", O), ("Lamentations", O), ("Ezekiel", O), ("Daniel", O),
    ("Hosea", O), ("Joel", O), ("Amos", O), ("Obadiah", O), ("Jonah", O),
    ("Micah", O), ("Nahum", O), ("Habakkuk", O), ("Zephaniah", O),
    ("Haggai", O), ("Zechariah", O), ("Malachi", O),
    ("Matthew", N), ("Mark", N), ("Luke", N), ("John", N), ("Acts", N),
    ("Romans", N), ("1 Corinthians", N), ("2 Corinthians", N),
    ("Galatians", N), ("Ephesians", N), ("Philippians", N),
    ("Colossians", N), ("1 Thessalonians", N), ("2 Thessalonians", N),
    ("1 Timothy", N), ("2 Timothy", N), ("Titus", N), ("Philemon", N),
    ("Hebrews", N), ("James", N), ("1 Peter", N), ("2 Peter", N),
    ("1 John", N), ("2 John", N), ("3 John", N), ("Jude", N),
    ("Revelation", N),
  ]
};

/// Structural snapshot of one book, as served to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookSummary {
  pub name:      String,
  pub testament: Testament,
  pub chapters:  usize,
}

// ─── Book list ───────────────────────────────────────────────────────────────

/// Book names in corpus order.
pub fn book_list(corpus: &Corpus) -> Vec<&str> {
  corpus.books().map(|(name, _)| name).collect()
}

/// Number of chapters present for `book`; 0 when the book is unknown.
pub fn chapter_count(corpus: &Corpus, book: &str) -> usize {
  corpus.book(book).map_or(0, |b| b.chapter_count())
}

// ─── Testaments ──────────────────────────────────────────────────────────────

/// Positional split: the first 39 books are the Old Testament, the rest the
/// New.
///
/// Only meaningful when `books` is in canonical order. With fewer than 39
/// entries every book lands in the first partition and the second is empty.
pub fn testament_split<T>(books: &[T]) -> (&[T], &[T]) {
  books.split_at(books.len().min(OLD_TESTAMENT_LEN))
}

/// Explicit testament membership by book name (ASCII case-insensitive).
pub fn testament_of(book: &str) -> Option<Testament> {
  CANONICAL_BOOKS
    .iter()
    .find(|(name, _)| name.eq_ignore_ascii_case(book.trim()))
    .map(|&(_, t)| t)
}

/// Testament of a book at `position` in corpus order: by name when the name
/// is canonical, otherwise by position.
pub fn testament_at(name: &str, position: usize) -> Testament {
  testament_of(name).unwrap_or(if position < OLD_TESTAMENT_LEN {
    Testament::Old
  } else {
    Testament::New
  })
}

/// One [`BookSummary`] per book, in corpus order.
pub fn summaries(corpus: &Corpus) -> Vec<BookSummary> {
  corpus
    .books()
    .enumerate()
    .map(|(i, (name, book))| BookSummary {
      name:      name.to_owned(),
      testament: testament_at(name, i),
      chapters:  book.chapter_count(),
    })
    .collect()
}

// ─── Chapter stepping ────────────────────────────────────────────────────────

/// `current + 1` if it does not exceed `count`.
pub fn next_chapter(current: u32, count: usize) -> Option<u32> {
  let next = current.checked_add(1)?;
  (next as usize <= count).then_some(next)
}

/// `current - 1` if it is at least 1.
pub fn prev_chapter(current: u32) -> Option<u32> {
  current.checked_sub(1).filter(|&c| c >= 1)
}

/// Step forward one chapter, rolling over into chapter 1 of the next book.
///
/// `None` at the last chapter of the last book, or when `at.book` is unknown.
pub fn advance(books: &[BookSummary], at: &ReadingState) -> Option<ReadingState> {
  let position = books.iter().position(|b| b.name == at.book)?;
  if let Some(chapter) = next_chapter(at.chapter, books[position].chapters) {
    return Some(ReadingState::new(at.book.clone(), chapter));
  }
  let next = books.get(position + 1)?;
  Some(ReadingState::new(next.name.clone(), 1))
}

/// Step back one chapter, rolling into the last chapter of the previous book.
pub fn retreat(books: &[BookSummary], at: &ReadingState) -> Option<ReadingState> {
  let position = books.iter().position(|b| b.name == at.book)?;
  if let Some(chapter) = prev_chapter(at.chapter) {
    return Some(ReadingState::new(at.book.clone(), chapter));
  }
  let prev = books.get(position.checked_sub(1)?)?;
  Some(ReadingState::new(prev.name.clone(), prev.chapters.max(1) as u32))
}
