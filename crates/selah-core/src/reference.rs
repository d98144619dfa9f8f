//! Verse references (`"Exodus 3:14"`) and corpus construction from
//! spreadsheet rows.

use std::{collections::HashSet, fmt, str::FromStr};

use crate::corpus::{Corpus, MAX_VERSE};

/// A parsed `"<Book> <chapter>:<verse>"` reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
  pub book:    String,
  pub chapter: u32,
  pub verse:   u32,
}

impl FromStr for Reference {
  type Err = ();

  /// The book is everything before the last whitespace; what follows must be
  /// `<digits>:<digits>` and nothing else.
  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let (book, location) = s.rsplit_once(char::is_whitespace).ok_or(())?;
    let (chapter, verse) = location.split_once(':').ok_or(())?;
    if book.is_empty() || !is_digits(chapter) || !is_digits(verse) {
      return Err(());
    }
    Ok(Self {
      book:    book.to_owned(),
      chapter: chapter.parse().map_err(|_| ())?,
      verse:   verse.parse().map_err(|_| ())?,
    })
  }
}

impl fmt::Display for Reference {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{} {}:{}", self.book, self.chapter, self.verse)
  }
}

fn is_digits(s: &str) -> bool {
  !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

/// Parse a trimmed reference string; `None` if it does not match.
pub fn parse_reference(s: &str) -> Option<Reference> {
  s.trim().parse().ok()
}

// ─── Builder ─────────────────────────────────────────────────────────────────

/// Counts reported after a conversion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConversionSummary {
  pub books:    usize,
  pub chapters: usize,
  pub verses:   usize,
  pub skipped:  usize,
}

/// Accumulates spreadsheet rows into a [`Corpus`].
///
/// Books appear in the order they are first seen. Later rows for the same
/// reference overwrite earlier ones.
#[derive(Debug, Default)]
pub struct CorpusBuilder {
  corpus:   Corpus,
  chapters: HashSet<(String, u32)>,
  verses:   usize,
  skipped:  usize,
}

impl CorpusBuilder {
  pub fn new() -> Self {
    Self::default()
  }

  /// Insert `text` at `reference`. Returns `false` if the chapter or verse
  /// number is out of range.
  pub fn insert(&mut self, reference: &Reference, text: &str) -> bool {
    if reference.chapter == 0 || reference.verse == 0 || reference.verse > MAX_VERSE {
      self.skipped += 1;
      return false;
    }
    self
      .corpus
      .book_entry(&reference.book)
      .chapters
      .entry(reference.chapter)
      .or_default()
      .set(reference.verse, text.trim());
    self.verses += 1;
    self
      .chapters
      .insert((reference.book.clone(), reference.chapter));
    true
  }

  /// Feed one spreadsheet row: `[id, reference, text, ..]`.
  ///
  /// Rows with fewer than three cells, or whose reference does not parse, are
  /// counted as skipped.
  pub fn push_row<S: AsRef<str>>(&mut self, row: &[S]) -> bool {
    let [_, reference, text, ..] = row else {
      self.skipped += 1;
      return false;
    };
    match parse_reference(reference.as_ref()) {
      Some(r) => self.insert(&r, text.as_ref()),
      None => {
        tracing::debug!(reference = reference.as_ref(), "skipping unparseable row");
        self.skipped += 1;
        false
      }
    }
  }

  pub fn finish(self) -> (Corpus, ConversionSummary) {
    let summary = ConversionSummary {
      books:    self.corpus.len(),
      chapters: self.chapters.len(),
      verses:   self.verses,
      skipped:  self.skipped,
    };
    (self.corpus, summary)
  }
}

/// Convert a tab-separated spreadsheet export. The first line is a header.
///
/// Fields follow spreadsheet quoting: a quoted field may contain tabs,
/// newlines and doubled `""` quotes.
pub fn convert_tsv(input: &str) -> (Corpus, ConversionSummary) {
  let mut reader = csv::ReaderBuilder::new()
    .delimiter(b'\t')
    .has_headers(true)
    .flexible(true)
    .from_reader(input.as_bytes());

  let mut builder = CorpusBuilder::new();
  for record in reader.records() {
    match record {
      Ok(record) => {
        let cells: Vec<&str> = record.iter().collect();
        if cells.iter().all(|c| c.trim().is_empty()) {
          continue;
        }
        builder.push_row(&cells);
      }
      Err(e) => {
        tracing::debug!("skipping unreadable row: {e}");
        builder.skipped += 1;
      }
    }
  }
  builder.finish()
}
