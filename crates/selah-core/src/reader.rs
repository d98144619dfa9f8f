//! The reader state machine shared by every client view.
//!
//! ```text
//! Idle ──navigate──▶ LoadingVerses ──loaded──▶ Ready ──select──▶ CommentaryLoading
//!                         │                     ▲                      │
//!                       failed                close               loaded / failed
//!                         ▼                     │                      ▼
//!                       Error ◀─────────────────┴──── CommentaryReady / Error
//! ```
//!
//! Every request is stamped with a [`Ticket`]. A response is applied only if
//! its ticket is still the outstanding one for that request kind; responses to
//! superseded navigation or verse selections are dropped.

use crate::{commentary::CommentaryRecord, corpus::Verse, session::ReadingState};

/// Generation stamp of one outstanding request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ticket(u64);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReaderState {
  Idle,
  LoadingVerses,
  Ready,
  CommentaryLoading { verse: Verse },
  CommentaryReady { verse: Verse, record: CommentaryRecord },
  Error { message: String },
}

#[derive(Debug)]
pub struct Reader {
  state:             ReaderState,
  position:          Option<ReadingState>,
  verses:            Vec<Verse>,
  verses_loaded:     bool,
  generation:        u64,
  verses_ticket:     Option<Ticket>,
  commentary_ticket: Option<Ticket>,
}

impl Default for Reader {
  fn default() -> Self {
    Self::new()
  }
}

impl Reader {
  pub fn new() -> Self {
    Self {
      state:             ReaderState::Idle,
      position:          None,
      verses:            Vec::new(),
      verses_loaded:     false,
      generation:        0,
      verses_ticket:     None,
      commentary_ticket: None,
    }
  }

  pub fn state(&self) -> &ReaderState {
    &self.state
  }

  pub fn position(&self) -> Option<&ReadingState> {
    self.position.as_ref()
  }

  /// Verses of the current chapter; empty until loaded.
  pub fn verses(&self) -> &[Verse] {
    &self.verses
  }

  fn issue(&mut self) -> Ticket {
    self.generation += 1;
    Ticket(self.generation)
  }

  // ── Navigation ────────────────────────────────────────────────────────────

  /// Move to `to` and start loading its verses.
  ///
  /// Any outstanding verse or commentary request is superseded.
  pub fn navigate(&mut self, to: ReadingState) -> Ticket {
    let ticket = self.issue();
    self.position = Some(to);
    self.verses.clear();
    self.verses_loaded = false;
    self.verses_ticket = Some(ticket);
    self.commentary_ticket = None;
    self.state = ReaderState::LoadingVerses;
    ticket
  }

  /// Apply a verse response. Returns `false` if the ticket was stale.
  pub fn verses_loaded(&mut self, ticket: Ticket, verses: Vec<Verse>) -> bool {
    if self.verses_ticket != Some(ticket) {
      return false;
    }
    self.verses_ticket = None;
    self.verses = verses;
    self.verses_loaded = true;
    self.state = ReaderState::Ready;
    true
  }

  /// Apply a verse failure. Returns `false` if the ticket was stale.
  pub fn verses_failed(&mut self, ticket: Ticket, message: impl Into<String>) -> bool {
    if self.verses_ticket != Some(ticket) {
      return false;
    }
    self.verses_ticket = None;
    self.state = ReaderState::Error { message: message.into() };
    true
  }

  // ── Commentary ────────────────────────────────────────────────────────────

  /// Select verse `number` and start loading its commentary.
  ///
  /// `None` while verses are not loaded or when the chapter has no such verse.
  pub fn request_commentary(&mut self, number: u32) -> Option<(Ticket, Verse)> {
    if !self.verses_loaded {
      return None;
    }
    let verse = self.verses.iter().find(|v| v.verse == number)?.clone();
    let ticket = self.issue();
    self.commentary_ticket = Some(ticket);
    self.state = ReaderState::CommentaryLoading { verse: verse.clone() };
    Some((ticket, verse))
  }

  /// Apply a commentary response. Returns `false` if the ticket was stale.
  pub fn commentary_loaded(&mut self, ticket: Ticket, record: CommentaryRecord) -> bool {
    if self.commentary_ticket != Some(ticket) {
      return false;
    }
    let ReaderState::CommentaryLoading { verse } = &self.state else {
      return false;
    };
    let verse = verse.clone();
    self.state = ReaderState::CommentaryReady { verse, record };
    self.commentary_ticket = None;
    true
  }

  /// Apply a commentary failure. Returns `false` if the ticket was stale.
  pub fn commentary_failed(&mut self, ticket: Ticket, message: impl Into<String>) -> bool {
    if self.commentary_ticket != Some(ticket) {
      return false;
    }
    self.commentary_ticket = None;
    self.state = ReaderState::Error { message: message.into() };
    true
  }

  /// Dismiss the commentary pane (or a commentary error) and return to
  /// `Ready`. Any in-flight commentary is dropped when it arrives.
  pub fn close_commentary(&mut self) {
    if !self.verses_loaded {
      return;
    }
    self.commentary_ticket = None;
    self.state = ReaderState::Ready;
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn verse(n: u32, text: &str) -> Verse {
    Verse { book: "John".into(), chapter: 1, verse: n, text: text.into() }
  }

  fn ready_reader() -> Reader {
    let mut r = Reader::new();
    let t = r.navigate(ReadingState::new("John", 1));
    assert!(r.verses_loaded(t, vec![verse(1, "In the beginning was the Word"), verse(2, "The same was in the beginning")]));
    r
  }

  #[test]
  fn starts_idle() {
    let r = Reader::new();
    assert_eq!(r.state(), &ReaderState::Idle);
    assert!(r.position().is_none());
  }

  #[test]
  fn stale_verse_response_is_discarded() {
    let mut r = Reader::new();
    let first = r.navigate(ReadingState::new("John", 1));
    let second = r.navigate(ReadingState::new("John", 2));

    assert!(!r.verses_loaded(first, vec![verse(1, "stale")]));
    assert_eq!(r.state(), &ReaderState::LoadingVerses);
    assert!(r.verses().is_empty());

    assert!(r.verses_loaded(second, vec![verse(1, "fresh")]));
    assert_eq!(r.state(), &ReaderState::Ready);
    assert_eq!(r.position().unwrap().chapter, 2);
  }

  #[test]
  fn commentary_round_trip() {
    let mut r = ready_reader();
    let (t, v) = r.request_commentary(2).unwrap();
    assert_eq!(v.verse, 2);
    assert!(matches!(r.state(), ReaderState::CommentaryLoading { .. }));

    let record = CommentaryRecord::new(v.text.clone(), "## The Word");
    assert!(r.commentary_loaded(t, record.clone()));
    assert_eq!(r.state(), &ReaderState::CommentaryReady { verse: v, record });

    r.close_commentary();
    assert_eq!(r.state(), &ReaderState::Ready);
  }

  #[test]
  fn commentary_for_superseded_selection_is_discarded() {
    let mut r = ready_reader();
    let (old, _) = r.request_commentary(1).unwrap();
    let (new, _) = r.request_commentary(2).unwrap();
    assert!(!r.commentary_loaded(old, CommentaryRecord::new("x", "y")));
    assert!(r.commentary_loaded(new, CommentaryRecord::new("x", "y")));
  }

  #[test]
  fn navigation_drops_in_flight_commentary() {
    let mut r = ready_reader();
    let (t, _) = r.request_commentary(1).unwrap();
    r.navigate(ReadingState::new("John", 2));
    assert!(!r.commentary_loaded(t, CommentaryRecord::new("x", "y")));
    assert!(!r.commentary_failed(t, "boom"));
    assert_eq!(r.state(), &ReaderState::LoadingVerses);
  }

  #[test]
  fn commentary_unavailable_until_verses_load() {
    let mut r = Reader::new();
    r.navigate(ReadingState::new("John", 1));
    assert!(r.request_commentary(1).is_none());
    let mut r = ready_reader();
    assert!(r.request_commentary(99).is_none());
  }

  #[test]
  fn failures_enter_error_state() {
    let mut r = Reader::new();
    let t = r.navigate(ReadingState::new("Tobit", 1));
    assert!(r.verses_failed(t, "not found"));
    assert_eq!(r.state(), &ReaderState::Error { message: "not found".into() });
    r.close_commentary();
    assert!(matches!(r.state(), ReaderState::Error { .. }));

    let mut r = ready_reader();
    let (t, _) = r.request_commentary(1).unwrap();
    assert!(r.commentary_failed(t, "upstream"));
    r.close_commentary();
    assert_eq!(r.state(), &ReaderState::Ready);
  }
}
