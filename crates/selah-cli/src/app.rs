//! Application state and event dispatcher.
//!
//! Network and storage work runs in spawned tasks that report back over an
//! mpsc channel as [`Message`]s. The [`Reader`] decides whether a reply is
//! still wanted. Reading-position saves go through the ordered
//! [`SessionWriter`].

use std::sync::Arc;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use selah_core::{
  commentary::{CommentaryCache as _, CommentaryRecord, VerseId, cached_commentary},
  corpus::Verse,
  navigation::{self, BookSummary},
  reader::{Reader, ReaderState, Ticket},
  session::{ReadingState, SessionStore as _},
};
use selah_store_sqlite::SqliteStore;
use tokio::sync::mpsc::UnboundedSender;

use crate::{client::ApiClient, session::SessionWriter};

// ─── Focus ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
  /// Book list on the left.
  Books,
  /// Verse list of the current chapter.
  Verses,
}

// ─── Messages ─────────────────────────────────────────────────────────────────

/// Completion of a spawned request.
#[derive(Debug)]
pub enum Message {
  Verses {
    ticket: Ticket,
    result: Result<Vec<Verse>, String>,
  },
  Commentary {
    ticket: Ticket,
    result: Result<CommentaryRecord, String>,
  },
}

// ─── App ──────────────────────────────────────────────────────────────────────

/// Top-level application state.
pub struct App {
  /// Position, loaded verses and commentary lifecycle.
  pub reader: Reader,

  /// Structural snapshot of the corpus, fetched once on startup.
  pub books: Vec<BookSummary>,

  /// Current keyboard focus.
  pub focus: Focus,

  pub book_cursor:  usize,
  pub verse_cursor: usize,

  /// Scroll offset within the commentary pane.
  pub commentary_scroll: u16,

  /// Digits typed after `:` while jumping to a chapter.
  pub chapter_input: Option<String>,

  /// One-line status message shown in the status bar.
  pub status_msg: String,

  client:  Arc<ApiClient>,
  store:   SqliteStore,
  session: SessionWriter,
  tx:      UnboundedSender<Message>,
}

impl App {
  pub fn new(client: ApiClient, store: SqliteStore, tx: UnboundedSender<Message>) -> Self {
    Self {
      reader: Reader::new(),
      books: Vec::new(),
      focus: Focus::Verses,
      book_cursor: 0,
      verse_cursor: 0,
      commentary_scroll: 0,
      chapter_input: None,
      status_msg: String::new(),
      client: Arc::new(client),
      session: SessionWriter::spawn(store.clone()),
      store,
      tx,
    }
  }

  // ── Startup ───────────────────────────────────────────────────────────────

  /// Fetch the book list from the API.
  pub async fn load_books(&mut self) -> anyhow::Result<()> {
    self.status_msg = "Loading books…".into();
    match self.client.books().await {
      Ok(books) => {
        self.books = books;
        self.status_msg = String::new();
        Ok(())
      }
      Err(e) => {
        self.status_msg = format!("Error: {e}");
        Err(e)
      }
    }
  }

  /// Reopen the last saved position, or chapter 1 of the first book.
  pub async fn restore_session(&mut self) {
    let saved = match self.store.load_reading_state().await {
      Ok(saved) => saved,
      Err(e) => {
        tracing::warn!("failed to load reading state: {e}");
        None
      }
    };
    match resolve_start(&self.books, saved) {
      Some(start) => {
        self.navigate(start);
      }
      None => self.status_msg = "The corpus has no books.".into(),
    }
  }

  /// Persist the current position, including the verse cursor, and wait for
  /// every queued save to land.
  pub async fn save_session(&self) {
    if let Some(state) = self.current_state() {
      self.session.save(state);
    }
    self.session.flush().await;
  }

  fn current_state(&self) -> Option<ReadingState> {
    let mut state = self.reader.position()?.clone();
    state.scroll_position = self.verse_cursor;
    Some(state)
  }

  // ── Requests ──────────────────────────────────────────────────────────────

  /// Move to `to`, fetch its verses and record it as the reading position.
  pub fn navigate(&mut self, to: ReadingState) -> Ticket {
    if let Some(i) = self.books.iter().position(|b| b.name == to.book) {
      self.book_cursor = i;
    }
    let ticket = self.reader.navigate(to.clone());
    self.verse_cursor = 0;
    self.commentary_scroll = 0;
    self.status_msg = String::new();

    let client = Arc::clone(&self.client);
    let tx = self.tx.clone();
    let (book, chapter) = (to.book.clone(), to.chapter);
    tokio::spawn(async move {
      let result = client.verses(&book, chapter).await.map_err(|e| e.to_string());
      let _ = tx.send(Message::Verses { ticket, result });
    });

    self.session.save(to);
    ticket
  }

  /// Open the commentary pane for the verse under the cursor.
  ///
  /// Served from the local cache when the cached record matches the verse
  /// text; otherwise generated and cached.
  pub fn open_commentary(&mut self) -> Option<Ticket> {
    let number = self.reader.verses().get(self.verse_cursor)?.verse;
    let (ticket, verse) = self.reader.request_commentary(number)?;
    self.commentary_scroll = 0;

    let client = Arc::clone(&self.client);
    let store = self.store.clone();
    let tx = self.tx.clone();
    tokio::spawn(async move {
      let result = fetch_commentary(&client, &store, &verse).await;
      let _ = tx.send(Message::Commentary { ticket, result });
    });
    Some(ticket)
  }

  /// Apply a completed request. Stale replies are dropped.
  pub fn apply(&mut self, msg: Message) {
    match msg {
      Message::Verses { ticket, result: Ok(verses) } => {
        if self.reader.verses_loaded(ticket, verses) {
          let restored = self.reader.position().map_or(0, |p| p.scroll_position);
          let last = self.reader.verses().len().saturating_sub(1);
          self.verse_cursor = restored.min(last);
        }
      }
      Message::Verses { ticket, result: Err(e) } => {
        if self.reader.verses_failed(ticket, e.clone()) {
          self.status_msg = format!("Error: {e}");
        }
      }
      Message::Commentary { ticket, result: Ok(record) } => {
        self.reader.commentary_loaded(ticket, record);
      }
      Message::Commentary { ticket, result: Err(e) } => {
        if self.reader.commentary_failed(ticket, e.clone()) {
          self.status_msg = format!("Error: {e}");
        }
      }
    }
  }

  // ── Key handling ──────────────────────────────────────────────────────────

  /// Process a key event. Returns `true` to continue, `false` to quit.
  pub fn handle_key(&mut self, key: KeyEvent) -> bool {
    // Global: Ctrl-C quits from anywhere.
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
      return false;
    }

    if self.chapter_input.is_some() {
      self.handle_chapter_key(key);
      return true;
    }

    if self.commentary_open() {
      return self.handle_commentary_key(key);
    }

    match self.focus {
      Focus::Books => self.handle_books_key(key),
      Focus::Verses => self.handle_verses_key(key),
    }
  }

  /// Whether the commentary pane (or a commentary error) covers the verses.
  pub fn commentary_open(&self) -> bool {
    match self.reader.state() {
      ReaderState::CommentaryLoading { .. } | ReaderState::CommentaryReady { .. } => true,
      ReaderState::Error { .. } => !self.reader.verses().is_empty(),
      _ => false,
    }
  }

  fn handle_chapter_key(&mut self, key: KeyEvent) {
    let Some(input) = self.chapter_input.as_mut() else {
      return;
    };
    match key.code {
      KeyCode::Esc => self.chapter_input = None,
      KeyCode::Backspace => {
        input.pop();
      }
      KeyCode::Char(c) if c.is_ascii_digit() && input.len() < 3 => input.push(c),
      KeyCode::Enter => {
        let typed = self.chapter_input.take().unwrap_or_default();
        self.jump_to_chapter(&typed);
      }
      _ => {}
    }
  }

  fn jump_to_chapter(&mut self, typed: &str) {
    let Some(book) = self.reader.position().map(|p| p.book.clone()) else {
      return;
    };
    let count = self
      .books
      .iter()
      .find(|b| b.name == book)
      .map_or(0, |b| b.chapters);
    match typed.parse::<u32>() {
      Ok(n) if n >= 1 && n as usize <= count => {
        self.navigate(ReadingState::new(book, n));
      }
      _ => self.status_msg = format!("{book} has chapters 1–{count}"),
    }
  }

  fn handle_commentary_key(&mut self, key: KeyEvent) -> bool {
    match key.code {
      KeyCode::Char('q') => return false,
      KeyCode::Esc | KeyCode::Left | KeyCode::Char('h') => {
        self.reader.close_commentary();
        self.status_msg = String::new();
      }
      KeyCode::Down | KeyCode::Char('j') => {
        self.commentary_scroll = self.commentary_scroll.saturating_add(1);
      }
      KeyCode::Up | KeyCode::Char('k') => {
        self.commentary_scroll = self.commentary_scroll.saturating_sub(1);
      }
      _ => {}
    }
    true
  }

  fn handle_books_key(&mut self, key: KeyEvent) -> bool {
    match key.code {
      KeyCode::Char('q') => return false,

      KeyCode::Down | KeyCode::Char('j') => {
        if self.book_cursor + 1 < self.books.len() {
          self.book_cursor += 1;
        }
      }
      KeyCode::Up | KeyCode::Char('k') => {
        self.book_cursor = self.book_cursor.saturating_sub(1);
      }

      // Open chapter 1 of the highlighted book.
      KeyCode::Enter | KeyCode::Right | KeyCode::Char('l') => {
        if let Some(book) = self.books.get(self.book_cursor) {
          let to = ReadingState::new(book.name.clone(), 1);
          self.navigate(to);
          self.focus = Focus::Verses;
        }
      }

      KeyCode::Tab => self.focus = Focus::Verses,
      _ => {}
    }
    true
  }

  fn handle_verses_key(&mut self, key: KeyEvent) -> bool {
    match key.code {
      KeyCode::Char('q') => return false,

      KeyCode::Down | KeyCode::Char('j') => {
        if self.verse_cursor + 1 < self.reader.verses().len() {
          self.verse_cursor += 1;
        }
      }
      KeyCode::Up | KeyCode::Char('k') => {
        self.verse_cursor = self.verse_cursor.saturating_sub(1);
      }

      KeyCode::Enter => {
        self.open_commentary();
      }

      // Chapter stepping rolls over book boundaries.
      KeyCode::Char('n') | KeyCode::Char(']') => self.step(navigation::advance),
      KeyCode::Char('p') | KeyCode::Char('[') => self.step(navigation::retreat),

      KeyCode::Char(':') => {
        if self.reader.position().is_some() {
          self.chapter_input = Some(String::new());
        }
      }

      // Retry the current chapter.
      KeyCode::Char('r') => {
        if let Some(at) = self.reader.position().cloned() {
          self.navigate(at);
        }
      }

      KeyCode::Tab | KeyCode::Left | KeyCode::Char('h') => self.focus = Focus::Books,
      _ => {}
    }
    true
  }

  fn step(&mut self, f: fn(&[BookSummary], &ReadingState) -> Option<ReadingState>) {
    let Some(at) = self.reader.position() else {
      return;
    };
    match f(&self.books, at) {
      Some(to) => {
        self.navigate(to);
      }
      None => self.status_msg = "No further chapters".into(),
    }
  }
}

/// The saved position if it still exists in `books`, otherwise chapter 1 of
/// the first book.
pub fn resolve_start(books: &[BookSummary], saved: Option<ReadingState>) -> Option<ReadingState> {
  let valid = |s: &ReadingState| {
    books
      .iter()
      .any(|b| b.name == s.book && s.chapter >= 1 && s.chapter as usize <= b.chapters)
  };
  saved
    .filter(valid)
    .or_else(|| books.first().map(|b| ReadingState::new(b.name.clone(), 1)))
}

/// Cache lookup, then generation and caching on a miss.
///
/// Cache failures are logged and fall through to generation; only a failed
/// generation is reported.
async fn fetch_commentary(
  client: &ApiClient,
  store: &SqliteStore,
  verse: &Verse,
) -> Result<CommentaryRecord, String> {
  let id = VerseId::from(verse);
  match cached_commentary(store, &id, &verse.text).await {
    Ok(Some(record)) => {
      tracing::debug!(verse = %id, "commentary cache hit");
      return Ok(record);
    }
    Ok(None) => {}
    Err(e) => tracing::warn!(verse = %id, "commentary cache read failed: {e}"),
  }

  let text = client.commentary(&verse.text).await.map_err(|e| e.to_string())?;
  let record = CommentaryRecord::new(verse.text.clone(), text);
  if let Err(e) = store.put(&id, record.clone()).await {
    tracing::warn!(verse = %id, "commentary cache write failed: {e}");
  }
  Ok(record)
}
