//! Book list pane: left panel, grouped by testament.

use ratatui::{
  Frame,
  layout::Rect,
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, List, ListItem, ListState},
};
use selah_core::navigation::Testament;

use super::border_style;
use crate::app::{App, Focus};

/// Render the book list into `area`.
pub fn draw(f: &mut Frame, area: Rect, app: &App) {
  let block = Block::default()
    .title(format!(" Books ({}) ", app.books.len()))
    .borders(Borders::ALL)
    .border_style(border_style(app.focus == Focus::Books));

  // A heading row is inserted whenever the testament changes, so the cursor
  // index has to be shifted to match.
  let mut items: Vec<ListItem> = Vec::with_capacity(app.books.len() + 2);
  let mut selected = None;
  let mut last = None;
  for (i, book) in app.books.iter().enumerate() {
    if last != Some(book.testament) {
      let heading = match book.testament {
        Testament::Old => "Old Testament",
        Testament::New => "New Testament",
      };
      items.push(ListItem::new(Line::from(Span::styled(
        heading,
        Style::default()
          .fg(Color::Yellow)
          .add_modifier(Modifier::BOLD),
      ))));
      last = Some(book.testament);
    }
    if i == app.book_cursor {
      selected = Some(items.len());
    }

    let is_current = app.reader.position().is_some_and(|p| p.book == book.name);
    let marker = if is_current { "▸ " } else { "  " };
    items.push(ListItem::new(Line::from(vec![
      Span::raw(marker),
      Span::raw(book.name.clone()),
      Span::styled(
        format!("  {}", book.chapters),
        Style::default().fg(Color::DarkGray),
      ),
    ])));
  }

  let mut state = ListState::default();
  state.select(selected);

  f.render_stateful_widget(
    List::new(items)
      .block(block)
      .highlight_style(
        Style::default()
          .bg(Color::Blue)
          .fg(Color::White)
          .add_modifier(Modifier::BOLD),
      ),
    area,
    &mut state,
  );
}
