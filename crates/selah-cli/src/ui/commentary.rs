//! Commentary pane: replaces the verse pane while open.

use ratatui::{
  Frame,
  layout::Rect,
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, Paragraph, Wrap},
};
use selah_core::reader::ReaderState;

use super::markdown;
use crate::app::App;

/// Render the commentary for the selected verse into `area`.
pub fn draw(f: &mut Frame, area: Rect, app: &App) {
  let (title, lines) = match app.reader.state() {
    ReaderState::CommentaryLoading { verse } => (
      format!(" {} {}:{} ", verse.book, verse.chapter, verse.verse),
      vec![
        quote(&verse.text),
        Line::from(""),
        Line::from(Span::styled(
          "Generating commentary…",
          Style::default().fg(Color::DarkGray),
        )),
      ],
    ),
    ReaderState::CommentaryReady { verse, record } => {
      let mut lines = vec![quote(&verse.text), Line::from("")];
      lines.extend(markdown::render(&record.commentary_text));
      lines.push(Line::from(""));
      lines.push(Line::from(Span::styled(
        format!(
          "generated {}",
          record.generated_at.with_timezone(&chrono::Local).format("%Y-%m-%d %H:%M")
        ),
        Style::default().fg(Color::DarkGray),
      )));
      (format!(" {} {}:{} ", verse.book, verse.chapter, verse.verse), lines)
    }
    ReaderState::Error { message } => (
      " Commentary ".to_string(),
      vec![Line::from(Span::styled(
        message.clone(),
        Style::default().fg(Color::Red),
      ))],
    ),
    _ => (" Commentary ".to_string(), Vec::new()),
  };

  let block = Block::default()
    .title(title)
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::Cyan));

  f.render_widget(
    Paragraph::new(lines)
      .block(block)
      .wrap(Wrap { trim: false })
      .scroll((app.commentary_scroll, 0)),
    area,
  );
}

fn quote(text: &str) -> Line<'static> {
  Line::from(Span::styled(
    text.to_string(),
    Style::default()
      .fg(Color::White)
      .add_modifier(Modifier::ITALIC),
  ))
}
