//! Verse pane: the current chapter.

use ratatui::{
  Frame,
  layout::Rect,
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
};
use selah_core::reader::ReaderState;
use unicode_width::UnicodeWidthStr;

use super::border_style;
use crate::app::{App, Focus};

/// Render the verse list into `area`.
pub fn draw(f: &mut Frame, area: Rect, app: &App) {
  let title = app
    .reader
    .position()
    .map(|p| format!(" {} {} ", p.book, p.chapter))
    .unwrap_or_else(|| " Verses ".to_string());

  let block = Block::default()
    .title(title)
    .borders(Borders::ALL)
    .border_style(border_style(app.focus == Focus::Verses));

  let placeholder = match app.reader.state() {
    ReaderState::Idle => Some(("Nothing to read yet.", Color::DarkGray)),
    ReaderState::LoadingVerses => Some(("Loading…", Color::DarkGray)),
    ReaderState::Error { message } if app.reader.verses().is_empty() => {
      Some((message.as_str(), Color::Red))
    }
    _ => None,
  };
  if let Some((text, color)) = placeholder {
    let inner = block.inner(area);
    f.render_widget(block, area);
    f.render_widget(
      Paragraph::new(text)
        .style(Style::default().fg(color))
        .wrap(Wrap { trim: true }),
      inner,
    );
    return;
  }

  // Each verse wraps within the pane width, minus the number gutter.
  let width = area.width.saturating_sub(2 + 5).max(10) as usize;
  let items: Vec<ListItem> = app
    .reader
    .verses()
    .iter()
    .map(|v| {
      let mut lines = Vec::new();
      for (n, chunk) in wrap(&v.text, width).into_iter().enumerate() {
        let gutter = if n == 0 {
          Span::styled(
            format!("{:>4} ", v.verse),
            Style::default()
              .fg(Color::Cyan)
              .add_modifier(Modifier::BOLD),
          )
        } else {
          Span::raw("     ")
        };
        lines.push(Line::from(vec![gutter, Span::raw(chunk)]));
      }
      ListItem::new(lines)
    })
    .collect();

  let mut state = ListState::default();
  state.select((!items.is_empty()).then_some(app.verse_cursor));

  f.render_stateful_widget(
    List::new(items)
      .block(block)
      .highlight_style(Style::default().bg(Color::Rgb(40, 44, 52))),
    area,
    &mut state,
  );
}

/// Greedy word wrap. Words longer than `width` get a line of their own.
fn wrap(text: &str, width: usize) -> Vec<String> {
  let mut lines = Vec::new();
  let mut line = String::new();
  for word in text.split_whitespace() {
    if !line.is_empty() && line.width() + 1 + word.width() > width {
      lines.push(std::mem::take(&mut line));
    }
    if !line.is_empty() {
      line.push(' ');
    }
    line.push_str(word);
  }
  if !line.is_empty() || lines.is_empty() {
    lines.push(line);
  }
  lines
}

#[cfg(test)]
mod tests {
  use super::wrap;

  #[test]
  fn wraps_on_word_boundaries() {
    assert_eq!(
      wrap("In the beginning God created the heaven and the earth.", 20),
      ["In the beginning God", "created the heaven", "and the earth."]
    );
    assert_eq!(wrap("", 20), [""]);
    assert_eq!(wrap("Jesus wept.", 4), ["Jesus", "wept."]);
  }

  #[test]
  fn wide_glyphs_count_two_columns() {
    // Each CJK character occupies two terminal cells.
    assert_eq!(wrap("起初 神創造 天地", 11), ["起初 神創造", "天地"]);
    assert_eq!(wrap("起初 神創造 天地", 10), ["起初", "神創造", "天地"]);
  }
}
