//! Markdown → styled terminal lines for the commentary pane.
//!
//! Walks the `pulldown-cmark` event stream and keeps a style stack, so nested
//! emphasis inside headings or list items composes.

use std::mem;

use pulldown_cmark::{Event, HeadingLevel, Parser as MdParser, Tag};
use ratatui::{
  style::{Color, Modifier, Style},
  text::{Line, Span},
};

/// Render `src` into lines ready for a [`ratatui::widgets::Paragraph`].
pub fn render(src: &str) -> Vec<Line<'static>> {
  let mut r = Renderer::default();
  for event in MdParser::new(src) {
    r.event(event);
  }
  r.flush();
  r.lines
}

#[derive(Default)]
struct Renderer {
  lines:  Vec<Line<'static>>,
  spans:  Vec<Span<'static>>,
  styles: Vec<Style>,
  /// One entry per open list; `Some(n)` is the next number of an ordered list.
  lists:  Vec<Option<u64>>,
}

fn heading_style(level: HeadingLevel) -> Style {
  let style = Style::default()
    .fg(Color::Cyan)
    .add_modifier(Modifier::BOLD);
  match level {
    HeadingLevel::H1 => style.add_modifier(Modifier::UNDERLINED),
    _ => style,
  }
}

fn code_style() -> Style {
  Style::default().fg(Color::Yellow)
}

impl Renderer {
  fn style(&self) -> Style {
    self.styles.last().copied().unwrap_or_default()
  }

  fn push_style(&mut self, f: impl FnOnce(Style) -> Style) {
    let next = f(self.style());
    self.styles.push(next);
  }

  fn flush(&mut self) {
    if !self.spans.is_empty() {
      self.lines.push(Line::from(mem::take(&mut self.spans)));
    }
  }

  /// End the current line and leave one blank line before the next block.
  fn block_gap(&mut self) {
    self.flush();
    if self.lines.last().is_some_and(|l| l.width() > 0) {
      self.lines.push(Line::from(""));
    }
  }

  fn push_text(&mut self, text: &str) {
    let style = self.style();
    for (i, part) in text.split('\n').enumerate() {
      if i > 0 {
        self.flush();
      }
      if !part.is_empty() {
        self.spans.push(Span::styled(part.to_string(), style));
      }
    }
  }

  fn event(&mut self, event: Event<'_>) {
    match event {
      Event::Start(tag) => self.start(tag),
      Event::End(tag) => self.end(tag),
      Event::Text(text) => self.push_text(&text),
      Event::Code(code) => {
        let style = self.style().patch(code_style());
        self.spans.push(Span::styled(code.to_string(), style));
      }
      Event::SoftBreak => self.push_text(" "),
      Event::HardBreak => self.flush(),
      Event::Rule => {
        self.block_gap();
        self.lines.push(Line::from(Span::styled(
          "─".repeat(24),
          Style::default().fg(Color::DarkGray),
        )));
      }
      _ => {}
    }
  }

  fn start(&mut self, tag: Tag<'_>) {
    match tag {
      Tag::Heading(level, _, _) => {
        self.block_gap();
        self.styles.push(heading_style(level));
      }
      Tag::Paragraph => {
        if self.lists.is_empty() {
          self.block_gap();
        }
      }
      Tag::List(first) => {
        if self.lists.is_empty() {
          self.block_gap();
        } else {
          self.flush();
        }
        self.lists.push(first);
      }
      Tag::Item => {
        self.flush();
        let indent = "  ".repeat(self.lists.len().saturating_sub(1));
        let marker = match self.lists.last_mut() {
          Some(Some(n)) => {
            let marker = format!("{n}. ");
            *n += 1;
            marker
          }
          _ => "• ".to_string(),
        };
        self.spans.push(Span::styled(
          format!("{indent}{marker}"),
          Style::default().fg(Color::Cyan),
        ));
      }
      Tag::Emphasis => self.push_style(|s| s.add_modifier(Modifier::ITALIC)),
      Tag::Strong => self.push_style(|s| s.add_modifier(Modifier::BOLD)),
      Tag::BlockQuote => {
        self.block_gap();
        self.push_style(|s| s.fg(Color::Gray).add_modifier(Modifier::ITALIC));
      }
      Tag::CodeBlock(_) => {
        self.block_gap();
        self.styles.push(code_style());
      }
      _ => {}
    }
  }

  fn end(&mut self, tag: Tag<'_>) {
    match tag {
      Tag::Heading(..) | Tag::BlockQuote | Tag::CodeBlock(_) => {
        self.flush();
        self.styles.pop();
      }
      Tag::Paragraph | Tag::Item => self.flush(),
      Tag::List(_) => {
        self.flush();
        self.lists.pop();
      }
      Tag::Emphasis | Tag::Strong => {
        self.styles.pop();
      }
      _ => {}
    }
  }
}
