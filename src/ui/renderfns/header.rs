use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

use crate::ui::view::Shortcut;

/// What the header bar shows besides the view's shortcuts
pub struct HeaderInfo<'a> {
  pub title: &'a str,
  pub api_url: &'a str,
  pub cart_count: usize,
  pub cached_entries: usize,
}

/// Draw the header bar with title, API host, cart and cache counters, and shortcuts
pub fn draw_header(frame: &mut Frame, area: Rect, info: &HeaderInfo, shortcuts: &[Shortcut]) {
  let sep = || Span::styled("│", Style::default().fg(Color::DarkGray));

  let mut spans = vec![
    Span::styled(format!(" {} ", info.title), Style::default().fg(Color::Cyan).bold()),
    sep(),
    Span::styled(
      format!(" {} ", extract_domain(info.api_url)),
      Style::default().fg(Color::White),
    ),
    sep(),
    Span::styled(
      format!(" cart: {} ", info.cart_count),
      Style::default().fg(Color::Yellow).bold(),
    ),
    sep(),
    Span::styled(
      format!(" cached: {} ", info.cached_entries),
      Style::default().fg(Color::DarkGray),
    ),
    Span::raw(" "),
  ];

  for shortcut in shortcuts {
    spans.push(Span::raw("  "));
    spans.push(Span::styled(
      format!("<{}>", shortcut.key),
      Style::default().fg(Color::Cyan),
    ));
    spans.push(Span::styled(
      format!(" {}", shortcut.label),
      Style::default().fg(Color::DarkGray),
    ));
  }

  let paragraph = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::Black));
  frame.render_widget(paragraph, area);
}

/// Host (and port) part of the API URL
fn extract_domain(url: &str) -> &str {
  url
    .strip_prefix("https://")
    .or_else(|| url.strip_prefix("http://"))
    .unwrap_or(url)
    .split('/')
    .next()
    .unwrap_or(url)
}
