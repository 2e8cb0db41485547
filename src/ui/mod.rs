pub mod components;
pub mod renderfns;
pub mod view;
pub mod views;

use crate::app::{App, Mode};
use components::draw_input_overlay;
use ratatui::prelude::*;
use ratatui::widgets::{ListState, Paragraph};
use renderfns::{draw_header, HeaderInfo};

/// Keep a list selection inside `0..len`, selecting the first row when
/// nothing is selected and clearing it when the list is empty.
pub fn ensure_valid_selection(state: &mut ListState, len: usize) {
  if len == 0 {
    state.select(None);
    return;
  }
  match state.selected() {
    Some(idx) if idx >= len => state.select(Some(len - 1)),
    None => state.select(Some(0)),
    _ => {}
  }
}

/// Main draw function
pub fn draw(frame: &mut Frame, app: &mut App) {
  let chunks = Layout::default()
    .direction(Direction::Vertical)
    .constraints([
      Constraint::Length(1), // Header
      Constraint::Min(1),    // Current view
      Constraint::Length(1), // Status bar
    ])
    .split(frame.area());

  let shortcuts = app.current_view().map(|v| v.shortcuts()).unwrap_or_default();
  let info = HeaderInfo {
    title: app.title(),
    api_url: app.api_url(),
    cart_count: app.cart().count(),
    cached_entries: app.cached_entries(),
  };
  draw_header(frame, chunks[0], &info, &shortcuts);

  if let Some(view) = app.current_view_mut() {
    view.render(frame, chunks[1]);
  }

  draw_status_bar(frame, chunks[2], app);

  if *app.mode() == Mode::Command {
    let suggestions = app.autocomplete_suggestions();
    draw_input_overlay(
      frame,
      chunks[1],
      "Command",
      ":",
      app.command_input(),
      &suggestions,
      app.selected_suggestion(),
    );
  }
}

fn draw_status_bar(frame: &mut Frame, area: Rect, app: &App) {
  let breadcrumb = app.view_breadcrumb().join(" > ");
  let mut spans = vec![Span::styled(
    format!(" {} ", breadcrumb),
    Style::default().fg(Color::Cyan),
  )];

  match app.notification() {
    Some(message) => spans.push(Span::styled(
      format!(" {}", message),
      Style::default().fg(Color::Yellow),
    )),
    None => spans.push(Span::styled(
      " j/k:nav  Enter:select  q:back  Ctrl-C:quit",
      Style::default().fg(Color::DarkGray),
    )),
  }

  frame.render_widget(Paragraph::new(Line::from(spans)), area);
}
