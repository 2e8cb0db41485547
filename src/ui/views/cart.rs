use crate::ui::ensure_valid_selection;
use crate::ui::renderfns::{format_price, truncate};
use crate::ui::view::{Shortcut, View, ViewAction};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph};

/// One distinct product in the cart
#[derive(Debug, Clone, PartialEq)]
pub struct CartLine {
  pub id: u64,
  pub name: String,
  pub price: f64,
  pub quantity: usize,
}

impl CartLine {
  pub fn subtotal(&self) -> f64 {
    self.price * self.quantity as f64
  }
}

/// Snapshot of the cart. Removals are mirrored locally and reported to the App.
pub struct CartView {
  lines: Vec<CartLine>,
  list_state: ListState,
}

impl CartView {
  pub fn new(lines: Vec<CartLine>) -> Self {
    Self {
      lines,
      list_state: ListState::default(),
    }
  }

  pub fn total(&self) -> f64 {
    self.lines.iter().map(CartLine::subtotal).sum()
  }

  pub fn item_count(&self) -> usize {
    self.lines.iter().map(|l| l.quantity).sum()
  }

  /// Drop one unit of the selected line, returning its product id
  fn remove_selected(&mut self) -> Option<u64> {
    let idx = self.list_state.selected()?;
    let line = self.lines.get_mut(idx)?;
    let id = line.id;
    line.quantity -= 1;
    if line.quantity == 0 {
      self.lines.remove(idx);
    }
    Some(id)
  }
}

impl View for CartView {
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
    match key.code {
      KeyCode::Char('j') | KeyCode::Down => self.list_state.select_next(),
      KeyCode::Char('k') | KeyCode::Up => self.list_state.select_previous(),
      KeyCode::Char('d') | KeyCode::Delete => {
        if let Some(id) = self.remove_selected() {
          return ViewAction::RemoveFromCart(id);
        }
      }
      KeyCode::Char('C') => {
        self.lines.clear();
        return ViewAction::ClearCart;
      }
      KeyCode::Char('q') | KeyCode::Esc => return ViewAction::Pop,
      _ => {}
    }
    ViewAction::None
  }

  fn render(&mut self, frame: &mut Frame, area: Rect) {
    ensure_valid_selection(&mut self.list_state, self.lines.len());

    let block = Block::default()
      .title(format!(
        " Cart ({} items, {}) ",
        self.item_count(),
        format_price(self.total())
      ))
      .title_alignment(Alignment::Center)
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Blue));

    if self.lines.is_empty() {
      let paragraph = Paragraph::new("The cart is empty. Press 'a' on a product to add it.")
        .block(block)
        .style(Style::default().fg(Color::DarkGray));
      frame.render_widget(paragraph, area);
      return;
    }

    let items: Vec<ListItem> = self
      .lines
      .iter()
      .map(|line| {
        ListItem::new(Line::from(vec![
          Span::styled(format!("{:>3} x ", line.quantity), Style::default().fg(Color::Yellow)),
          Span::raw(format!("{:<48}", truncate(&line.name, 48))),
          Span::styled(
            format!("{:>12}", format_price(line.subtotal())),
            Style::default().fg(Color::Green),
          ),
        ]))
      })
      .collect();

    let list = List::new(items)
      .block(block)
      .highlight_style(
        Style::default()
          .bg(Color::DarkGray)
          .add_modifier(Modifier::BOLD),
      )
      .highlight_symbol("> ");

    frame.render_stateful_widget(list, area, &mut self.list_state);
  }

  fn breadcrumb_label(&self) -> String {
    "Cart".to_string()
  }

  fn shortcuts(&self) -> Vec<Shortcut> {
    vec![
      Shortcut::new("d", "remove one"),
      Shortcut::new("C", "empty"),
      Shortcut::new("q", "back"),
    ]
  }
}
