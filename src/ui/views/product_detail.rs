use std::sync::Arc;

use crate::api::types::Product;
use crate::api::{Catalog, StoreCatalog};
use crate::query::{Query, QueryState};
use crate::ui::renderfns::format_price;
use crate::ui::view::{Shortcut, View, ViewAction};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};

/// Full record of one product. Always fetched from the network.
pub struct ProductDetailView {
  id: u64,
  /// Name from the listing, shown until the record arrives
  name: String,
  query: Query<Product>,
}

impl ProductDetailView {
  pub fn new(id: u64, name: String, catalog: Arc<StoreCatalog>) -> Self {
    let mut query = Query::new(move || {
      let catalog = catalog.clone();
      async move {
        let payload = catalog.get_product(id).await?;
        Product::from_payload(&payload)
      }
    });
    query.fetch();

    Self { id, name, query }
  }

  fn render_detail(&self, frame: &mut Frame, area: Rect) {
    let title = match self.query.state() {
      QueryState::Loading | QueryState::Idle => format!(" #{} {} (loading...) ", self.id, self.name),
      QueryState::Error(e) => format!(" #{} (error: {}) ", self.id, e),
      QueryState::Success(product) => format!(" #{} {} ", product.id, product.name),
    };

    let block = Block::default()
      .title(title)
      .title_alignment(Alignment::Center)
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Blue));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    if let Some(error) = self.query.error() {
      let paragraph = Paragraph::new(format!("Error: {}\n\nPress 'r' to retry.", error))
        .style(Style::default().fg(Color::Red));
      frame.render_widget(paragraph, inner);
      return;
    }

    let product = match self.query.data() {
      Some(product) => product,
      None => {
        let paragraph =
          Paragraph::new("Loading product...").style(Style::default().fg(Color::DarkGray));
        frame.render_widget(paragraph, inner);
        return;
      }
    };

    let label = |text: &'static str| Span::styled(text, Style::default().fg(Color::DarkGray));
    let optional = |value: &Option<String>| value.clone().unwrap_or_else(|| "-".to_string());

    let mut lines = vec![
      Line::from(vec![
        label("Price:       "),
        Span::styled(format_price(product.price), Style::default().fg(Color::Green).bold()),
      ]),
      Line::from(vec![
        label("Brand:       "),
        Span::styled(product.brand.clone(), Style::default().fg(Color::Cyan)),
      ]),
      Line::from(vec![label("Category:    "), Span::raw(product.category.clone())]),
      Line::from(vec![label("Department:  "), Span::raw(optional(&product.department))]),
      Line::from(vec![label("SKU:         "), Span::raw(optional(&product.sku))]),
      Line::from(vec![
        label("Ships from:  "),
        Span::raw(optional(&product.distribution_center)),
      ]),
      Line::from(""),
    ];
    if let Some(description) = &product.description {
      lines.push(Line::from(description.clone()));
    }

    let paragraph = Paragraph::new(lines).wrap(Wrap { trim: true });
    frame.render_widget(paragraph, inner);
  }
}

impl View for ProductDetailView {
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
    match key.code {
      KeyCode::Char('r') => {
        self.query.refetch();
        ViewAction::None
      }
      KeyCode::Char('a') => match self.query.data() {
        Some(product) => ViewAction::AddToCart {
          id: product.id,
          name: product.name.clone(),
          price: product.price,
        },
        None => ViewAction::None,
      },
      KeyCode::Char('q') | KeyCode::Esc => ViewAction::Pop,
      _ => ViewAction::None,
    }
  }

  fn render(&mut self, frame: &mut Frame, area: Rect) {
    self.render_detail(frame, area);
  }

  fn breadcrumb_label(&self) -> String {
    format!("#{}", self.id)
  }

  fn tick(&mut self) {
    self.query.poll();
  }

  fn shortcuts(&self) -> Vec<Shortcut> {
    vec![
      Shortcut::new("a", "add to cart"),
      Shortcut::new("r", "reload"),
      Shortcut::new("q", "back"),
    ]
  }
}
