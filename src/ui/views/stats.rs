use std::sync::Arc;

use crate::api::types::ProductStats;
use crate::api::{Catalog, StoreCatalog};
use crate::query::{Query, QueryState};
use crate::ui::renderfns::format_price;
use crate::ui::view::{Shortcut, View, ViewAction};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph};

/// Catalog-wide figures from the stats endpoint
pub struct StatsView {
  query: Query<ProductStats>,
}

impl StatsView {
  pub fn new(catalog: Arc<StoreCatalog>) -> Self {
    let mut query = Query::new(move || {
      let catalog = catalog.clone();
      async move {
        let payload = catalog.product_stats().await?;
        ProductStats::from_payload(&payload)
      }
    });
    query.fetch();

    Self { query }
  }
}

fn price_or_dash(price: Option<f64>) -> String {
  price.map(format_price).unwrap_or_else(|| "-".to_string())
}

fn stat_line(label: &'static str, value: String) -> Line<'static> {
  Line::from(vec![
    Span::styled(format!("{:<20}", label), Style::default().fg(Color::DarkGray)),
    Span::styled(value, Style::default().fg(Color::Yellow)),
  ])
}

impl View for StatsView {
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
    match key.code {
      KeyCode::Char('r') => {
        self.query.refetch();
        ViewAction::None
      }
      KeyCode::Char('q') | KeyCode::Esc => ViewAction::Pop,
      _ => ViewAction::None,
    }
  }

  fn render(&mut self, frame: &mut Frame, area: Rect) {
    let block = Block::default()
      .title(" Catalog stats ")
      .title_alignment(Alignment::Center)
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Blue));

    let paragraph = match self.query.state() {
      QueryState::Idle | QueryState::Loading => {
        Paragraph::new("Loading...").style(Style::default().fg(Color::DarkGray))
      }
      QueryState::Error(e) => Paragraph::new(format!("Error: {}\n\nPress 'r' to retry.", e))
        .style(Style::default().fg(Color::Red)),
      QueryState::Success(stats) => Paragraph::new(vec![
        stat_line("Products", stats.total_products.to_string()),
        stat_line("Categories", stats.unique_categories.to_string()),
        stat_line("Brands", stats.unique_brands.to_string()),
        stat_line("Departments", stats.departments.to_string()),
        stat_line("Men / Women", format!("{} / {}", stats.men_products, stats.women_products)),
        Line::from(""),
        stat_line("Average price", price_or_dash(stats.avg_price)),
        stat_line("Cheapest", price_or_dash(stats.min_price)),
        stat_line("Most expensive", price_or_dash(stats.max_price)),
      ]),
    };

    frame.render_widget(paragraph.block(block), area);
  }

  fn breadcrumb_label(&self) -> String {
    "Stats".to_string()
  }

  fn tick(&mut self) {
    self.query.poll();
  }

  fn shortcuts(&self) -> Vec<Shortcut> {
    vec![Shortcut::new("r", "reload"), Shortcut::new("q", "back")]
  }
}
