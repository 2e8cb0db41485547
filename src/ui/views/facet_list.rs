use std::sync::Arc;

use crate::api::types::{Brand, Category};
use crate::api::{ApiResult, Catalog, FilterKey, StoreCatalog};
use crate::query::{Query, QueryState};
use crate::ui::ensure_valid_selection;
use crate::ui::renderfns::{format_price, truncate};
use crate::ui::view::{BrowseChange, Shortcut, View, ViewAction};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph};

/// Which product attribute the list groups by
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Facet {
  Category,
  Brand,
}

impl Facet {
  /// Filter key set when a row is picked
  pub fn filter_key(&self) -> FilterKey {
    match self {
      Facet::Category => FilterKey::Category,
      Facet::Brand => FilterKey::Brand,
    }
  }

  fn label(&self) -> &'static str {
    match self {
      Facet::Category => "Categories",
      Facet::Brand => "Brands",
    }
  }
}

/// One category or brand with its product count
#[derive(Debug, Clone, PartialEq)]
pub struct FacetRow {
  pub name: String,
  pub count: u64,
  pub avg_price: Option<f64>,
}

impl From<Category> for FacetRow {
  fn from(c: Category) -> Self {
    Self {
      name: c.category,
      count: c.count,
      avg_price: c.avg_price,
    }
  }
}

impl From<Brand> for FacetRow {
  fn from(b: Brand) -> Self {
    Self {
      name: b.brand,
      count: b.count,
      avg_price: b.avg_price,
    }
  }
}

async fn load_rows(catalog: &StoreCatalog, facet: Facet) -> ApiResult<Vec<FacetRow>> {
  let rows = match facet {
    Facet::Category => {
      let payload = catalog.list_categories().await?;
      Category::list_from_payload(&payload)?
        .into_iter()
        .map(FacetRow::from)
        .collect()
    }
    Facet::Brand => {
      let payload = catalog.list_brands().await?;
      Brand::list_from_payload(&payload)?
        .into_iter()
        .map(FacetRow::from)
        .collect()
    }
  };
  Ok(rows)
}

/// Categories or brands; Enter filters the product list by the selected row
pub struct FacetListView {
  facet: Facet,
  query: Query<Vec<FacetRow>>,
  list_state: ListState,
}

impl FacetListView {
  pub fn new(facet: Facet, catalog: Arc<StoreCatalog>) -> Self {
    let mut query = Query::new(move || {
      let catalog = catalog.clone();
      async move { load_rows(&catalog, facet).await }
    });
    query.fetch();

    Self {
      facet,
      query,
      list_state: ListState::default(),
    }
  }

  fn rows(&self) -> &[FacetRow] {
    self.query.data().map(|v| v.as_slice()).unwrap_or(&[])
  }

  fn render_list(&mut self, frame: &mut Frame, area: Rect) {
    let len = self.rows().len();
    ensure_valid_selection(&mut self.list_state, len);

    let title = match self.query.state() {
      QueryState::Loading | QueryState::Idle => format!(" {} (loading...) ", self.facet.label()),
      QueryState::Error(e) => format!(" {} (error: {}) ", self.facet.label(), e),
      QueryState::Success(rows) => format!(" {} ({}) ", self.facet.label(), rows.len()),
    };

    let block = Block::default()
      .title(title)
      .title_alignment(Alignment::Center)
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Blue));

    if len == 0 && !self.query.is_loading() {
      let content = if self.query.is_error() {
        "Failed to load. Press 'r' to retry."
      } else {
        "Nothing here."
      };
      let paragraph = Paragraph::new(content)
        .block(block)
        .style(Style::default().fg(Color::DarkGray));
      frame.render_widget(paragraph, area);
      return;
    }

    let items: Vec<ListItem> = self
      .rows()
      .iter()
      .map(|row| {
        let avg = row
          .avg_price
          .map(|p| format!("avg {}", format_price(p)))
          .unwrap_or_default();
        ListItem::new(Line::from(vec![
          Span::styled(
            format!("{:<32}", truncate(&row.name, 32)),
            Style::default().fg(Color::Cyan),
          ),
          Span::styled(format!("{:>7}", row.count), Style::default().fg(Color::Yellow)),
          Span::raw("  "),
          Span::styled(avg, Style::default().fg(Color::DarkGray)),
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
}

impl View for FacetListView {
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
    match key.code {
      KeyCode::Char('j') | KeyCode::Down => self.list_state.select_next(),
      KeyCode::Char('k') | KeyCode::Up => self.list_state.select_previous(),
      KeyCode::Char('r') => self.query.refetch(),
      KeyCode::Enter => {
        let selected = self
          .list_state
          .selected()
          .and_then(|idx| self.rows().get(idx));
        if let Some(row) = selected {
          return ViewAction::Browse(BrowseChange::SetFilter {
            key: self.facet.filter_key(),
            value: row.name.clone(),
          });
        }
      }
      // Drop this facet's filter
      KeyCode::Char('x') => {
        return ViewAction::Browse(BrowseChange::SetFilter {
          key: self.facet.filter_key(),
          value: String::new(),
        });
      }
      KeyCode::Char('q') | KeyCode::Esc => return ViewAction::Pop,
      _ => {}
    }
    ViewAction::None
  }

  fn render(&mut self, frame: &mut Frame, area: Rect) {
    self.render_list(frame, area);
  }

  fn breadcrumb_label(&self) -> String {
    self.facet.label().to_string()
  }

  fn tick(&mut self) {
    self.query.poll();
  }

  fn shortcuts(&self) -> Vec<Shortcut> {
    vec![
      Shortcut::new("enter", "filter"),
      Shortcut::new("x", "unfilter"),
      Shortcut::new("q", "back"),
    ]
  }
}
