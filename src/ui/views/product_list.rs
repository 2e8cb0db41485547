use std::sync::Arc;

use crate::api::types::{Product, ProductPage};
use crate::api::{ApiError, FilterKey, StoreCatalog};
use crate::cache::{CacheResult, CacheSource};
use crate::query::{Query, QueryState};
use crate::session::BrowseState;
use crate::ui::components::{draw_input_overlay, InputOutcome, LineInput};
use crate::ui::ensure_valid_selection;
use crate::ui::renderfns::{format_price, truncate};
use crate::ui::view::{BrowseChange, Shortcut, View, ViewAction};
use crate::ui::views::ProductDetailView;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph};
use tracing::warn;

type PageQuery = Query<CacheResult<ProductPage>>;

/// Paginated product listing; root of the view stack
pub struct ProductListView {
  catalog: Arc<StoreCatalog>,
  browse: BrowseState,
  query: PageQuery,
  list_state: ListState,
  search: LineInput,
}

impl ProductListView {
  pub fn new(catalog: Arc<StoreCatalog>, page_size: u32) -> Self {
    let browse = BrowseState::new(page_size);
    let query = page_query(&catalog, &browse);

    Self {
      catalog,
      browse,
      query,
      list_state: ListState::default(),
      search: LineInput::new(),
    }
  }

  /// Replace the query with one for the current page and filters
  fn reload(&mut self) {
    self.query = page_query(&self.catalog, &self.browse);
    self.list_state.select(Some(0));
  }

  fn products(&self) -> &[Product] {
    self
      .query
      .data()
      .map(|result| result.data.products.as_slice())
      .unwrap_or(&[])
  }

  fn selected_product(&self) -> Option<&Product> {
    self.list_state.selected().and_then(|idx| self.products().get(idx))
  }

  fn filter_summary(&self) -> Line<'static> {
    if self.browse.filters().is_empty() {
      return Line::from(Span::styled(
        " no filters",
        Style::default().fg(Color::DarkGray),
      ));
    }

    let mut spans = Vec::new();
    for (key, value) in self.browse.filters().iter() {
      spans.push(Span::styled(format!(" {}=", key), Style::default().fg(Color::DarkGray)));
      spans.push(Span::styled(value.to_string(), Style::default().fg(Color::Yellow)));
    }
    Line::from(spans)
  }

  fn title(&self) -> String {
    let page = self.browse.page();
    let pages = match self.browse.total_pages() {
      Some(total) => format!("{}/{}", page, total.max(1)),
      None => format!("{}/?", page),
    };
    let pages = format!(
      "{}{}{}",
      if self.browse.has_previous() { "< " } else { "" },
      pages,
      if self.browse.has_next() { " >" } else { "" }
    );

    match self.query.state() {
      QueryState::Loading | QueryState::Idle => format!(" Products p.{} (loading...) ", pages),
      QueryState::Error(e) => format!(" Products p.{} (error: {}) ", pages, e),
      QueryState::Success(result) => format!(
        " Products p.{} ({} items{}) ",
        pages,
        result.data.total,
        origin_label(result)
      ),
    }
  }

  fn render_list(&mut self, frame: &mut Frame, area: Rect) {
    let len = self.products().len();
    ensure_valid_selection(&mut self.list_state, len);

    let chunks = Layout::default()
      .direction(Direction::Vertical)
      .constraints([Constraint::Length(1), Constraint::Min(1)])
      .split(area);

    frame.render_widget(Paragraph::new(self.filter_summary()), chunks[0]);

    let block = Block::default()
      .title(self.title())
      .title_alignment(Alignment::Center)
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Blue));

    if len == 0 {
      let content = if self.query.is_loading() {
        "Loading products..."
      } else if self.query.is_error() {
        "Failed to load products. Press 'r' to retry."
      } else {
        "No products match the current filters."
      };
      let paragraph = Paragraph::new(content)
        .block(block)
        .style(Style::default().fg(Color::DarkGray));
      frame.render_widget(paragraph, chunks[1]);
      return;
    }

    let items: Vec<ListItem> = self
      .products()
      .iter()
      .map(|product| {
        ListItem::new(Line::from(vec![
          Span::styled(format!("{:>6}", product.id), Style::default().fg(Color::DarkGray)),
          Span::raw(" "),
          Span::styled(
            format!("{:>11}", format_price(product.price)),
            Style::default().fg(Color::Green),
          ),
          Span::raw("  "),
          Span::styled(
            format!("{:<16}", truncate(&product.brand, 16)),
            Style::default().fg(Color::Cyan),
          ),
          Span::raw(" "),
          Span::raw(truncate(&product.name, 60)),
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

    frame.render_stateful_widget(list, chunks[1], &mut self.list_state);
  }
}

/// Title suffix telling a cached page apart from a fresh one
fn origin_label(result: &CacheResult<ProductPage>) -> String {
  match (result.source, result.cached_at) {
    (CacheSource::Cache, Some(at)) => format!(", cached {}s ago", at.elapsed().as_secs()),
    (CacheSource::Cache, None) => ", cached".to_string(),
    (CacheSource::Network, _) => String::new(),
  }
}

fn page_query(catalog: &Arc<StoreCatalog>, browse: &BrowseState) -> PageQuery {
  let catalog = catalog.clone();
  let page = browse.page();
  let limit = browse.page_size();
  let filters = browse.filters().clone();

  let mut query = Query::new(move || {
    let catalog = catalog.clone();
    let filters = filters.clone();
    async move {
      let result = catalog.fetch_with_source(page, limit, &filters).await?;
      Ok::<_, ApiError>(CacheResult {
        data: ProductPage::from_payload(&result.data)?,
        source: result.source,
        cached_at: result.cached_at,
      })
    }
  });
  query.fetch();
  query
}

impl View for ProductListView {
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
    match self.search.handle_key(key) {
      InputOutcome::Submitted(text) => {
        self.apply_browse(&BrowseChange::Search(text));
        return ViewAction::None;
      }
      InputOutcome::Edited | InputOutcome::Cancelled => return ViewAction::None,
      InputOutcome::Ignored if self.search.is_active() => return ViewAction::None,
      InputOutcome::Ignored => {}
    }

    match key.code {
      KeyCode::Char('j') | KeyCode::Down => self.list_state.select_next(),
      KeyCode::Char('k') | KeyCode::Up => self.list_state.select_previous(),
      KeyCode::Char('n') | KeyCode::Right => {
        if self.browse.next_page() {
          self.reload();
        }
      }
      KeyCode::Char('p') | KeyCode::Left => {
        if self.browse.previous_page() {
          self.reload();
        }
      }
      KeyCode::Char('r') => self.query.refetch(),
      KeyCode::Char('/') => {
        self.search.open();
        if let Some(current) = self.browse.filters().get(FilterKey::Search) {
          self.search.set_value(current);
        }
      }
      KeyCode::Char('c') => self.apply_browse(&BrowseChange::ClearFilters),
      KeyCode::Char('a') => {
        if let Some(product) = self.selected_product() {
          return ViewAction::AddToCart {
            id: product.id,
            name: product.name.clone(),
            price: product.price,
          };
        }
      }
      KeyCode::Enter => {
        if let Some(product) = self.selected_product() {
          return ViewAction::Push(Box::new(ProductDetailView::new(
            product.id,
            product.name.clone(),
            self.catalog.clone(),
          )));
        }
      }
      KeyCode::Char('q') | KeyCode::Esc => return ViewAction::Pop,
      _ => {}
    }
    ViewAction::None
  }

  fn render(&mut self, frame: &mut Frame, area: Rect) {
    self.render_list(frame, area);
    if self.search.is_active() {
      draw_input_overlay(frame, area, "Search", "/", self.search.value(), &[], 0);
    }
  }

  fn breadcrumb_label(&self) -> String {
    match self.browse.filters().get(FilterKey::Search) {
      Some(term) => format!("Products [{}]", term),
      None => "Products".to_string(),
    }
  }

  fn tick(&mut self) {
    if self.query.poll() {
      if let Some(result) = self.query.data() {
        self.browse.update_totals(&result.data);
      }
    }
  }

  fn apply_browse(&mut self, change: &BrowseChange) {
    match change {
      BrowseChange::SetFilter { key, value } => {
        if let Err(e) = self.browse.set_filter(*key, value) {
          warn!(filter = key.as_str(), error = %e, "filter rejected");
          return;
        }
      }
      BrowseChange::Search(text) => self.browse.apply_search(text),
      BrowseChange::ClearFilters => self.browse.clear_filters(),
    }
    self.reload();
  }

  fn is_capturing_input(&self) -> bool {
    self.search.is_active()
  }

  fn shortcuts(&self) -> Vec<Shortcut> {
    vec![
      Shortcut::new(":", "command"),
      Shortcut::new("/", "search"),
      Shortcut::new("n/p", "page"),
      Shortcut::new("a", "add"),
      Shortcut::new("c", "clear"),
    ]
  }
}
