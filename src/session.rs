//! Client-side browsing state: current page, active filters and the cart.

use crate::api::types::ProductPage;
use crate::api::{ApiResult, FilterKey, Filters};

/// Pagination and filter state for the product listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrowseState {
  page: u32,
  page_size: u32,
  filters: Filters,
  /// Unknown until the first page has loaded
  total_pages: Option<u32>,
}

impl BrowseState {
  pub fn new(page_size: u32) -> Self {
    Self {
      page: 1,
      page_size: page_size.max(1),
      filters: Filters::new(),
      total_pages: None,
    }
  }

  pub fn page(&self) -> u32 {
    self.page
  }

  pub fn page_size(&self) -> u32 {
    self.page_size
  }

  pub fn filters(&self) -> &Filters {
    &self.filters
  }

  pub fn total_pages(&self) -> Option<u32> {
    self.total_pages
  }

  /// Set (or clear, with a blank value) one filter and go back to page 1.
  /// A rejected value leaves both the filters and the page alone.
  pub fn set_filter(&mut self, key: FilterKey, value: &str) -> ApiResult<()> {
    self.filters.set(key, value)?;
    self.reset_page();
    Ok(())
  }

  /// Apply a free-text search. A blank query drops every filter, not just
  /// the search term.
  pub fn apply_search(&mut self, query: &str) {
    if query.trim().is_empty() {
      self.filters = Filters::new();
    } else {
      self.filters.insert(FilterKey::Search.as_str(), query);
    }
    self.reset_page();
  }

  pub fn clear_filters(&mut self) {
    self.filters = Filters::new();
    self.reset_page();
  }

  /// Advance one page if there is one. Returns whether the page changed.
  pub fn next_page(&mut self) -> bool {
    match self.total_pages {
      Some(total) if self.page < total => {
        self.page += 1;
        true
      }
      _ => false,
    }
  }

  /// Go back one page if not on the first. Returns whether the page changed.
  pub fn previous_page(&mut self) -> bool {
    if self.page > 1 {
      self.page -= 1;
      true
    } else {
      false
    }
  }

  pub fn has_next(&self) -> bool {
    self.total_pages.is_some_and(|total| self.page < total)
  }

  pub fn has_previous(&self) -> bool {
    self.page > 1
  }

  /// Record the total from a freshly loaded page
  pub fn update_totals(&mut self, page: &ProductPage) {
    self.total_pages = Some(page.total_pages(self.page_size));
  }

  fn reset_page(&mut self) {
    self.page = 1;
    self.total_pages = None;
  }
}

/// In-memory shopping cart holding product ids in the order they were added
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cart {
  items: Vec<u64>,
}

impl Cart {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn add(&mut self, product_id: u64) {
    self.items.push(product_id);
  }

  /// Remove one occurrence of `product_id`. Returns whether anything was removed.
  pub fn remove(&mut self, product_id: u64) -> bool {
    match self.items.iter().position(|id| *id == product_id) {
      Some(idx) => {
        self.items.remove(idx);
        true
      }
      None => false,
    }
  }

  pub fn count(&self) -> usize {
    self.items.len()
  }

  pub fn is_empty(&self) -> bool {
    self.items.is_empty()
  }

  pub fn items(&self) -> &[u64] {
    &self.items
  }

  /// Distinct product ids with their quantities, in first-added order
  pub fn lines(&self) -> Vec<(u64, usize)> {
    let mut lines: Vec<(u64, usize)> = Vec::new();
    for id in &self.items {
      match lines.iter_mut().find(|(line_id, _)| line_id == id) {
        Some((_, qty)) => *qty += 1,
        None => lines.push((*id, 1)),
      }
    }
    lines
  }

  pub fn clear(&mut self) {
    self.items.clear();
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn page_with_total(total: u64) -> ProductPage {
    ProductPage {
      products: Vec::new(),
      total,
    }
  }

  #[test]
  fn test_starts_on_first_page() {
    let state = BrowseState::new(12);
    assert_eq!(state.page(), 1);
    assert_eq!(state.total_pages(), None);
    assert!(!state.has_next());
    assert!(!state.has_previous());
  }

  #[test]
  fn test_paging_respects_bounds() {
    let mut state = BrowseState::new(12);
    state.update_totals(&page_with_total(30));
    assert_eq!(state.total_pages(), Some(3));

    assert!(!state.previous_page());
    assert!(state.next_page());
    assert!(state.next_page());
    assert_eq!(state.page(), 3);
    assert!(!state.next_page());
    assert!(state.previous_page());
    assert_eq!(state.page(), 2);
  }

  #[test]
  fn test_next_page_needs_known_total() {
    let mut state = BrowseState::new(12);
    assert!(!state.next_page());
    assert_eq!(state.page(), 1);
  }

  #[test]
  fn test_filter_change_resets_page() {
    let mut state = BrowseState::new(12);
    state.update_totals(&page_with_total(100));
    state.next_page();
    state.next_page();

    state.set_filter(FilterKey::Category, "Jeans").unwrap();
    assert_eq!(state.page(), 1);
    assert_eq!(state.filters().get(FilterKey::Category), Some("Jeans"));
    assert_eq!(state.total_pages(), None);
  }

  #[test]
  fn test_blank_filter_value_clears_it() {
    let mut state = BrowseState::new(12);
    state.set_filter(FilterKey::Brand, "Acme").unwrap();
    state.set_filter(FilterKey::Brand, "").unwrap();
    assert!(state.filters().is_empty());
  }

  #[test]
  fn test_rejected_price_keeps_page() {
    let mut state = BrowseState::new(12);
    state.update_totals(&page_with_total(100));
    state.next_page();

    assert!(state.set_filter(FilterKey::MaxPrice, "lots").is_err());
    assert_eq!(state.page(), 2);
    assert!(state.filters().is_empty());

    state.set_filter(FilterKey::MaxPrice, "50").unwrap();
    assert_eq!(state.page(), 1);
    assert_eq!(state.filters().get(FilterKey::MaxPrice), Some("50"));
  }

  #[test]
  fn test_blank_search_clears_all_filters() {
    let mut state = BrowseState::new(12);
    state.set_filter(FilterKey::Category, "Jeans").unwrap();
    state.apply_search("  boot  ");
    assert_eq!(state.filters().get(FilterKey::Search), Some("boot"));
    assert_eq!(state.filters().get(FilterKey::Category), Some("Jeans"));

    state.apply_search("   ");
    assert!(state.filters().is_empty());
  }

  #[test]
  fn test_cart() {
    let mut cart = Cart::new();
    cart.add(3);
    cart.add(7);
    cart.add(3);

    assert_eq!(cart.count(), 3);
    assert_eq!(cart.lines(), vec![(3, 2), (7, 1)]);
    assert!(cart.remove(3));
    assert!(!cart.remove(99));
    assert_eq!(cart.items(), &[7, 3]);

    cart.clear();
    assert!(cart.is_empty());
  }
}
