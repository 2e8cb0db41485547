use crossterm::event::KeyEvent;
use ratatui::prelude::*;

use crate::api::FilterKey;

/// A keyboard shortcut hint for display in the header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Shortcut {
  pub key: &'static str,
  pub label: &'static str,
}

impl Shortcut {
  pub const fn new(key: &'static str, label: &'static str) -> Self {
    Self { key, label }
  }
}

/// A change to the shared browse state of the product list
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BrowseChange {
  /// Set one filter; a blank value removes it
  SetFilter { key: FilterKey, value: String },
  /// Free-text search; blank clears every filter
  Search(String),
  ClearFilters,
}

/// Actions that a view can request in response to user input
pub enum ViewAction {
  /// No action needed
  None,
  /// Push a new view onto the stack
  Push(Box<dyn View>),
  /// Pop current view from stack (go back)
  Pop,
  AddToCart { id: u64, name: String, price: f64 },
  RemoveFromCart(u64),
  ClearCart,
  /// Return to the product list and apply a browse change there
  Browse(BrowseChange),
}

/// Trait for view behavior
///
/// Views own their input modes and async queries, and return actions for
/// the App to execute. Views that load data use `Query<T>` and poll it in
/// `tick()`.
pub trait View {
  /// Handle a key event, returning an action for App to execute
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction;

  /// Render the view to the frame
  fn render(&mut self, frame: &mut Frame, area: Rect);

  /// Get the breadcrumb label for this view
  fn breadcrumb_label(&self) -> String;

  /// Called on each tick to allow views to poll async queries
  fn tick(&mut self) {}

  /// Apply a browse change. Only the product list reacts.
  fn apply_browse(&mut self, _change: &BrowseChange) {}

  /// True while the view has its own text input open, so global keys
  /// must not be intercepted
  fn is_capturing_input(&self) -> bool {
    false
  }

  /// Keyboard shortcuts to display in the header
  fn shortcuts(&self) -> Vec<Shortcut> {
    vec![Shortcut::new(":", "command"), Shortcut::new("q", "back")]
  }
}
