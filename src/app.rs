use crate::api::{Catalog, StoreCatalog};
use crate::commands::{self, Command, CommandKind};
use crate::config::Config;
use crate::event::{Event, EventHandler};
use crate::session::Cart;
use crate::ui;
use crate::ui::components::{InputOutcome, LineInput};
use crate::ui::view::{BrowseChange, View, ViewAction};
use crate::ui::views::{CartLine, CartView, Facet, FacetListView, ProductListView, StatsView};
use color_eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal::{
  disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::ExecutableCommand;
use ratatui::prelude::*;
use std::collections::HashMap;
use std::io::{stdout, Stdout};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Input mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
  Normal,
  Command,
}

/// Name and price remembered for each product that went into the cart
#[derive(Debug, Clone)]
struct CartItemInfo {
  name: String,
  price: f64,
}

fn restore_terminal() -> std::io::Result<()> {
  disable_raw_mode()?;
  stdout().execute(LeaveAlternateScreen)?;
  Ok(())
}

/// Run `restore` before the previously installed panic hook (color-eyre's
/// report), so a panicking view doesn't leave the terminal in raw mode.
fn install_panic_hook(restore: impl Fn() + Send + Sync + 'static) {
  let previous = std::panic::take_hook();
  std::panic::set_hook(Box::new(move |info| {
    restore();
    previous(info);
  }));
}

/// Main application state
pub struct App {
  config: Config,
  title: String,
  catalog: Arc<StoreCatalog>,

  /// Navigation stack; the product list is always at index 0
  view_stack: Vec<Box<dyn View>>,

  mode: Mode,
  command: LineInput,
  selected_suggestion: usize,

  cart: Cart,
  cart_items: HashMap<u64, CartItemInfo>,

  /// One-shot message for the status bar, cleared on the next key
  notification: Option<String>,

  should_quit: bool,
}

impl App {
  pub fn new(config: Config, catalog: StoreCatalog) -> Self {
    let catalog = Arc::new(catalog);
    let root = ProductListView::new(catalog.clone(), config.page_size);

    Self {
      title: config.display_title(),
      config,
      catalog,
      view_stack: vec![Box::new(root)],
      mode: Mode::Normal,
      command: LineInput::new(),
      selected_suggestion: 0,
      cart: Cart::new(),
      cart_items: HashMap::new(),
      notification: None,
      should_quit: false,
    }
  }

  pub async fn run(&mut self) -> Result<()> {
    install_panic_hook(|| {
      let _ = restore_terminal();
    });
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

    let result = self.main_loop(&mut terminal).await;

    // Restore the terminal even when the loop failed
    restore_terminal()?;

    result
  }

  async fn main_loop(&mut self, terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    let mut events = EventHandler::new(Duration::from_millis(100));
    self.prefetch_facets();

    while !self.should_quit {
      terminal.draw(|frame| ui::draw(frame, self))?;

      match events.next().await {
        Some(Event::Key(key)) => self.handle_key(key),
        Some(Event::Tick) => self.tick(),
        Some(Event::Resize) => {}
        None => break,
      }
    }

    info!("exiting");
    Ok(())
  }

  /// Warm the cache with categories and brands, both requested at once
  fn prefetch_facets(&self) {
    let catalog = self.catalog.clone();
    tokio::spawn(async move {
      let (categories, brands) =
        futures::future::join(catalog.list_categories(), catalog.list_brands()).await;
      match categories.and(brands) {
        Ok(_) => debug!("prefetched categories and brands"),
        Err(e) => warn!(error = %e, "prefetch failed"),
      }
    });
  }

  fn tick(&mut self) {
    for view in self.view_stack.iter_mut() {
      view.tick();
    }
  }

  fn handle_key(&mut self, key: KeyEvent) {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
      self.should_quit = true;
      return;
    }

    self.notification = None;

    match self.mode {
      Mode::Command => self.handle_command_key(key),
      Mode::Normal => {
        let capturing = self
          .current_view()
          .is_some_and(|view| view.is_capturing_input());
        if key.code == KeyCode::Char(':') && !capturing {
          self.mode = Mode::Command;
          self.command.open();
          self.selected_suggestion = 0;
          return;
        }

        let action = match self.view_stack.last_mut() {
          Some(view) => view.handle_key(key),
          None => ViewAction::None,
        };
        self.perform(action);
      }
    }
  }

  fn handle_command_key(&mut self, key: KeyEvent) {
    match key.code {
      KeyCode::Tab | KeyCode::Down => {
        let count = self.autocomplete_suggestions().len();
        if count > 0 {
          self.selected_suggestion = (self.selected_suggestion + 1) % count;
        }
        return;
      }
      KeyCode::BackTab | KeyCode::Up => {
        let count = self.autocomplete_suggestions().len();
        if count > 0 {
          self.selected_suggestion = (self.selected_suggestion + count - 1) % count;
        }
        return;
      }
      _ => {}
    }

    match self.command.handle_key(key) {
      InputOutcome::Submitted(input) => {
        self.mode = Mode::Normal;
        self.run_command_line(&input);
        self.selected_suggestion = 0;
      }
      InputOutcome::Cancelled => {
        self.mode = Mode::Normal;
        self.selected_suggestion = 0;
      }
      InputOutcome::Edited => self.selected_suggestion = 0,
      InputOutcome::Ignored => {}
    }
  }

  /// Run a submitted command line. A highlighted suggestion other than the
  /// first replaces the typed command word.
  fn run_command_line(&mut self, input: &str) {
    let Some((best, arg)) = commands::resolve(input) else {
      if !input.trim().is_empty() {
        self.notify(format!("Unknown command: {}", input.trim()));
      }
      return;
    };

    let cmd: &Command = commands::get_suggestions(input)
      .get(self.selected_suggestion)
      .copied()
      .unwrap_or(best);
    debug!(command = cmd.name, arg = %arg, "running command");
    self.execute_command(cmd.kind, &arg);
  }

  pub fn execute_command(&mut self, kind: CommandKind, arg: &str) {
    match kind {
      CommandKind::Products => self.view_stack.truncate(1),
      CommandKind::Categories => self.open_view(Box::new(FacetListView::new(
        Facet::Category,
        self.catalog.clone(),
      ))),
      CommandKind::Brands => self.open_view(Box::new(FacetListView::new(
        Facet::Brand,
        self.catalog.clone(),
      ))),
      CommandKind::Stats => self.open_view(Box::new(StatsView::new(self.catalog.clone()))),
      CommandKind::Cart => self.open_view(Box::new(CartView::new(self.cart_lines()))),
      CommandKind::Filter(key) => match key.validate(arg) {
        Ok(()) => self.browse(BrowseChange::SetFilter {
          key,
          value: arg.to_string(),
        }),
        Err(e) => self.notify(e.to_string()),
      },
      CommandKind::Search => self.browse(BrowseChange::Search(arg.to_string())),
      CommandKind::Clear => self.browse(BrowseChange::ClearFilters),
      CommandKind::Flush => {
        let dropped = self.catalog.cached_entries();
        self.catalog.clear();
        info!(dropped, "cache cleared");
        self.notify(format!("Dropped {} cached responses", dropped));
      }
      CommandKind::Quit => self.should_quit = true,
    }
  }

  fn perform(&mut self, action: ViewAction) {
    match action {
      ViewAction::None => {}
      ViewAction::Push(view) => self.view_stack.push(view),
      ViewAction::Pop => {
        if self.view_stack.len() > 1 {
          self.view_stack.pop();
        } else {
          self.should_quit = true;
        }
      }
      ViewAction::AddToCart { id, name, price } => {
        self.cart.add(id);
        self.notify(format!("Added {} to cart ({})", name, self.cart.count()));
        self.cart_items.insert(id, CartItemInfo { name, price });
      }
      ViewAction::RemoveFromCart(id) => {
        if self.cart.remove(id) {
          if !self.cart.items().contains(&id) {
            self.cart_items.remove(&id);
          }
          self.notify(format!("Removed one item ({} left)", self.cart.count()));
        }
      }
      ViewAction::ClearCart => {
        self.cart.clear();
        self.cart_items.clear();
        self.notify("Cart emptied".to_string());
      }
      ViewAction::Browse(change) => self.browse(change),
    }
  }

  /// Return to the product list and apply the change there
  fn browse(&mut self, change: BrowseChange) {
    self.view_stack.truncate(1);
    if let Some(root) = self.view_stack.first_mut() {
      root.apply_browse(&change);
    }
  }

  /// Show a view directly above the product list
  fn open_view(&mut self, view: Box<dyn View>) {
    self.view_stack.truncate(1);
    self.view_stack.push(view);
  }

  fn notify(&mut self, message: String) {
    self.notification = Some(message);
  }

  fn cart_lines(&self) -> Vec<CartLine> {
    self
      .cart
      .lines()
      .into_iter()
      .map(|(id, quantity)| {
        let (name, price) = match self.cart_items.get(&id) {
          Some(info) => (info.name.clone(), info.price),
          None => (format!("#{}", id), 0.0),
        };
        CartLine {
          id,
          name,
          price,
          quantity,
        }
      })
      .collect()
  }

  // Accessors for UI rendering
  pub fn current_view(&self) -> Option<&dyn View> {
    self.view_stack.last().map(|v| v.as_ref())
  }

  pub fn current_view_mut(&mut self) -> Option<&mut Box<dyn View>> {
    self.view_stack.last_mut()
  }

  pub fn mode(&self) -> &Mode {
    &self.mode
  }

  pub fn command_input(&self) -> &str {
    self.command.value()
  }

  pub fn title(&self) -> &str {
    &self.title
  }

  pub fn api_url(&self) -> &str {
    &self.config.api.base_url
  }

  pub fn cart(&self) -> &Cart {
    &self.cart
  }

  pub fn cached_entries(&self) -> usize {
    self.catalog.cached_entries()
  }

  pub fn notification(&self) -> Option<&str> {
    self.notification.as_deref()
  }

  pub fn view_breadcrumb(&self) -> Vec<String> {
    self
      .view_stack
      .iter()
      .map(|v| v.breadcrumb_label())
      .collect()
  }

  pub fn autocomplete_suggestions(&self) -> Vec<&'static Command> {
    commands::get_suggestions(self.command.value())
  }

  pub fn selected_suggestion(&self) -> usize {
    self.selected_suggestion
  }
}
