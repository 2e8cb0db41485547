/// Available commands and autocomplete logic

use crate::api::FilterKey;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
  Products,
  Categories,
  Brands,
  Stats,
  Cart,
  /// Set one listing filter from the argument; blank clears it
  Filter(FilterKey),
  Search,
  Clear,
  Flush,
  Quit,
}

#[derive(Debug, Clone)]
pub struct Command {
  pub kind: CommandKind,
  pub name: &'static str,
  pub aliases: &'static [&'static str],
  pub description: &'static str,
  /// Argument placeholder shown in suggestions, if the command takes one
  pub arg: Option<&'static str>,
}

/// All available commands
pub const COMMANDS: &[Command] = &[
  Command {
    kind: CommandKind::Products,
    name: "products",
    aliases: &["p", "home"],
    description: "Browse products",
    arg: None,
  },
  Command {
    kind: CommandKind::Categories,
    name: "categories",
    aliases: &["cats"],
    description: "Pick a category",
    arg: None,
  },
  Command {
    kind: CommandKind::Brands,
    name: "brands",
    aliases: &["b"],
    description: "Pick a brand",
    arg: None,
  },
  Command {
    kind: CommandKind::Stats,
    name: "stats",
    aliases: &["st"],
    description: "Catalog statistics",
    arg: None,
  },
  Command {
    kind: CommandKind::Cart,
    name: "cart",
    aliases: &["basket"],
    description: "Show the cart",
    arg: None,
  },
  Command {
    kind: CommandKind::Filter(FilterKey::Category),
    name: "category",
    aliases: &["cat"],
    description: "Filter by category (blank clears)",
    arg: Some("<name>"),
  },
  Command {
    kind: CommandKind::Filter(FilterKey::Brand),
    name: "brand",
    aliases: &[],
    description: "Filter by brand (blank clears)",
    arg: Some("<name>"),
  },
  Command {
    kind: CommandKind::Filter(FilterKey::Department),
    name: "department",
    aliases: &["dept"],
    description: "Filter by department, e.g. Men or Women",
    arg: Some("<name>"),
  },
  Command {
    kind: CommandKind::Filter(FilterKey::PriceRange),
    name: "price",
    aliases: &["price_range"],
    description: "Filter by price range",
    arg: Some("<range>"),
  },
  Command {
    kind: CommandKind::Filter(FilterKey::MinPrice),
    name: "min",
    aliases: &["min_price"],
    description: "Lowest price to show",
    arg: Some("<amount>"),
  },
  Command {
    kind: CommandKind::Filter(FilterKey::MaxPrice),
    name: "max",
    aliases: &["max_price"],
    description: "Highest price to show",
    arg: Some("<amount>"),
  },
  Command {
    kind: CommandKind::Search,
    name: "search",
    aliases: &["s", "find"],
    description: "Search products (blank clears all filters)",
    arg: Some("<text>"),
  },
  Command {
    kind: CommandKind::Clear,
    name: "clear",
    aliases: &["reset"],
    description: "Clear all filters",
    arg: None,
  },
  Command {
    kind: CommandKind::Flush,
    name: "flush",
    aliases: &["invalidate"],
    description: "Drop cached API responses",
    arg: None,
  },
  Command {
    kind: CommandKind::Quit,
    name: "quit",
    aliases: &["q", "exit"],
    description: "Exit storefront",
    arg: None,
  },
];

/// Get autocomplete suggestions for the command word of `input`
pub fn get_suggestions(input: &str) -> Vec<&'static Command> {
  let word = input.split_whitespace().next().unwrap_or("").to_lowercase();

  if word.is_empty() {
    return COMMANDS.iter().collect();
  }

  let mut matches: Vec<(&Command, u32)> = COMMANDS
    .iter()
    .filter_map(|cmd| match_priority(cmd, &word).map(|p| (cmd, p)))
    .collect();

  matches.sort_by_key(|(_, priority)| *priority);
  matches.into_iter().map(|(cmd, _)| cmd).collect()
}

/// Lower is better; `None` means no match
fn match_priority(cmd: &Command, word: &str) -> Option<u32> {
  if cmd.name == word {
    Some(0)
  } else if cmd.aliases.contains(&word) {
    Some(1)
  } else if cmd.name.starts_with(word) {
    Some(2)
  } else if cmd.aliases.iter().any(|a| a.starts_with(word)) {
    Some(3)
  } else if cmd.name.contains(word) {
    Some(4)
  } else {
    None
  }
}

/// Resolve a full command line to a command and its (possibly empty) argument.
///
/// The command word may be a name, an alias, or anything that has a
/// suggestion; the best suggestion wins.
pub fn resolve(input: &str) -> Option<(&'static Command, String)> {
  let input = input.trim();
  let (word, arg) = match input.split_once(char::is_whitespace) {
    Some((word, rest)) => (word, rest.trim()),
    None => (input, ""),
  };
  if word.is_empty() {
    return None;
  }

  let cmd = get_suggestions(word).into_iter().next()?;
  Some((cmd, arg.to_string()))
}
