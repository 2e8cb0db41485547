/// Truncate a string to at most `max_len` chars, ending in "..." if cut
pub fn truncate(s: &str, max_len: usize) -> String {
  if s.chars().count() <= max_len {
    s.to_string()
  } else {
    let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
    format!("{}...", kept)
  }
}

/// Format a price for display, e.g. `$1,234.50`
pub fn format_price(price: f64) -> String {
  let cents = (price * 100.0).round() as i64;
  let sign = if cents < 0 { "-" } else { "" };
  let cents = cents.abs();
  let whole = (cents / 100).to_string();

  let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
  for (i, c) in whole.chars().enumerate() {
    if i > 0 && (whole.len() - i) % 3 == 0 {
      grouped.push(',');
    }
    grouped.push(c);
  }

  format!("{}${}.{:02}", sign, grouped, cents % 100)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_truncate_short_string() {
    assert_eq!(truncate("hello", 10), "hello");
  }

  #[test]
  fn test_truncate_exact_length() {
    assert_eq!(truncate("hello", 5), "hello");
  }

  #[test]
  fn test_truncate_long_string() {
    assert_eq!(truncate("hello world", 8), "hello...");
  }

  #[test]
  fn test_truncate_multibyte() {
    assert_eq!(truncate("Crème brûlée jacket", 8), "Crème...");
  }

  #[test]
  fn test_format_price() {
    assert_eq!(format_price(0.0), "$0.00");
    assert_eq!(format_price(49.5), "$49.50");
    assert_eq!(format_price(1234.567), "$1,234.57");
    assert_eq!(format_price(1_000_000.0), "$1,000,000.00");
  }
}
