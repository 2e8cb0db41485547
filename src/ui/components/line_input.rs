use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// What a key press did to an active input line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputOutcome {
  /// Text or cursor changed; input stays open
  Edited,
  /// Enter: the input closes and hands back its text
  Submitted(String),
  /// Esc: the input closes and discards its text
  Cancelled,
  /// The input is closed, or the key means nothing to it
  Ignored,
}

/// Single-line text entry that can be opened and closed, used for the
/// `:` command line and the `/` product search.
#[derive(Debug, Clone, Default)]
pub struct LineInput {
  buffer: String,
  /// Cursor position in chars
  cursor: usize,
  active: bool,
}

impl LineInput {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn is_active(&self) -> bool {
    self.active
  }

  pub fn value(&self) -> &str {
    &self.buffer
  }

  /// Open the input with an empty buffer
  pub fn open(&mut self) {
    self.active = true;
    self.set_value("");
  }

  /// Replace the text and put the cursor at the end
  pub fn set_value(&mut self, value: &str) {
    self.buffer = value.to_string();
    self.cursor = self.buffer.chars().count();
  }

  fn byte_index(&self, char_idx: usize) -> usize {
    self
      .buffer
      .char_indices()
      .nth(char_idx)
      .map(|(i, _)| i)
      .unwrap_or(self.buffer.len())
  }

  pub fn handle_key(&mut self, key: KeyEvent) -> InputOutcome {
    if !self.active {
      return InputOutcome::Ignored;
    }

    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
      KeyCode::Esc => {
        self.active = false;
        self.set_value("");
        InputOutcome::Cancelled
      }
      KeyCode::Enter => {
        self.active = false;
        let value = std::mem::take(&mut self.buffer);
        self.cursor = 0;
        InputOutcome::Submitted(value)
      }
      KeyCode::Backspace => {
        if self.cursor > 0 {
          self.cursor -= 1;
          let idx = self.byte_index(self.cursor);
          self.buffer.remove(idx);
        }
        InputOutcome::Edited
      }
      KeyCode::Left => {
        self.cursor = self.cursor.saturating_sub(1);
        InputOutcome::Edited
      }
      KeyCode::Right => {
        self.cursor = (self.cursor + 1).min(self.buffer.chars().count());
        InputOutcome::Edited
      }
      KeyCode::Home => {
        self.cursor = 0;
        InputOutcome::Edited
      }
      KeyCode::End => {
        self.cursor = self.buffer.chars().count();
        InputOutcome::Edited
      }
      KeyCode::Char('u') if ctrl => {
        let idx = self.byte_index(self.cursor);
        self.buffer.replace_range(..idx, "");
        self.cursor = 0;
        InputOutcome::Edited
      }
      KeyCode::Char(c) if !ctrl => {
        let idx = self.byte_index(self.cursor);
        self.buffer.insert(idx, c);
        self.cursor += 1;
        InputOutcome::Edited
      }
      _ => InputOutcome::Ignored,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
  }

  fn type_str(input: &mut LineInput, s: &str) {
    for c in s.chars() {
      input.handle_key(key(KeyCode::Char(c)));
    }
  }

  #[test]
  fn test_closed_input_ignores_keys() {
    let mut input = LineInput::new();
    assert_eq!(input.handle_key(key(KeyCode::Char('x'))), InputOutcome::Ignored);
    assert_eq!(input.value(), "");
  }

  #[test]
  fn test_submit_closes_and_returns_text() {
    let mut input = LineInput::new();
    input.open();
    type_str(&mut input, "boots");

    assert_eq!(
      input.handle_key(key(KeyCode::Enter)),
      InputOutcome::Submitted("boots".to_string())
    );
    assert!(!input.is_active());
    assert_eq!(input.value(), "");
  }

  #[test]
  fn test_cancel_discards_text() {
    let mut input = LineInput::new();
    input.open();
    type_str(&mut input, "jea");

    assert_eq!(input.handle_key(key(KeyCode::Esc)), InputOutcome::Cancelled);
    assert!(!input.is_active());
    assert_eq!(input.value(), "");
  }

  #[test]
  fn test_editing_in_the_middle_with_multibyte_chars() {
    let mut input = LineInput::new();
    input.open();
    type_str(&mut input, "cafe");
    input.handle_key(key(KeyCode::Backspace));
    type_str(&mut input, "é!");
    input.handle_key(key(KeyCode::Left));
    input.handle_key(key(KeyCode::Backspace));
    assert_eq!(input.value(), "caf!");
  }

  #[test]
  fn test_ctrl_u_clears_before_cursor() {
    let mut input = LineInput::new();
    input.open();
    type_str(&mut input, "brand Acme");
    for _ in 0..4 {
      input.handle_key(key(KeyCode::Left));
    }
    input.handle_key(KeyEvent::new(KeyCode::Char('u'), KeyModifiers::CONTROL));
    assert_eq!(input.value(), "Acme");
  }
}
