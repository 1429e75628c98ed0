use super::input::{InputResult, TextInput};
use super::KeyResult;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

/// Events emitted by a prompt that the parent view handles
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptEvent {
  /// Text changed (emitted on every edit; carries the value to restore on cancel)
  Changed(String),
  /// Enter pressed with this value; overlay closed
  Submitted(String),
}

/// One-line overlay prompt opened by a trigger key.
///
/// Used for the live product search (`/`) and for typing an address (`g`).
#[derive(Debug, Clone)]
pub struct Prompt {
  trigger: char,
  title: &'static str,
  input: TextInput,
  /// Value at activation, restored when the prompt is cancelled
  original: String,
  active: bool,
}

impl Prompt {
  pub fn new(trigger: char, title: &'static str) -> Self {
    Self {
      trigger,
      title,
      input: TextInput::new(),
      original: String::new(),
      active: false,
    }
  }

  pub fn is_active(&self) -> bool {
    self.active
  }

  pub fn value(&self) -> &str {
    self.input.value()
  }

  /// Open the prompt with `initial` already typed
  pub fn activate(&mut self, initial: &str) {
    self.active = true;
    self.original = initial.to_string();
    self.input.set_value(initial);
  }

  /// Handle a key event, including the trigger key while inactive.
  ///
  /// `initial` is what the prompt opens with when triggered.
  pub fn handle_key(&mut self, key: KeyEvent, initial: &str) -> KeyResult<PromptEvent> {
    if !self.active {
      if key.code == KeyCode::Char(self.trigger) {
        self.activate(initial);
        return KeyResult::Handled;
      }
      return KeyResult::NotHandled;
    }

    match self.input.handle_key(key) {
      InputResult::Submitted(value) => {
        self.active = false;
        KeyResult::Event(PromptEvent::Submitted(value))
      }
      InputResult::Cancelled => {
        self.active = false;
        self.input.set_value(&self.original);
        KeyResult::Event(PromptEvent::Changed(self.original.clone()))
      }
      InputResult::Edited => KeyResult::Event(PromptEvent::Changed(self.input.value().to_string())),
      // Swallow everything else so global shortcuts don't fire mid-typing
      InputResult::NotHandled => KeyResult::Handled,
    }
  }

  /// Render the overlay at the top-left of `area` if active
  pub fn render_overlay(&self, frame: &mut Frame, area: Rect) {
    if !self.active {
      return;
    }

    let width = ((u32::from(area.width) * 60 / 100) as u16).clamp(30.min(area.width), 60.min(area.width));
    let height = 3.min(area.height);
    let overlay_area = Rect::new(area.x + 1, area.y + 1, width, height).intersection(area);

    frame.render_widget(Clear, overlay_area);

    let block = Block::default()
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Yellow))
      .title(format!(" {} ", self.title));

    let inner = block.inner(overlay_area);
    frame.render_widget(block, overlay_area);

    if inner.height == 0 {
      return;
    }

    let value = self.value();
    let split = value
      .char_indices()
      .nth(self.input.cursor_position())
      .map(|(i, _)| i)
      .unwrap_or(value.len());
    let (before, after) = value.split_at(split);

    let input_line = Line::from(vec![
      Span::styled(self.trigger.to_string(), Style::default().fg(Color::Yellow)),
      Span::raw(before.to_string()),
      Span::styled("_", Style::default().fg(Color::Yellow)), // Cursor
      Span::raw(after.to_string()),
    ]);
    frame.render_widget(Paragraph::new(input_line), inner);
  }
}
