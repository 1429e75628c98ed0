use crossterm::event::KeyEvent;
use ratatui::prelude::*;

/// A keyboard shortcut hint for display in the footer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShortcutInfo {
  pub key: &'static str,
  pub label: &'static str,
  pub priority: u8, // Lower = shown first
}

impl ShortcutInfo {
  pub const fn new(key: &'static str, label: &'static str) -> Self {
    Self {
      key,
      label,
      priority: 100,
    }
  }

  pub const fn with_priority(mut self, priority: u8) -> Self {
    self.priority = priority;
    self
  }
}

/// Actions that a view can request in response to user input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewAction {
  /// No action needed
  None,
  /// Leave the application
  Quit,
}

/// Trait for tab content
///
/// Views own their fetch/filter state, handle their own input modes (search,
/// address entry) and return actions for the App to execute.
///
/// Views that load data asynchronously poll their fetchers in `tick()`.
pub trait View {
  /// Handle a key event, returning an action for App to execute
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction;

  /// Render the view to the frame
  fn render(&mut self, frame: &mut Frame, area: Rect);

  /// Title shown in the tab strip
  fn title(&self) -> &'static str;

  /// Called on each tick to pick up finished fetches and navigation
  fn tick(&mut self) {}

  /// Whether the view is capturing text input (global keys are suspended)
  fn is_editing(&self) -> bool {
    false
  }

  /// Get keyboard shortcuts to display in the footer
  fn shortcuts(&self) -> Vec<ShortcutInfo> {
    vec![ShortcutInfo::new("q", "quit").with_priority(90)]
  }
}
