use super::KeyResult;
use crate::ui::renderfns::truncate;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

/// Emitted when the user moves to a different category tab
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryChanged(pub String);

/// Tab strip of categories with a leading "All" tab.
///
/// The selected value is an empty string for "All", matching the empty
/// category filter.
#[derive(Debug, Clone, Default)]
pub struct CategoryBar {
  categories: Vec<String>,
  selected: usize, // 0 = All, 1+ = index into categories
}

impl CategoryBar {
  pub fn new(categories: Vec<String>) -> Self {
    Self {
      categories,
      selected: 0,
    }
  }

  /// Currently selected category, empty for "All"
  pub fn selected(&self) -> &str {
    match self.selected {
      0 => "",
      n => self.categories.get(n - 1).map(String::as_str).unwrap_or(""),
    }
  }

  /// Point the bar at `category` (from the address bar). Unknown values
  /// select "All".
  pub fn select(&mut self, category: &str) {
    self.selected = self
      .categories
      .iter()
      .position(|c| c == category)
      .map(|i| i + 1)
      .unwrap_or(0);
  }

  pub fn handle_key(&mut self, key: KeyEvent) -> KeyResult<CategoryChanged> {
    if self.categories.is_empty() {
      return KeyResult::NotHandled;
    }

    match key.code {
      KeyCode::PageUp => self.navigate(-1),
      KeyCode::PageDown => self.navigate(1),
      _ => return KeyResult::NotHandled,
    }
    KeyResult::Event(CategoryChanged(self.selected().to_string()))
  }

  /// Navigate tabs with wrapping
  fn navigate(&mut self, direction: i32) {
    let total_tabs = self.categories.len() + 1;

    self.selected = if direction > 0 {
      (self.selected + 1) % total_tabs
    } else if self.selected == 0 {
      total_tabs - 1
    } else {
      self.selected - 1
    };
  }

  pub fn render(&self, frame: &mut Frame, area: Rect) {
    let tab_style = |selected: bool| {
      if selected {
        Style::default().fg(Color::Black).bg(Color::Cyan)
      } else {
        Style::default().fg(Color::Gray)
      }
    };

    let mut spans = vec![
      Span::styled("[category] ", Style::default().fg(Color::Yellow)),
      Span::styled(" All ", tab_style(self.selected == 0)),
    ];

    for (idx, category) in self.categories.iter().enumerate() {
      spans.push(Span::styled("│", Style::default().fg(Color::DarkGray)));
      spans.push(Span::styled(
        format!(" {} ", truncate(category, 15)),
        tab_style(self.selected == idx + 1),
      ));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
  }
}
