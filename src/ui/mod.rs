pub mod components;
pub mod renderfns;
pub mod view;
pub mod views;

use crate::app::App;
use ratatui::prelude::*;
use ratatui::widgets::ListState;

/// Main draw function
pub fn draw(frame: &mut Frame, app: &mut App) {
  let chunks = Layout::default()
    .direction(Direction::Vertical)
    .constraints([
      Constraint::Length(1), // Tabs and address bar
      Constraint::Min(1),    // Active view
      Constraint::Length(1), // Shortcuts
    ])
    .split(frame.area());

  let titles = app.tab_titles();
  renderfns::draw_header(
    frame,
    chunks[0],
    &titles,
    app.active_index(),
    app.history_arrows(),
    &app.href(),
  );

  let shortcuts = app.view().shortcuts();
  app.view_mut().render(frame, chunks[1]);
  renderfns::draw_footer(frame, chunks[2], &shortcuts);
}

/// Keep a list selection inside `0..len`, selecting the first row when
/// there is something to select.
pub fn ensure_valid_selection(state: &mut ListState, len: usize) {
  match state.selected() {
    _ if len == 0 => state.select(None),
    None => state.select(Some(0)),
    Some(i) if i >= len => state.select(Some(len - 1)),
    Some(_) => {}
  }
}
