use crate::ui::view::ShortcutInfo;
use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

/// Draw the footer bar with the active view's shortcuts
pub fn draw_footer(frame: &mut Frame, area: Rect, shortcuts: &[ShortcutInfo]) {
  let mut sorted = shortcuts.to_vec();
  sorted.sort_by_key(|s| s.priority);

  let mut spans = vec![Span::raw(" ")];
  for (i, shortcut) in sorted.iter().enumerate() {
    if i > 0 {
      spans.push(Span::raw("   "));
    }
    spans.push(Span::styled(
      format!("<{}>", shortcut.key),
      Style::default().fg(Color::Cyan),
    ));
    spans.push(Span::styled(
      format!(" {}", shortcut.label),
      Style::default().fg(Color::DarkGray),
    ));
  }

  let paragraph = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::Black));
  frame.render_widget(paragraph, area);
}
