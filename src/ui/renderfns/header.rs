use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

/// Draw the header bar: app name, tab strip, history arrows and the address bar
pub fn draw_header(
  frame: &mut Frame,
  area: Rect,
  tabs: &[&str],
  active: usize,
  (can_back, can_forward): (bool, bool),
  href: &str,
) {
  let mut spans = vec![
    Span::styled(" tritab ", Style::default().fg(Color::Cyan).bold()),
    Span::styled("│", Style::default().fg(Color::DarkGray)),
  ];

  for (i, title) in tabs.iter().enumerate() {
    let style = if i == active {
      Style::default().fg(Color::Yellow).bold()
    } else {
      Style::default().fg(Color::Gray)
    };
    spans.push(Span::styled(format!(" {}:{} ", i + 1, title), style));
  }

  spans.push(Span::styled("│", Style::default().fg(Color::DarkGray)));
  let arrow = |enabled: bool, symbol: &'static str| {
    let color = if enabled { Color::White } else { Color::DarkGray };
    Span::styled(symbol, Style::default().fg(color))
  };
  spans.push(arrow(can_back, " ◀"));
  spans.push(arrow(can_forward, "▶"));
  spans.push(Span::styled(
    format!(" {}", href),
    Style::default().fg(Color::White),
  ));

  let paragraph = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::Black));
  frame.render_widget(paragraph, area);
}
