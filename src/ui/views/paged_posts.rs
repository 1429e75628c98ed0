use crate::api::Post;
use crate::fetch::{Paginated, Transport};
use crate::ui::ensure_valid_selection;
use crate::ui::renderfns::truncate;
use crate::ui::view::{ShortcutInfo, View, ViewAction};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph};
use std::sync::Arc;

/// All posts, loaded a page at a time
pub struct PagedPostsView {
  pages: Paginated<Post>,
  list_state: ListState,
}

impl PagedPostsView {
  /// Requests the first page immediately.
  pub fn new(
    url: &str,
    page_size: u32,
    total: Option<u64>,
    transport: Arc<dyn Transport>,
  ) -> Self {
    let mut pages = Paginated::new(url, page_size, transport);
    if let Some(total) = total {
      pages = pages.with_total(total);
    }
    pages.start();

    Self {
      pages,
      list_state: ListState::default(),
    }
  }

  fn select_next(&mut self) {
    let len = self.pages.items().len();
    match self.list_state.selected() {
      // Moving past the last item asks for the next page
      Some(i) if i + 1 >= len => {
        self.pages.load_more();
      }
      Some(i) => self.list_state.select(Some(i + 1)),
      None if len > 0 => self.list_state.select(Some(0)),
      None => {}
    }
  }

  fn status_line(&self) -> Line<'static> {
    let count = Span::raw(format!(
      "{} posts, page {}  ",
      self.pages.items().len(),
      self.pages.page()
    ));

    let status = if let Some(error) = self.pages.error() {
      Span::styled(
        format!("Error: {} (r to restart)", error),
        Style::default().fg(Color::Red),
      )
    } else if self.pages.is_loading() {
      Span::styled("Loading...", Style::default().fg(Color::Yellow))
    } else if self.pages.has_more() {
      Span::styled("m to load more", Style::default().fg(Color::DarkGray))
    } else {
      Span::styled("No more posts to load", Style::default().fg(Color::Green))
    };

    Line::from(vec![count, status])
  }
}

impl View for PagedPostsView {
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
    match key.code {
      KeyCode::Char('j') | KeyCode::Down => self.select_next(),
      KeyCode::Char('k') | KeyCode::Up => self.list_state.select_previous(),
      KeyCode::Char('m') => {
        self.pages.load_more();
      }
      KeyCode::Char('r') => {
        self.list_state.select(None);
        self.pages.retry();
      }
      KeyCode::Char('q') => return ViewAction::Quit,
      _ => {}
    }
    ViewAction::None
  }

  fn render(&mut self, frame: &mut Frame, area: Rect) {
    let chunks = Layout::default()
      .direction(Direction::Vertical)
      .constraints([Constraint::Min(1), Constraint::Length(1)])
      .split(area);

    ensure_valid_selection(&mut self.list_state, self.pages.items().len());

    let items: Vec<ListItem> = self
      .pages
      .items()
      .iter()
      .map(|post| {
        ListItem::new(Line::from(vec![
          Span::styled(format!("{:>4} ", post.id), Style::default().fg(Color::DarkGray)),
          Span::styled(
            format!("{:<60}", truncate(&post.title, 60)),
            Style::default().fg(Color::Cyan),
          ),
          Span::raw(" "),
          Span::styled(
            truncate(&post.body.replace('\n', " "), 50),
            Style::default().fg(Color::DarkGray),
          ),
        ]))
      })
      .collect();

    let list = List::new(items)
      .block(
        Block::default()
          .title(format!(" Paginated posts ({} per page) ", self.pages.page_size()))
          .borders(Borders::ALL)
          .border_style(Style::default().fg(Color::Blue)),
      )
      .highlight_style(
        Style::default()
          .bg(Color::DarkGray)
          .add_modifier(Modifier::BOLD),
      )
      .highlight_symbol("> ");

    frame.render_stateful_widget(list, chunks[0], &mut self.list_state);
    frame.render_widget(Paragraph::new(self.status_line()), chunks[1]);
  }

  fn title(&self) -> &'static str {
    "Paginated"
  }

  fn tick(&mut self) {
    self.pages.poll();
  }

  fn shortcuts(&self) -> Vec<ShortcutInfo> {
    vec![
      ShortcutInfo::new("j/k", "move").with_priority(10),
      ShortcutInfo::new("m", "load more").with_priority(20),
      ShortcutInfo::new("r", "restart").with_priority(30),
      ShortcutInfo::new("q", "quit").with_priority(90),
    ]
  }
}
