use crate::api::Post;
use crate::fetch::{FetchState, ResponseCache, Resource, Transport};
use crate::ui::ensure_valid_selection;
use crate::ui::renderfns::truncate;
use crate::ui::view::{ShortcutInfo, View, ViewAction};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap};
use std::sync::Arc;

/// First few posts, fetched once and then served from the shared cache
pub struct PostsView {
  resource: Resource<Vec<Post>>,
  preview_count: usize,
  list_state: ListState,
}

impl PostsView {
  /// Starts fetching immediately; a warm cache resolves before this returns.
  pub fn new(
    url: &str,
    transport: Arc<dyn Transport>,
    cache: ResponseCache,
    preview_count: usize,
  ) -> Self {
    let mut resource = Resource::new(url, transport, cache);
    resource.fetch();

    Self {
      resource,
      preview_count,
      list_state: ListState::default(),
    }
  }

  fn visible(&self) -> &[Post] {
    match self.resource.data() {
      Some(posts) => &posts[..posts.len().min(self.preview_count)],
      None => &[],
    }
  }

  fn status_line(&self) -> Line<'static> {
    match self.resource.state() {
      FetchState::Idle => Line::raw(""),
      FetchState::Loading => Line::styled("Loading posts...", Style::default().fg(Color::Yellow)),
      FetchState::Error(message) => Line::from(vec![
        Span::styled(format!("Error: {}", message), Style::default().fg(Color::Red)),
        Span::styled("  (r to retry)", Style::default().fg(Color::DarkGray)),
      ]),
      FetchState::Success(posts) => {
        let source = if self.resource.served_from_cache() {
          Span::styled("cached", Style::default().fg(Color::Green))
        } else {
          Span::styled("network", Style::default().fg(Color::Cyan))
        };
        Line::from(vec![
          Span::raw(format!(
            "Showing {} of {} posts from ",
            posts.len().min(self.preview_count),
            posts.len()
          )),
          source,
        ])
      }
    }
  }

  fn render_list(&mut self, frame: &mut Frame, area: Rect) {
    let len = self.visible().len();
    ensure_valid_selection(&mut self.list_state, len);

    let items: Vec<ListItem> = self
      .visible()
      .iter()
      .map(|post| {
        ListItem::new(Line::from(vec![
          Span::styled(format!("{:>4} ", post.id), Style::default().fg(Color::DarkGray)),
          Span::raw(truncate(&post.title, 60)),
        ]))
      })
      .collect();

    let list = List::new(items)
      .block(
        Block::default()
          .title(format!(" Posts · {} ", self.resource.url()))
          .borders(Borders::ALL)
          .border_style(Style::default().fg(Color::Blue)),
      )
      .highlight_style(
        Style::default()
          .bg(Color::DarkGray)
          .add_modifier(Modifier::BOLD),
      )
      .highlight_symbol("> ");

    frame.render_stateful_widget(list, area, &mut self.list_state);
  }

  fn render_detail(&self, frame: &mut Frame, area: Rect) {
    let block = Block::default().title(" Post ").borders(Borders::ALL);
    let selected = self
      .list_state
      .selected()
      .and_then(|i| self.visible().get(i));

    let text = match selected {
      Some(post) => vec![
        Line::styled(
          post.title.clone(),
          Style::default().add_modifier(Modifier::BOLD),
        ),
        Line::styled(
          format!("post #{} by user #{}", post.id, post.user_id),
          Style::default().fg(Color::DarkGray),
        ),
        Line::raw(""),
        Line::raw(post.body.clone()),
      ],
      None if self.resource.is_loading() => vec![Line::styled(
        "Loading...",
        Style::default().fg(Color::Yellow),
      )],
      None => match self.resource.error() {
        Some(_) => vec![Line::styled(
          "Nothing to show. Press r to fetch again.",
          Style::default().fg(Color::DarkGray),
        )],
        None => vec![],
      },
    };

    frame.render_widget(
      Paragraph::new(text).block(block).wrap(Wrap { trim: true }),
      area,
    );
  }
}

impl View for PostsView {
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
    match key.code {
      KeyCode::Char('j') | KeyCode::Down => self.list_state.select_next(),
      KeyCode::Char('k') | KeyCode::Up => self.list_state.select_previous(),
      KeyCode::Char('r') => self.resource.retry(),
      KeyCode::Char('q') => return ViewAction::Quit,
      _ => {}
    }
    ViewAction::None
  }

  fn render(&mut self, frame: &mut Frame, area: Rect) {
    let chunks = Layout::default()
      .direction(Direction::Vertical)
      .constraints([Constraint::Length(1), Constraint::Min(1)])
      .split(area);
    frame.render_widget(Paragraph::new(self.status_line()), chunks[0]);

    let panes = Layout::default()
      .direction(Direction::Horizontal)
      .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
      .split(chunks[1]);
    self.render_list(frame, panes[0]);
    self.render_detail(frame, panes[1]);
  }

  fn title(&self) -> &'static str {
    "Posts"
  }

  fn tick(&mut self) {
    self.resource.poll();
  }

  fn shortcuts(&self) -> Vec<ShortcutInfo> {
    vec![
      ShortcutInfo::new("j/k", "move").with_priority(10),
      ShortcutInfo::new("r", "refetch").with_priority(20),
      ShortcutInfo::new("q", "quit").with_priority(90),
    ]
  }
}
