use crate::api::ApiEndpoints;
use crate::catalog::sample_products;
use crate::config::Config;
use crate::event::{Event, EventHandler};
use crate::fetch::{HttpTransport, ResponseCache, Transport};
use crate::filters::MemoryHistory;
use crate::ui;
use crate::ui::view::{View, ViewAction};
use crate::ui::views::{PagedPostsView, PostsView, ProductsView};
use color_eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal::{
  disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::ExecutableCommand;
use ratatui::prelude::*;
use std::io::stdout;
use std::sync::Arc;
use tracing::{debug, info};

/// Top-level tabs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
  Products,
  Posts,
  Paginated,
}

impl Tab {
  pub const ALL: [Tab; 3] = [Tab::Products, Tab::Posts, Tab::Paginated];

  pub fn title(self) -> &'static str {
    match self {
      Tab::Products => "Products",
      Tab::Posts => "Posts",
      Tab::Paginated => "Paginated",
    }
  }

  pub fn index(self) -> usize {
    match self {
      Tab::Products => 0,
      Tab::Posts => 1,
      Tab::Paginated => 2,
    }
  }

  pub fn next(self) -> Self {
    Self::ALL[(self.index() + 1) % Self::ALL.len()]
  }

  pub fn prev(self) -> Self {
    Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
  }

  /// Tab for a digit key, `'1'` being the first
  pub fn from_digit(c: char) -> Option<Self> {
    let n = c.to_digit(10)? as usize;
    Self::ALL.get(n.checked_sub(1)?).copied()
  }
}

/// Everything that outlives a single view.
///
/// The response cache and the address bar history are shared by every view
/// built from this context, so switching tabs away and back reuses both.
pub struct AppContext {
  pub config: Config,
  pub endpoints: ApiEndpoints,
  pub transport: Arc<dyn Transport>,
  pub cache: ResponseCache,
  pub history: MemoryHistory,
}

impl AppContext {
  pub fn new(config: Config, transport: Arc<dyn Transport>) -> Result<Self> {
    let endpoints = config.endpoints()?;
    let history = MemoryHistory::new("/products", &config.catalog.initial_query);

    Ok(Self {
      config,
      endpoints,
      transport,
      cache: ResponseCache::new(),
      history,
    })
  }

  /// Build a fresh view for `tab`. Data loading starts immediately.
  pub fn build_view(&self, tab: Tab) -> Box<dyn View> {
    match tab {
      Tab::Products => Box::new(ProductsView::new(
        sample_products(),
        self.history.clone(),
        self.config.catalog.price_step,
      )),
      Tab::Posts => Box::new(PostsView::new(
        self.endpoints.posts(),
        Arc::clone(&self.transport),
        self.cache.clone(),
        self.config.posts.preview_count,
      )),
      Tab::Paginated => Box::new(PagedPostsView::new(
        self.endpoints.posts(),
        self.config.posts.page_size,
        self.config.posts.total,
        Arc::clone(&self.transport),
      )),
    }
  }
}

/// Main application state
pub struct App {
  ctx: AppContext,
  active: Tab,
  view: Box<dyn View>,
  should_quit: bool,
}

impl App {
  pub fn new(config: Config) -> Result<Self> {
    let transport: Arc<dyn Transport> = Arc::new(HttpTransport::new(config.request_timeout())?);
    Self::with_context(AppContext::new(config, transport)?)
  }

  pub fn with_context(ctx: AppContext) -> Result<Self> {
    let active = Tab::Products;
    let view = ctx.build_view(active);
    Ok(Self {
      ctx,
      active,
      view,
      should_quit: false,
    })
  }

  pub async fn run(&mut self) -> Result<()> {
    let mut terminal = TerminalGuard::enter()?;
    let mut events = EventHandler::new(self.ctx.config.tick_rate());
    info!(tab = self.active.title(), "started");

    while !self.should_quit {
      terminal.draw(|frame| ui::draw(frame, self))?;

      match events.next().await {
        Some(Event::Key(key)) => self.handle_key(key),
        Some(Event::Resize) | Some(Event::Tick) => {}
        None => break,
      }
      // Pick up finished fetches and navigation after every event
      self.view.tick();
    }

    info!("exiting");
    Ok(())
  }

  pub fn tab_titles(&self) -> Vec<&'static str> {
    Tab::ALL.iter().map(|t| t.title()).collect()
  }

  pub fn active_index(&self) -> usize {
    self.active.index()
  }

  pub fn href(&self) -> String {
    self.ctx.history.href()
  }

  /// Whether back and forward are available in the address bar history
  pub fn history_arrows(&self) -> (bool, bool) {
    (self.ctx.history.can_go_back(), self.ctx.history.can_go_forward())
  }

  pub fn view(&self) -> &dyn View {
    self.view.as_ref()
  }

  pub fn view_mut(&mut self) -> &mut dyn View {
    self.view.as_mut()
  }

  /// Replace the current view with a fresh one for `tab`.
  pub fn switch_to(&mut self, tab: Tab) {
    if tab == self.active {
      return;
    }
    debug!(from = self.active.title(), to = tab.title(), "switching tab");
    self.active = tab;
    self.view = self.ctx.build_view(tab);
  }

  pub fn handle_key(&mut self, key: KeyEvent) {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
      self.should_quit = true;
      return;
    }

    // Typing into a prompt must not switch tabs
    if !self.view.is_editing() {
      match key.code {
        KeyCode::Tab => return self.switch_to(self.active.next()),
        KeyCode::BackTab => return self.switch_to(self.active.prev()),
        KeyCode::Char(c) => {
          if let Some(tab) = Tab::from_digit(c) {
            return self.switch_to(tab);
          }
        }
        _ => {}
      }
    }

    match self.view.handle_key(key) {
      ViewAction::Quit => self.should_quit = true,
      ViewAction::None => {}
    }
  }
}

/// Raw mode and the alternate screen for as long as this lives
struct TerminalGuard {
  terminal: Terminal<CrosstermBackend<std::io::Stdout>>,
}

impl TerminalGuard {
  fn enter() -> Result<Self> {
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let terminal = Terminal::new(CrosstermBackend::new(stdout()))?;
    Ok(Self { terminal })
  }
}

impl std::ops::Deref for TerminalGuard {
  type Target = Terminal<CrosstermBackend<std::io::Stdout>>;

  fn deref(&self) -> &Self::Target {
    &self.terminal
  }
}

impl std::ops::DerefMut for TerminalGuard {
  fn deref_mut(&mut self) -> &mut Self::Target {
    &mut self.terminal
  }
}

impl Drop for TerminalGuard {
  fn drop(&mut self) {
    // Restore even when the loop bailed out with an error
    let _ = disable_raw_mode();
    let _ = stdout().execute(LeaveAlternateScreen);
    let _ = self.terminal.show_cursor();
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::fetch::stub::{post_json, StubReply, StubTransport};
  use crate::filters::Location;
  use serde_json::Value;

  fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
  }

  fn test_app(stub: Arc<StubTransport>) -> App {
    let ctx = AppContext::new(Config::default(), stub).unwrap();
    App::with_context(ctx).unwrap()
  }

  fn posts_stub() -> Arc<StubTransport> {
    Arc::new(StubTransport::new(|_| {
      StubReply::Json(Value::Array((1..=3).map(post_json).collect()))
    }))
  }

  #[test]
  fn test_tab_cycling() {
    assert_eq!(Tab::Products.next(), Tab::Posts);
    assert_eq!(Tab::Paginated.next(), Tab::Products);
    assert_eq!(Tab::Products.prev(), Tab::Paginated);
    assert_eq!(Tab::from_digit('3'), Some(Tab::Paginated));
    assert_eq!(Tab::from_digit('0'), None);
    assert_eq!(Tab::from_digit('4'), None);
  }

  #[tokio::test]
  async fn test_digit_keys_switch_tabs() {
    let mut app = test_app(posts_stub());
    app.handle_key(key(KeyCode::Char('2')));
    assert_eq!(app.active, Tab::Posts);
    assert_eq!(app.view().title(), "Posts");

    app.handle_key(key(KeyCode::BackTab));
    assert_eq!(app.active, Tab::Products);
  }

  #[tokio::test]
  async fn test_digits_go_to_prompt_while_editing() {
    let mut app = test_app(posts_stub());
    app.handle_key(key(KeyCode::Char('/')));
    app.handle_key(key(KeyCode::Char('2')));

    assert_eq!(app.active, Tab::Products);
    assert_eq!(app.ctx.history.query(), "search=2");
  }

  #[tokio::test]
  async fn test_filters_survive_tab_switch() {
    let mut app = test_app(posts_stub());
    app.handle_key(key(KeyCode::PageDown));
    app.handle_key(key(KeyCode::Char('2')));
    app.handle_key(key(KeyCode::Char('1')));

    assert_eq!(app.href(), "/products?category=Electronics");
  }

  #[test]
  fn test_quit_keys() {
    let mut app = test_app(posts_stub());
    app.handle_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
    assert!(app.should_quit);

    let mut app = test_app(posts_stub());
    app.handle_key(key(KeyCode::Char('q')));
    assert!(app.should_quit);
  }
}
