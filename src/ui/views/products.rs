use crate::catalog::{filter_products, price_bounds, unique_categories, Product};
use crate::filters::{FilterState, Location, MemoryHistory, PriceRange, UrlFilters};
use crate::ui::components::{CategoryBar, CategoryChanged, KeyResult, Prompt, PromptEvent};
use crate::ui::ensure_valid_selection;
use crate::ui::renderfns::{dollars, truncate};
use crate::ui::view::{ShortcutInfo, View, ViewAction};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph};

/// Filterable product catalog whose filters live in the address bar
pub struct ProductsView {
  filters: UrlFilters<MemoryHistory>,
  history: MemoryHistory,
  products: Vec<Product>,
  bounds: Option<PriceRange>,
  categories: CategoryBar,
  search: Prompt,
  address: Prompt,
  list_state: ListState,
  price_step: f64,
}

impl ProductsView {
  pub fn new(products: Vec<Product>, history: MemoryHistory, price_step: f64) -> Self {
    let filters = UrlFilters::new(history.clone());
    let mut categories = CategoryBar::new(unique_categories(&products));
    categories.select(&filters.filters().category);

    Self {
      filters,
      history,
      bounds: price_bounds(&products),
      products,
      categories,
      search: Prompt::new('/', "Search products"),
      address: Prompt::new('g', "Go to address"),
      list_state: ListState::default(),
      price_step,
    }
  }

  fn edit(&mut self, change: impl FnOnce(&mut FilterState)) {
    let mut next = self.filters.filters().clone();
    change(&mut next);
    let next = next.normalized();
    if &next != self.filters.filters() {
      self.filters.update_filters(next);
    }
  }

  fn shift_min(&mut self, delta: f64) {
    self.edit(|f| {
      let min = (f.price_range.min() + delta).max(0.0);
      f.price_range = f.price_range.with_min(min);
    });
  }

  /// Lowering stops at one step, since a zero max reads back as no bound.
  fn shift_max(&mut self, delta: f64) {
    let step = self.price_step;
    self.edit(|f| {
      let current = f.price_range.max();
      let max = (current + delta).max(current.min(step));
      f.price_range = f.price_range.with_max(max);
    });
  }

  /// Pick up back/forward or a typed address
  fn sync_from_location(&mut self) {
    if self.filters.sync() {
      self.categories.select(&self.filters.filters().category);
    }
  }

  fn handle_overlays(&mut self, key: KeyEvent) -> Option<ViewAction> {
    if !self.address.is_active() {
      let current = self.filters.filters().search_term.clone();
      match self.search.handle_key(key, &current) {
        KeyResult::Handled => return Some(ViewAction::None),
        KeyResult::Event(PromptEvent::Changed(term) | PromptEvent::Submitted(term)) => {
          self.edit(|f| f.search_term = term);
          return Some(ViewAction::None);
        }
        KeyResult::NotHandled => {}
      }
    }

    let current = self.history.query();
    match self.address.handle_key(key, &current) {
      KeyResult::Handled | KeyResult::Event(PromptEvent::Changed(_)) => Some(ViewAction::None),
      KeyResult::Event(PromptEvent::Submitted(query)) => {
        self.history.push(&query);
        self.sync_from_location();
        Some(ViewAction::None)
      }
      KeyResult::NotHandled => None,
    }
  }

  fn render_summary(&self, frame: &mut Frame, area: Rect, shown: usize) {
    let filters = self.filters.filters();
    let mut spans = vec![
      Span::styled("[price] ", Style::default().fg(Color::Yellow)),
      Span::raw(format!(
        "{} - {}",
        dollars(filters.price_range.min()),
        dollars(filters.price_range.max())
      )),
    ];
    if let Some(bounds) = self.bounds {
      spans.push(Span::styled(
        format!(" (catalog {} - {})", dollars(bounds.min()), dollars(bounds.max())),
        Style::default().fg(Color::DarkGray),
      ));
    }
    if !filters.search_term.is_empty() {
      spans.push(Span::styled("  [search] ", Style::default().fg(Color::Yellow)));
      spans.push(Span::raw(truncate(&filters.search_term, 24)));
    }
    if filters.is_default() {
      spans.push(Span::styled("  no filters", Style::default().fg(Color::DarkGray)));
    }
    spans.push(Span::styled(
      format!("  Showing {} of {} products", shown, self.products.len()),
      Style::default().fg(Color::Gray),
    ));

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
  }

  fn render_list(&mut self, frame: &mut Frame, area: Rect) {
    let filters = self.filters.filters().clone();
    let shown = filter_products(&self.products, &filters);
    ensure_valid_selection(&mut self.list_state, shown.len());

    let block = Block::default()
      .title(format!(" Products ({}) ", shown.len()))
      .title_alignment(Alignment::Center)
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Blue));

    if shown.is_empty() {
      let paragraph = Paragraph::new("No products found matching your criteria.")
        .block(block)
        .style(Style::default().fg(Color::DarkGray));
      frame.render_widget(paragraph, area);
      return;
    }

    let items: Vec<ListItem> = shown
      .iter()
      .map(|product| {
        let line = Line::from(vec![
          Span::styled(
            format!("{:<22}", truncate(&product.name, 22)),
            Style::default().fg(Color::Cyan),
          ),
          Span::raw(" "),
          Span::styled(
            format!("{:<12}", product.category),
            Style::default().fg(Color::Yellow),
          ),
          Span::styled(
            format!("{:>8}", dollars(product.price)),
            Style::default().fg(Color::Green),
          ),
          Span::raw("  "),
          Span::styled(
            truncate(product.description.as_deref().unwrap_or(""), 40),
            Style::default().fg(Color::DarkGray),
          ),
        ]);
        ListItem::new(line)
      })
      .collect();

    let list = List::new(items)
      .block(block)
      .highlight_style(
        Style::default()
          .bg(Color::DarkGray)
          .add_modifier(Modifier::BOLD),
      )
      .highlight_symbol("> ");

    frame.render_stateful_widget(list, area, &mut self.list_state);
  }
}

impl View for ProductsView {
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
    if let Some(action) = self.handle_overlays(key) {
      return action;
    }

    if let KeyResult::Event(CategoryChanged(category)) = self.categories.handle_key(key) {
      self.edit(|f| f.category = category);
      return ViewAction::None;
    }

    let step = self.price_step;
    match key.code {
      KeyCode::Char('j') | KeyCode::Down => self.list_state.select_next(),
      KeyCode::Char('k') | KeyCode::Up => self.list_state.select_previous(),
      KeyCode::Char('h') => self.shift_min(-step),
      KeyCode::Char('l') => self.shift_min(step),
      KeyCode::Char('H') => self.shift_max(-step),
      KeyCode::Char('L') => self.shift_max(step),
      KeyCode::Char('x') => {
        self.edit(|f| *f = FilterState::default());
        self.categories.select("");
      }
      KeyCode::Char('[') => {
        if self.history.back() {
          self.sync_from_location();
        }
      }
      KeyCode::Char(']') => {
        if self.history.forward() {
          self.sync_from_location();
        }
      }
      KeyCode::Char('q') => return ViewAction::Quit,
      _ => {}
    }
    ViewAction::None
  }

  fn render(&mut self, frame: &mut Frame, area: Rect) {
    let chunks = Layout::default()
      .direction(Direction::Vertical)
      .constraints([
        Constraint::Length(1), // Category tabs
        Constraint::Length(1), // Price and search summary
        Constraint::Min(1),    // Product list
      ])
      .split(area);

    let shown = filter_products(&self.products, self.filters.filters()).len();
    self.categories.render(frame, chunks[0]);
    self.render_summary(frame, chunks[1], shown);
    self.render_list(frame, chunks[2]);

    self.search.render_overlay(frame, chunks[2]);
    self.address.render_overlay(frame, chunks[2]);
  }

  fn title(&self) -> &'static str {
    "Products"
  }

  fn tick(&mut self) {
    self.sync_from_location();
  }

  fn is_editing(&self) -> bool {
    self.search.is_active() || self.address.is_active()
  }

  fn shortcuts(&self) -> Vec<ShortcutInfo> {
    vec![
      ShortcutInfo::new("/", "search").with_priority(10),
      ShortcutInfo::new("PgUp/PgDn", "category").with_priority(20),
      ShortcutInfo::new("h/l", "min").with_priority(30),
      ShortcutInfo::new("H/L", "max").with_priority(31),
      ShortcutInfo::new("x", "clear").with_priority(40),
      ShortcutInfo::new("g", "address").with_priority(50),
      ShortcutInfo::new("[/]", "back/fwd").with_priority(51),
      ShortcutInfo::new("q", "quit").with_priority(90),
    ]
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::catalog::sample_products;
  use crossterm::event::KeyModifiers;

  fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
  }

  fn view(query: &str) -> (ProductsView, MemoryHistory) {
    let history = MemoryHistory::new("/", query);
    (
      ProductsView::new(sample_products(), history.clone(), 10.0),
      history,
    )
  }

  #[test]
  fn test_category_bar_follows_initial_address() {
    let (view, _) = view("category=Home");
    assert_eq!(view.categories.selected(), "Home");
  }

  #[test]
  fn test_search_writes_address_per_keystroke() {
    let (mut view, history) = view("");
    for code in [KeyCode::Char('/'), KeyCode::Char('d'), KeyCode::Char('e')] {
      view.handle_key(key(code));
    }

    assert!(view.is_editing());
    assert_eq!(history.query(), "search=de");
    assert_eq!(history.replacements(), 2);
  }

  #[test]
  fn test_category_and_price_keys_update_address() {
    let (mut view, history) = view("");
    view.handle_key(key(KeyCode::PageDown));
    view.handle_key(key(KeyCode::Char('l')));
    view.handle_key(key(KeyCode::Char('H')));

    assert_eq!(history.query(), "category=Electronics&minPrice=10&maxPrice=990");
  }

  #[test]
  fn test_min_never_goes_negative_or_past_max() {
    let (mut view, history) = view("maxPrice=15");
    view.handle_key(key(KeyCode::Char('h')));
    assert_eq!(history.replacements(), 0);

    view.handle_key(key(KeyCode::Char('l')));
    view.handle_key(key(KeyCode::Char('l')));
    assert_eq!(view.filters.filters().price_range, PriceRange::new(15.0, 15.0));
  }

  #[test]
  fn test_max_stops_above_zero_and_survives_rebuild() {
    let (mut view, history) = view("maxPrice=10");
    view.handle_key(key(KeyCode::Char('H')));
    view.handle_key(key(KeyCode::Char('H')));

    assert_eq!(history.query(), "maxPrice=10");
    assert_eq!(history.replacements(), 0);

    let rebuilt = ProductsView::new(sample_products(), history.clone(), 10.0);
    assert_eq!(rebuilt.filters.filters(), view.filters.filters());
  }

  #[test]
  fn test_max_below_one_step_stays_put() {
    let (mut view, history) = view("maxPrice=5");
    view.handle_key(key(KeyCode::Char('H')));

    assert_eq!(view.filters.filters().price_range, PriceRange::new(0.0, 5.0));
    assert_eq!(history.replacements(), 0);
  }

  #[test]
  fn test_address_entry_and_back() {
    let (mut view, history) = view("category=Home");
    view.handle_key(key(KeyCode::Char('g')));
    view.handle_key(KeyEvent::new(KeyCode::Char('u'), KeyModifiers::CONTROL));
    for c in "category=Clothing".chars() {
      view.handle_key(key(KeyCode::Char(c)));
    }
    view.handle_key(key(KeyCode::Enter));

    assert_eq!(history.len(), 2);
    assert_eq!(view.filters.filters().category, "Clothing");
    assert_eq!(view.categories.selected(), "Clothing");

    view.handle_key(key(KeyCode::Char('[')));
    assert_eq!(view.filters.filters().category, "Home");
    assert_eq!(view.categories.selected(), "Home");
  }

  #[test]
  fn test_clear_resets_address() {
    let (mut view, history) = view("search=lamp&category=Home&minPrice=20");
    view.handle_key(key(KeyCode::Char('x')));

    assert_eq!(history.href(), "/");
    assert_eq!(view.categories.selected(), "");
  }
}
