//! Page accumulator for `_page`/`_limit` style collection endpoints.

use serde::de::DeserializeOwned;
use std::sync::Arc;
use tokio::sync::oneshot;
use tracing::{debug, info, warn};
use url::Url;

use super::error::FetchError;
use super::transport::Transport;

/// How a page's items join the accumulated list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PageMode {
  /// Replace everything (first load and retry)
  Reset,
  /// Append after what is already there
  Append,
}

struct PageResult<T> {
  items: Vec<T>,
  total: Option<u64>,
}

struct PendingPage<T> {
  page: u32,
  mode: PageMode,
  receiver: oneshot::Receiver<Result<PageResult<T>, FetchError>>,
}

/// Accumulates pages of a collection in arrival order.
///
/// End of data is a heuristic: a page shorter than `page_size` is the last
/// one. A known total (configured, or reported by the server in
/// `X-Total-Count`) also stops paging once reached. Without either, a
/// collection whose size is an exact multiple of the page size costs one
/// extra empty request to discover the end.
pub struct Paginated<T> {
  base_url: String,
  page_size: u32,
  known_total: Option<u64>,
  transport: Arc<dyn Transport>,
  items: Vec<T>,
  page: u32,
  has_more: bool,
  error: Option<String>,
  pending: Option<PendingPage<T>>,
}

impl<T> Paginated<T>
where
  T: DeserializeOwned + Send + 'static,
{
  pub fn new(base_url: impl Into<String>, page_size: u32, transport: Arc<dyn Transport>) -> Self {
    Self {
      base_url: base_url.into(),
      page_size: page_size.max(1),
      known_total: None,
      transport,
      items: Vec::new(),
      page: 1,
      has_more: true,
      error: None,
      pending: None,
    }
  }

  /// Stop paging once `total` items are known to exist.
  pub fn with_total(mut self, total: u64) -> Self {
    self.known_total = Some(total);
    self
  }

  pub fn items(&self) -> &[T] {
    &self.items
  }

  /// Highest page loaded so far
  pub fn page(&self) -> u32 {
    self.page
  }

  pub fn page_size(&self) -> u32 {
    self.page_size
  }

  pub fn has_more(&self) -> bool {
    self.has_more
  }

  pub fn is_loading(&self) -> bool {
    self.pending.is_some()
  }

  pub fn error(&self) -> Option<&str> {
    self.error.as_deref()
  }

  /// Initial load: page 1, replacing whatever is held.
  pub fn start(&mut self) {
    self.fetch_page(1, PageMode::Reset);
  }

  /// Request the next page.
  ///
  /// Returns `false` without doing anything while a page is in flight or once
  /// the end has been reached.
  pub fn load_more(&mut self) -> bool {
    if self.is_loading() || !self.has_more {
      return false;
    }
    self.fetch_page(self.page + 1, PageMode::Append);
    true
  }

  /// Start over from page 1, dropping accumulated items and any in-flight page.
  pub fn retry(&mut self) {
    info!(base_url = %self.base_url, "restarting pagination");
    self.page = 1;
    self.items.clear();
    self.has_more = true;
    self.pending = None;
    self.fetch_page(1, PageMode::Reset);
  }

  /// Apply a finished page, if any. Returns `true` if the state changed.
  pub fn poll(&mut self) -> bool {
    let pending = match &mut self.pending {
      Some(p) => p,
      None => return false,
    };

    let result = match pending.receiver.try_recv() {
      Ok(result) => result,
      Err(oneshot::error::TryRecvError::Empty) => return false,
      Err(oneshot::error::TryRecvError::Closed) => {
        Err(FetchError::transport("Request was cancelled"))
      }
    };

    if let Some(pending) = self.pending.take() {
      self.complete(pending.page, pending.mode, result);
    }
    true
  }

  /// Wait for the in-flight page, if any, and apply it.
  #[cfg(test)]
  pub async fn wait(&mut self) -> bool {
    let pending = match self.pending.take() {
      Some(p) => p,
      None => return false,
    };

    let result = pending
      .receiver
      .await
      .unwrap_or_else(|_| Err(FetchError::transport("Request was cancelled")));
    self.complete(pending.page, pending.mode, result);
    true
  }

  fn fetch_page(&mut self, page: u32, mode: PageMode) {
    self.error = None;

    let url = match page_url(&self.base_url, page, self.page_size) {
      Ok(url) => url,
      Err(e) => {
        self.complete(page, mode, Err(e));
        return;
      }
    };

    let (tx, rx) = oneshot::channel();
    self.pending = Some(PendingPage {
      page,
      mode,
      receiver: rx,
    });

    let transport = Arc::clone(&self.transport);
    debug!(%url, page, "fetching page");

    tokio::spawn(async move {
      let result = load_page::<T>(transport.as_ref(), &url).await;
      let _ = tx.send(result);
    });
  }

  fn complete(&mut self, page: u32, mode: PageMode, result: Result<PageResult<T>, FetchError>) {
    match result {
      Ok(result) => {
        let received = result.items.len() as u64;
        match mode {
          PageMode::Reset => self.items = result.items,
          PageMode::Append => self.items.extend(result.items),
        }
        self.page = page;

        let total = self.known_total.or(result.total);
        let full_page = received == u64::from(self.page_size);
        let below_total = total.map_or(true, |t| u64::from(page) * u64::from(self.page_size) < t);
        self.has_more = full_page && below_total;

        debug!(
          page,
          received,
          accumulated = self.items.len(),
          has_more = self.has_more,
          "page loaded"
        );
      }
      Err(e) => {
        warn!(base_url = %self.base_url, page, error = %e, "page fetch failed");
        self.error = Some(e.to_string());
      }
    }
  }
}

/// Build the URL for one page, keeping any query the base already carries.
pub fn page_url(base_url: &str, page: u32, limit: u32) -> Result<String, FetchError> {
  let mut url = Url::parse(base_url)
    .map_err(|e| FetchError::transport(format!("Invalid URL {}: {}", base_url, e)))?;
  url
    .query_pairs_mut()
    .append_pair("_page", &page.to_string())
    .append_pair("_limit", &limit.to_string());
  Ok(url.into())
}

async fn load_page<T: DeserializeOwned>(
  transport: &dyn Transport,
  url: &str,
) -> Result<PageResult<T>, FetchError> {
  let response = transport.get(url).await?;
  let total = response.total_count;
  let body = response.into_json()?;
  let items = serde_json::from_value(body).map_err(FetchError::decode)?;
  Ok(PageResult { items, total })
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::api::Post;
  use crate::fetch::stub::{paged_posts, post_json, StubReply, StubTransport};
  use serde_json::json;
  use std::sync::atomic::{AtomicBool, Ordering};

  const BASE: &str = "https://api.test/posts";

  fn paged(stub: &Arc<StubTransport>) -> Paginated<Post> {
    Paginated::new(BASE, 10, stub.clone())
  }

  #[test]
  fn test_page_url() {
    assert_eq!(
      page_url(BASE, 3, 10).unwrap(),
      "https://api.test/posts?_page=3&_limit=10"
    );
    assert_eq!(
      page_url("https://api.test/posts?userId=2", 1, 5).unwrap(),
      "https://api.test/posts?userId=2&_page=1&_limit=5"
    );
    assert!(page_url("not a url", 1, 10).is_err());
  }

  #[tokio::test]
  async fn test_nine_load_more_calls_reach_known_total() {
    let stub = Arc::new(StubTransport::new(paged_posts(100, false)));
    let mut posts = paged(&stub).with_total(100);

    posts.start();
    posts.wait().await;
    for _ in 0..9 {
      assert!(posts.load_more());
      posts.wait().await;
    }

    assert_eq!(posts.items().len(), 100);
    assert_eq!(posts.page(), 10);
    assert!(!posts.has_more());

    assert!(!posts.load_more());
    assert!(!posts.is_loading());
    assert_eq!(stub.call_count(), 10);
  }

  #[tokio::test]
  async fn test_total_count_header_bounds_paging() {
    let stub = Arc::new(StubTransport::new(paged_posts(30, true)));
    let mut posts = paged(&stub);

    posts.start();
    posts.wait().await;
    posts.load_more();
    posts.wait().await;
    posts.load_more();
    posts.wait().await;

    assert_eq!(posts.items().len(), 30);
    assert!(!posts.has_more());
  }

  #[tokio::test]
  async fn test_without_total_needs_an_empty_page_to_stop() {
    let stub = Arc::new(StubTransport::new(paged_posts(20, false)));
    let mut posts = paged(&stub);

    posts.start();
    posts.wait().await;
    posts.load_more();
    posts.wait().await;
    assert!(posts.has_more());

    posts.load_more();
    posts.wait().await;
    assert_eq!(posts.items().len(), 20);
    assert!(!posts.has_more());
  }

  #[tokio::test]
  async fn test_short_page_ends_paging() {
    let stub = Arc::new(StubTransport::new(paged_posts(15, false)));
    let mut posts = paged(&stub);

    posts.start();
    posts.wait().await;
    posts.load_more();
    posts.wait().await;

    assert_eq!(posts.items().len(), 15);
    assert!(!posts.has_more());
  }

  #[tokio::test]
  async fn test_items_keep_arrival_order() {
    let stub = Arc::new(StubTransport::new(paged_posts(100, false)));
    let mut posts = paged(&stub);

    posts.start();
    posts.wait().await;
    posts.load_more();
    posts.wait().await;

    let ids: Vec<u64> = posts.items().iter().map(|p| p.id).collect();
    assert_eq!(ids, (1..=20).collect::<Vec<_>>());
  }

  #[tokio::test]
  async fn test_retry_resets_to_first_page() {
    let stub = Arc::new(StubTransport::new(paged_posts(100, false)));
    let mut posts = paged(&stub);

    posts.start();
    posts.wait().await;
    for _ in 0..3 {
      posts.load_more();
      posts.wait().await;
    }
    assert_eq!(posts.items().len(), 40);

    posts.retry();
    assert!(posts.items().is_empty());
    assert_eq!(posts.page(), 1);
    assert!(posts.has_more());
    posts.wait().await;

    assert_eq!(posts.page(), 1);
    assert_eq!(posts.items().len(), 10);
    assert_eq!(posts.items()[0].id, 1);
  }

  #[tokio::test]
  async fn test_load_more_is_single_flight() {
    let stub = Arc::new(StubTransport::new(paged_posts(100, false)));
    let mut posts = paged(&stub);

    posts.start();
    posts.wait().await;

    assert!(posts.load_more());
    assert!(!posts.load_more());
    posts.wait().await;

    assert_eq!(stub.call_count(), 2);
    assert_eq!(posts.page(), 2);
  }

  #[tokio::test]
  async fn test_failed_page_keeps_accumulated_items() {
    let failing = Arc::new(AtomicBool::new(false));
    let failing_clone = failing.clone();
    let serve = paged_posts(100, false);
    let stub = Arc::new(StubTransport::new(move |url| {
      if failing_clone.load(Ordering::SeqCst) {
        StubReply::Status(502)
      } else {
        serve(url)
      }
    }));
    let mut posts = paged(&stub);

    posts.start();
    posts.wait().await;
    failing.store(true, Ordering::SeqCst);
    posts.load_more();
    posts.wait().await;

    assert_eq!(posts.error(), Some("HTTP error! status: 502"));
    assert_eq!(posts.items().len(), 10);
    assert_eq!(posts.page(), 1);
    assert!(posts.has_more());

    // The same page is asked for again once the server recovers
    failing.store(false, Ordering::SeqCst);
    posts.load_more();
    posts.wait().await;
    assert!(posts.error().is_none());
    assert_eq!(posts.page(), 2);
    assert_eq!(posts.items().len(), 20);
    assert!(stub.calls()[2].contains("_page=2"));
  }

  #[tokio::test]
  async fn test_reset_page_replaces_items() {
    let stub = Arc::new(StubTransport::new(|_| {
      StubReply::Json(json!([post_json(7)]))
    }));
    let mut posts = paged(&stub);

    posts.start();
    posts.wait().await;
    posts.retry();
    posts.wait().await;

    assert_eq!(posts.items().len(), 1);
    assert!(!posts.has_more());
  }

  #[tokio::test]
  async fn test_invalid_base_url_surfaces_as_error() {
    let stub = Arc::new(StubTransport::new(paged_posts(10, false)));
    let mut posts: Paginated<Post> = Paginated::new("::nope", 10, stub.clone());

    posts.start();

    assert!(!posts.is_loading());
    assert!(posts.error().unwrap().starts_with("Invalid URL"));
    assert_eq!(stub.call_count(), 0);
  }
}
