//! Cached single-resource fetching.
//!
//! A `Resource<T>` owns the loading/error/data state for one URL, consults a
//! shared `ResponseCache` before touching the network, and runs the request on
//! the tokio runtime. The UI event loop calls `poll()` on each tick to pick up
//! completions; tests call `wait()`.
//!
//! # Example
//!
//! ```ignore
//! let cache = ResponseCache::new();
//! let mut first: Resource<Vec<Post>> = Resource::new(POSTS_URL, transport.clone(), cache.clone());
//! first.fetch(); // Loading, GET issued
//!
//! // ...later, once `first.poll()` has applied the response:
//! let mut second: Resource<Vec<Post>> = Resource::new(POSTS_URL, transport, cache);
//! second.fetch(); // Success right away, no request
//! assert!(second.served_from_cache());
//!
//! second.retry(); // evicts POSTS_URL and goes back to the network
//! ```

use serde::de::DeserializeOwned;
use std::sync::Arc;
use tokio::sync::oneshot;
use tracing::{debug, warn};

use super::cache::ResponseCache;
use super::error::FetchError;
use super::transport::Transport;

/// The state of a fetch
#[derive(Debug, Clone, PartialEq)]
pub enum FetchState<T> {
  /// Nothing requested yet
  Idle,
  /// A request is in flight
  Loading,
  /// The last request produced data
  Success(T),
  /// The last request failed; the message is ready for display
  Error(String),
}

impl<T> FetchState<T> {
  pub fn is_loading(&self) -> bool {
    matches!(self, FetchState::Loading)
  }

  pub fn data(&self) -> Option<&T> {
    match self {
      FetchState::Success(data) => Some(data),
      _ => None,
    }
  }

  pub fn error(&self) -> Option<&str> {
    match self {
      FetchState::Error(e) => Some(e),
      _ => None,
    }
  }
}

type Completion<T> = Result<T, FetchError>;

/// Fetch-with-cache state machine for a single URL.
///
/// Changing the URL or retrying while a request is in flight abandons the
/// older request: its result is never applied to this resource ("last request
/// wins"). The abandoned request still runs to completion and, if it
/// succeeds, still populates the cache under its own URL.
pub struct Resource<T> {
  url: String,
  transport: Arc<dyn Transport>,
  cache: ResponseCache,
  state: FetchState<T>,
  from_cache: bool,
  receiver: Option<oneshot::Receiver<Completion<T>>>,
}

impl<T> Resource<T>
where
  T: DeserializeOwned + Send + 'static,
{
  pub fn new(url: impl Into<String>, transport: Arc<dyn Transport>, cache: ResponseCache) -> Self {
    Self {
      url: url.into(),
      transport,
      cache,
      state: FetchState::Idle,
      from_cache: false,
      receiver: None,
    }
  }

  pub fn url(&self) -> &str {
    &self.url
  }

  pub fn state(&self) -> &FetchState<T> {
    &self.state
  }

  pub fn data(&self) -> Option<&T> {
    self.state.data()
  }

  pub fn error(&self) -> Option<&str> {
    self.state.error()
  }

  pub fn is_loading(&self) -> bool {
    self.state.is_loading()
  }

  /// Whether the current data was served from the cache rather than the network.
  pub fn served_from_cache(&self) -> bool {
    self.from_cache && matches!(self.state, FetchState::Success(_))
  }

  /// Load the current URL, from the cache when possible.
  ///
  /// A cache hit resolves synchronously without a request. No-op for an empty
  /// URL or while a request for this URL is already in flight.
  pub fn fetch(&mut self) {
    if self.url.is_empty() || self.state.is_loading() {
      return;
    }

    if let Some(body) = self.cache.get(&self.url) {
      debug!(url = %self.url, "served from cache");
      match serde_json::from_value(body) {
        Ok(data) => {
          self.state = FetchState::Success(data);
          self.from_cache = true;
        }
        Err(e) => self.fail(FetchError::decode(e)),
      }
      return;
    }

    self.start_fetch();
  }

  /// Point the resource at a different URL and load it.
  #[allow(dead_code)]
  pub fn set_url(&mut self, url: impl Into<String>) {
    let url = url.into();
    if url == self.url {
      return;
    }
    self.url = url;
    self.abandon();
    self.fetch();
  }

  /// Evict this URL from the cache and fetch it again, whatever the state.
  pub fn retry(&mut self) {
    if self.cache.invalidate(&self.url) {
      debug!(url = %self.url, "evicted for retry");
    }
    self.abandon();
    self.fetch();
  }

  /// Apply a finished request, if any.
  ///
  /// Returns `true` if the state changed. Call this from the event loop tick.
  pub fn poll(&mut self) -> bool {
    let receiver = match &mut self.receiver {
      Some(rx) => rx,
      None => return false,
    };

    match receiver.try_recv() {
      Ok(result) => {
        self.receiver = None;
        self.complete(result);
        true
      }
      Err(oneshot::error::TryRecvError::Empty) => false,
      Err(oneshot::error::TryRecvError::Closed) => {
        self.receiver = None;
        self.complete(Err(FetchError::transport("Request was cancelled")));
        true
      }
    }
  }

  /// Wait for the in-flight request, if any, and apply it.
  ///
  /// Returns `false` when nothing was in flight.
  #[cfg(test)]
  pub async fn wait(&mut self) -> bool {
    let receiver = match self.receiver.take() {
      Some(rx) => rx,
      None => return false,
    };

    let result = receiver
      .await
      .unwrap_or_else(|_| Err(FetchError::transport("Request was cancelled")));
    self.complete(result);
    true
  }

  /// Forget the in-flight request so its result is dropped on arrival.
  fn abandon(&mut self) {
    if self.receiver.take().is_some() {
      debug!(url = %self.url, "abandoned in-flight request");
    }
    if self.state.is_loading() {
      self.state = FetchState::Idle;
    }
  }

  fn start_fetch(&mut self) {
    let (tx, rx) = oneshot::channel();
    self.receiver = Some(rx);
    self.state = FetchState::Loading;
    self.from_cache = false;

    let transport = Arc::clone(&self.transport);
    let cache = self.cache.clone();
    let url = self.url.clone();
    debug!(%url, "fetching");

    tokio::spawn(async move {
      let result = load::<T>(transport.as_ref(), &cache, &url).await;
      // Receiver is gone when the request was abandoned
      let _ = tx.send(result);
    });
  }

  fn complete(&mut self, result: Completion<T>) {
    match result {
      Ok(data) => {
        self.state = FetchState::Success(data);
        self.from_cache = false;
      }
      Err(e) => self.fail(e),
    }
  }

  fn fail(&mut self, err: FetchError) {
    warn!(url = %self.url, error = %err, "fetch failed");
    self.state = FetchState::Error(err.to_string());
    self.from_cache = false;
  }
}

/// GET `url`, decode it as `T`, and cache the raw body once it decodes.
async fn load<T: DeserializeOwned>(
  transport: &dyn Transport,
  cache: &ResponseCache,
  url: &str,
) -> Result<T, FetchError> {
  let body = transport.get(url).await?.into_json()?;
  let data = serde_json::from_value(body.clone()).map_err(FetchError::decode)?;
  cache.insert(url, body);
  debug!(url, entries = cache.len(), "response cached");
  Ok(data)
}

impl<T: std::fmt::Debug> std::fmt::Debug for Resource<T> {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Resource")
      .field("url", &self.url)
      .field("state", &self.state)
      .field("from_cache", &self.from_cache)
      .finish_non_exhaustive()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::api::Post;
  use crate::fetch::error::GENERIC_FAILURE;
  use crate::fetch::stub::{post_json, StubReply, StubTransport};
  use serde_json::{json, Value};
  use std::time::Duration;

  const POSTS: &str = "https://api.test/posts";

  fn posts_stub() -> Arc<StubTransport> {
    Arc::new(StubTransport::new(|_| {
      StubReply::Json(json!([post_json(1), post_json(2)]))
    }))
  }

  fn resource(stub: &Arc<StubTransport>, cache: &ResponseCache, url: &str) -> Resource<Vec<Post>> {
    Resource::new(url, stub.clone(), cache.clone())
  }

  #[tokio::test]
  async fn test_first_fetch_loads_then_succeeds() {
    let stub = posts_stub();
    let cache = ResponseCache::new();
    let mut posts = resource(&stub, &cache, POSTS);

    assert_eq!(posts.state(), &FetchState::Idle);
    posts.fetch();
    assert!(posts.is_loading());
    assert!(posts.data().is_none() && posts.error().is_none());

    assert!(posts.wait().await);
    assert!(!posts.is_loading());
    assert_eq!(posts.data().map(Vec::len), Some(2));
    assert!(posts.error().is_none());
    assert!(!posts.served_from_cache());
    assert!(cache.contains(POSTS));
  }

  #[tokio::test]
  async fn test_second_resource_is_served_from_cache_synchronously() {
    let stub = posts_stub();
    let cache = ResponseCache::new();

    let mut first = resource(&stub, &cache, POSTS);
    first.fetch();
    first.wait().await;

    let mut second = resource(&stub, &cache, POSTS);
    second.fetch();
    assert!(!second.is_loading());
    assert_eq!(second.data(), first.data());
    assert!(second.served_from_cache());
    assert_eq!(stub.call_count(), 1);
  }

  #[tokio::test]
  async fn test_retry_bypasses_cache_and_overwrites_it() {
    let counter = Arc::new(std::sync::atomic::AtomicU64::new(0));
    let counter_clone = counter.clone();
    let stub = Arc::new(StubTransport::new(move |_| {
      let n = counter_clone.fetch_add(1, std::sync::atomic::Ordering::SeqCst) + 1;
      StubReply::Json(json!([post_json(n)]))
    }));
    let cache = ResponseCache::new();

    let mut posts = resource(&stub, &cache, POSTS);
    posts.fetch();
    posts.wait().await;
    assert_eq!(posts.data().unwrap()[0].id, 1);

    posts.retry();
    assert!(posts.is_loading());
    posts.wait().await;

    assert_eq!(stub.call_count(), 2);
    assert_eq!(posts.data().unwrap()[0].id, 2);
    assert_eq!(cache.get(POSTS).unwrap()[0]["id"], 2);
  }

  #[tokio::test]
  async fn test_error_status_is_reported_and_not_cached() {
    let stub = Arc::new(StubTransport::new(|_| StubReply::Status(500)));
    let cache = ResponseCache::new();
    let mut posts = resource(&stub, &cache, POSTS);

    posts.fetch();
    posts.wait().await;

    assert_eq!(posts.error(), Some("HTTP error! status: 500"));
    assert!(posts.data().is_none());
    assert!(cache.is_empty());
  }

  #[tokio::test]
  async fn test_transport_failure_message() {
    let stub = Arc::new(StubTransport::new(|url| {
      if url.ends_with("/silent") {
        StubReply::Fail(String::new())
      } else {
        StubReply::Fail("connection refused".to_string())
      }
    }));
    let cache = ResponseCache::new();

    let mut loud = resource(&stub, &cache, POSTS);
    loud.fetch();
    loud.wait().await;
    assert_eq!(loud.error(), Some("connection refused"));

    let mut silent = resource(&stub, &cache, "https://api.test/silent");
    silent.fetch();
    silent.wait().await;
    assert_eq!(silent.error(), Some(GENERIC_FAILURE));
  }

  #[tokio::test]
  async fn test_wrong_shape_is_a_decode_error() {
    let stub = Arc::new(StubTransport::new(|_| StubReply::Json(json!({"not": "a list"}))));
    let cache = ResponseCache::new();
    let mut posts = resource(&stub, &cache, POSTS);

    posts.fetch();
    posts.wait().await;

    assert!(posts.error().unwrap().starts_with("Failed to decode response"));
    assert!(cache.is_empty());
  }

  #[tokio::test]
  async fn test_empty_url_is_noop() {
    let stub = posts_stub();
    let cache = ResponseCache::new();
    let mut posts = resource(&stub, &cache, "");

    posts.fetch();
    assert_eq!(posts.state(), &FetchState::Idle);
    assert!(!posts.wait().await);
    assert_eq!(stub.call_count(), 0);
  }

  #[tokio::test]
  async fn test_set_url_uses_cache_for_known_identifier() {
    let stub = Arc::new(StubTransport::new(|url| {
      StubReply::Json(Value::String(url.to_string()))
    }));
    let cache = ResponseCache::new();
    let mut page: Resource<String> = Resource::new("https://api.test/a", stub.clone(), cache.clone());

    page.fetch();
    page.wait().await;
    page.set_url("https://api.test/b");
    page.wait().await;
    assert_eq!(page.data().map(String::as_str), Some("https://api.test/b"));

    page.set_url("https://api.test/a");
    assert!(page.served_from_cache());
    assert_eq!(page.data().map(String::as_str), Some("https://api.test/a"));
    assert_eq!(stub.call_count(), 2);
  }

  #[tokio::test]
  async fn test_stale_response_does_not_overwrite_newer_identifier() {
    let stub = Arc::new(StubTransport::new(|url| {
      let body = StubReply::Json(Value::String(url.to_string()));
      if url.ends_with("/slow") {
        StubReply::Delayed(Duration::from_millis(50), Box::new(body))
      } else {
        body
      }
    }));
    let cache = ResponseCache::new();
    let mut page: Resource<String> =
      Resource::new("https://api.test/slow", stub.clone(), cache.clone());

    page.fetch();
    page.set_url("https://api.test/fast");
    page.wait().await;
    assert_eq!(page.data().map(String::as_str), Some("https://api.test/fast"));

    // Let the abandoned request finish
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(!page.poll());
    assert_eq!(page.data().map(String::as_str), Some("https://api.test/fast"));
    // It still landed in the cache under its own key
    assert!(cache.contains("https://api.test/slow"));
  }

  #[tokio::test]
  async fn test_poll_picks_up_completion() {
    let stub = posts_stub();
    let cache = ResponseCache::new();
    let mut posts = resource(&stub, &cache, POSTS);

    posts.fetch();
    tokio::time::sleep(Duration::from_millis(20)).await;

    assert!(posts.poll());
    assert!(posts.data().is_some());
    assert!(!posts.poll());
  }
}
