//! Response cache shared by every `Resource` built from the same handle.

use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::trace;

/// Parsed response bodies keyed by request URL.
///
/// Cloning the handle shares the table; a separate `ResponseCache::new()` is a
/// separate table. Entries live until invalidated or the cache is dropped.
/// There is no in-flight de-duplication: two callers missing on the same URL
/// both hit the network and the later completion wins.
#[derive(Debug, Clone, Default)]
pub struct ResponseCache {
  entries: Arc<Mutex<HashMap<String, Value>>>,
}

impl ResponseCache {
  pub fn new() -> Self {
    Self::default()
  }

  fn lock(&self) -> MutexGuard<'_, HashMap<String, Value>> {
    // A panic while holding the lock cannot leave a half-written entry
    self.entries.lock().unwrap_or_else(PoisonError::into_inner)
  }

  pub fn get(&self, url: &str) -> Option<Value> {
    let hit = self.lock().get(url).cloned();
    trace!(url, hit = hit.is_some(), "cache lookup");
    hit
  }

  #[cfg(test)]
  pub fn contains(&self, url: &str) -> bool {
    self.lock().contains_key(url)
  }

  pub fn insert(&self, url: impl Into<String>, body: Value) {
    self.lock().insert(url.into(), body);
  }

  /// Drop the entry for `url`, returning whether one existed.
  pub fn invalidate(&self, url: &str) -> bool {
    self.lock().remove(url).is_some()
  }

  pub fn len(&self) -> usize {
    self.lock().len()
  }

  #[cfg(test)]
  pub fn is_empty(&self) -> bool {
    self.lock().is_empty()
  }
}
