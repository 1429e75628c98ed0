//! Address bar abstraction.
//!
//! Filter sync only needs three things from wherever the "current URL" lives:
//! read its query, replace its query in place, and hear about navigation it
//! did not cause. `MemoryHistory` provides them for the terminal app and tests.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::mpsc;
use tracing::{debug, trace};

/// Notification that the location changed underneath its readers
/// (back/forward, or a navigation by someone else).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Navigated;

/// Capability to read and rewrite the current query string.
pub trait Location: Send + Sync {
  /// Current query string without the leading `?`
  fn query(&self) -> String;

  /// Rewrite the current entry's query in place. Subscribers are not notified.
  fn replace_query(&self, query: &str);

  /// Receive a `Navigated` for every navigation from now on.
  fn subscribe(&self) -> mpsc::UnboundedReceiver<Navigated>;
}

#[derive(Debug)]
struct HistoryInner {
  path: String,
  entries: Vec<String>,
  index: usize,
  replacements: usize,
  subscribers: Vec<mpsc::UnboundedSender<Navigated>>,
}

impl HistoryInner {
  fn notify(&mut self) {
    self.subscribers.retain(|tx| tx.send(Navigated).is_ok());
  }
}

/// In-memory session history: a stack of query strings with a cursor.
///
/// Clones share the same history.
#[derive(Debug, Clone)]
pub struct MemoryHistory {
  inner: Arc<Mutex<HistoryInner>>,
}

impl MemoryHistory {
  pub fn new(path: impl Into<String>, query: &str) -> Self {
    Self {
      inner: Arc::new(Mutex::new(HistoryInner {
        path: path.into(),
        entries: vec![strip_question_mark(query).to_string()],
        index: 0,
        replacements: 0,
        subscribers: Vec::new(),
      })),
    }
  }

  fn lock(&self) -> MutexGuard<'_, HistoryInner> {
    self.inner.lock().unwrap_or_else(PoisonError::into_inner)
  }

  /// Navigate to a new entry, dropping anything ahead of the cursor.
  pub fn push(&self, query: &str) {
    let mut inner = self.lock();
    let next = inner.index + 1;
    inner.entries.truncate(next);
    inner.entries.push(strip_question_mark(query).to_string());
    inner.index = next;
    debug!(query, depth = inner.entries.len(), "history push");
    inner.notify();
  }

  /// Step back one entry. Returns `false` at the oldest entry.
  pub fn back(&self) -> bool {
    let mut inner = self.lock();
    if inner.index == 0 {
      return false;
    }
    inner.index -= 1;
    debug!(index = inner.index, "history back");
    inner.notify();
    true
  }

  /// Step forward one entry. Returns `false` at the newest entry.
  pub fn forward(&self) -> bool {
    let mut inner = self.lock();
    if inner.index + 1 >= inner.entries.len() {
      return false;
    }
    inner.index += 1;
    debug!(index = inner.index, "history forward");
    inner.notify();
    true
  }

  pub fn can_go_back(&self) -> bool {
    self.lock().index > 0
  }

  pub fn can_go_forward(&self) -> bool {
    let inner = self.lock();
    inner.index + 1 < inner.entries.len()
  }

  /// Number of entries in the session
  #[cfg(test)]
  pub fn len(&self) -> usize {
    self.lock().entries.len()
  }

  /// How many times the current entry has been rewritten in place
  #[cfg(test)]
  pub fn replacements(&self) -> usize {
    self.lock().replacements
  }

  /// Path plus query, the way an address bar shows it.
  pub fn href(&self) -> String {
    let inner = self.lock();
    let query = &inner.entries[inner.index];
    if query.is_empty() {
      inner.path.clone()
    } else {
      format!("{}?{}", inner.path, query)
    }
  }
}

impl Location for MemoryHistory {
  fn query(&self) -> String {
    let inner = self.lock();
    inner.entries[inner.index].clone()
  }

  fn replace_query(&self, query: &str) {
    let mut inner = self.lock();
    let index = inner.index;
    inner.entries[index] = strip_question_mark(query).to_string();
    inner.replacements += 1;
    trace!(query, replacements = inner.replacements, "history replace");
  }

  fn subscribe(&self) -> mpsc::UnboundedReceiver<Navigated> {
    let (tx, rx) = mpsc::unbounded_channel();
    self.lock().subscribers.push(tx);
    rx
  }
}

fn strip_question_mark(query: &str) -> &str {
  query.strip_prefix('?').unwrap_or(query)
}
