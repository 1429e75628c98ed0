//! Keeps a `FilterState` and a `Location` in step.

use tokio::sync::mpsc;
use tracing::{debug, info};

use super::location::{Location, Navigated};
use super::state::FilterState;

/// Filter state mirrored into the query string.
///
/// The two directions are deliberately asymmetric:
/// - `update_filters` makes memory the source of truth and rewrites the
///   current entry in place (no new history entry, no debouncing)
/// - navigation makes the location the source of truth; `sync` re-reads it
///   and never writes back
pub struct UrlFilters<L: Location> {
  location: L,
  filters: FilterState,
  navigations: mpsc::UnboundedReceiver<Navigated>,
}

impl<L: Location> UrlFilters<L> {
  /// Read the initial filters from the location and start listening for
  /// navigation.
  pub fn new(location: L) -> Self {
    let navigations = location.subscribe();
    let filters = FilterState::from_query(&location.query());
    debug!(?filters, "filters initialized from location");

    Self {
      location,
      filters,
      navigations,
    }
  }

  pub fn filters(&self) -> &FilterState {
    &self.filters
  }

  pub fn location(&self) -> &L {
    &self.location
  }

  /// Replace the filters and write them to the location.
  ///
  /// Filters are normalized first so the stored state is exactly what the
  /// written query parses back to.
  pub fn update_filters(&mut self, filters: FilterState) {
    let filters = filters.normalized();
    let query = filters.to_query();
    self.filters = filters;
    debug!(%query, "filters updated");
    self.location.replace_query(&query);
  }

  /// Apply pending navigation, if any.
  ///
  /// Returns `true` if the in-memory filters changed.
  pub fn sync(&mut self) -> bool {
    let mut navigated = false;
    while self.navigations.try_recv().is_ok() {
      navigated = true;
    }
    if !navigated {
      return false;
    }

    let filters = FilterState::from_query(&self.location.query());
    if filters == self.filters {
      return false;
    }
    info!(?filters, "filters restored from navigation");
    self.filters = filters;
    true
  }
}
