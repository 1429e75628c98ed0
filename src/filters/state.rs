//! Filter values and their query-string form.

use url::form_urlencoded;

pub const SEARCH_PARAM: &str = "search";
pub const CATEGORY_PARAM: &str = "category";
pub const MIN_PRICE_PARAM: &str = "minPrice";
pub const MAX_PRICE_PARAM: &str = "maxPrice";

pub const DEFAULT_MIN_PRICE: f64 = 0.0;
pub const DEFAULT_MAX_PRICE: f64 = 1000.0;

/// Inclusive price bounds. Always `min <= max`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceRange {
  min: f64,
  max: f64,
}

impl Default for PriceRange {
  fn default() -> Self {
    Self {
      min: DEFAULT_MIN_PRICE,
      max: DEFAULT_MAX_PRICE,
    }
  }
}

impl PriceRange {
  /// Build a range from two bounds given in either order.
  pub fn new(a: f64, b: f64) -> Self {
    if a <= b {
      Self { min: a, max: b }
    } else {
      Self { min: b, max: a }
    }
  }

  pub fn min(&self) -> f64 {
    self.min
  }

  pub fn max(&self) -> f64 {
    self.max
  }

  /// Move the lower bound, never past the upper one.
  pub fn with_min(self, min: f64) -> Self {
    Self {
      min: min.min(self.max),
      max: self.max,
    }
  }

  /// Move the upper bound, never below the lower one.
  pub fn with_max(self, max: f64) -> Self {
    Self {
      min: self.min,
      max: max.max(self.min),
    }
  }

  pub fn contains(&self, price: f64) -> bool {
    price >= self.min && price <= self.max
  }
}

/// What the product list is filtered by.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FilterState {
  pub search_term: String,
  /// Empty means any category
  pub category: String,
  pub price_range: PriceRange,
}

impl FilterState {
  /// Read filters from a query string (with or without the leading `?`).
  ///
  /// Missing parameters take their defaults. Prices that are empty, zero,
  /// unparsable or not finite also fall back to the default.
  pub fn from_query(query: &str) -> Self {
    let query = query.strip_prefix('?').unwrap_or(query);

    let mut search = None;
    let mut category = None;
    let mut min_price = None;
    let mut max_price = None;

    // First occurrence of a parameter wins
    for (key, value) in form_urlencoded::parse(query.as_bytes()) {
      let slot = match &*key {
        SEARCH_PARAM => &mut search,
        CATEGORY_PARAM => &mut category,
        MIN_PRICE_PARAM => &mut min_price,
        MAX_PRICE_PARAM => &mut max_price,
        _ => continue,
      };
      if slot.is_none() {
        *slot = Some(value.into_owned());
      }
    }

    Self {
      search_term: search.unwrap_or_default(),
      category: category.unwrap_or_default(),
      price_range: PriceRange::new(
        coerce_price(min_price.as_deref(), DEFAULT_MIN_PRICE),
        coerce_price(max_price.as_deref(), DEFAULT_MAX_PRICE),
      ),
    }
  }

  /// Serialize to a query string without the leading `?`.
  ///
  /// Parameters equal to their default are left out, so the default state
  /// serializes to an empty string.
  pub fn to_query(&self) -> String {
    let mut query = form_urlencoded::Serializer::new(String::new());

    if !self.search_term.is_empty() {
      query.append_pair(SEARCH_PARAM, &self.search_term);
    }
    if !self.category.is_empty() {
      query.append_pair(CATEGORY_PARAM, &self.category);
    }
    if self.price_range.min() != DEFAULT_MIN_PRICE {
      query.append_pair(MIN_PRICE_PARAM, &format_price(self.price_range.min()));
    }
    if self.price_range.max() != DEFAULT_MAX_PRICE {
      query.append_pair(MAX_PRICE_PARAM, &format_price(self.price_range.max()));
    }

    query.finish()
  }

  pub fn is_default(&self) -> bool {
    *self == Self::default()
  }

  /// The state as its own query string reads back.
  ///
  /// A zero or non-finite bound means "no bound" in the query, so it is
  /// replaced by that bound's default.
  pub fn normalized(self) -> Self {
    let bound = |price: f64, default: f64| {
      if price.is_finite() && price != 0.0 {
        price
      } else {
        default
      }
    };
    let price_range = PriceRange::new(
      bound(self.price_range.min(), DEFAULT_MIN_PRICE),
      bound(self.price_range.max(), DEFAULT_MAX_PRICE),
    );
    Self {
      price_range,
      ..self
    }
  }
}

/// Parse a price parameter, falling back to `default` for anything that would
/// not be a usable non-zero number.
fn coerce_price(raw: Option<&str>, default: f64) -> f64 {
  raw
    .and_then(|v| v.trim().parse::<f64>().ok())
    .filter(|v| v.is_finite() && *v != 0.0)
    .unwrap_or(default)
}

/// Whole prices print without a fractional part.
pub fn format_price(price: f64) -> String {
  format!("{}", price)
}
