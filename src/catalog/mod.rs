//! Product catalog and client-side filtering.

mod data;

pub use data::sample_products;

use crate::filters::{FilterState, PriceRange};

/// A product in the catalog
#[derive(Debug, Clone, PartialEq)]
pub struct Product {
  pub id: u32,
  pub name: String,
  pub category: String,
  pub price: f64,
  pub description: Option<String>,
}

impl Product {
  /// Whether this product passes every active filter.
  ///
  /// Name search is a case-insensitive substring match, category is an exact
  /// case-sensitive match (empty matches all), and price bounds are inclusive.
  pub fn matches(&self, filters: &FilterState) -> bool {
    let matches_search = self
      .name
      .to_lowercase()
      .contains(&filters.search_term.to_lowercase());
    let matches_category = filters.category.is_empty() || self.category == filters.category;
    let matches_price = filters.price_range.contains(self.price);

    matches_search && matches_category && matches_price
  }
}

/// Products that pass `filters`, in catalog order.
pub fn filter_products<'a>(products: &'a [Product], filters: &FilterState) -> Vec<&'a Product> {
  products.iter().filter(|p| p.matches(filters)).collect()
}

/// Distinct categories in order of first appearance.
pub fn unique_categories(products: &[Product]) -> Vec<String> {
  let mut categories: Vec<String> = Vec::new();
  for product in products {
    if !categories.contains(&product.category) {
      categories.push(product.category.clone());
    }
  }
  categories
}

/// Cheapest and most expensive price in the catalog.
pub fn price_bounds(products: &[Product]) -> Option<PriceRange> {
  let mut prices = products.iter().map(|p| p.price);
  let first = prices.next()?;
  let (min, max) = prices.fold((first, first), |(lo, hi), p| (lo.min(p), hi.max(p)));
  Some(PriceRange::new(min, max))
}
