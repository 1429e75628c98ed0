//! Product filters and their two-way sync with the address bar.

mod location;
mod state;
mod sync;

pub use location::{Location, MemoryHistory};
pub use state::{format_price, FilterState, PriceRange};
pub use sync::UrlFilters;
