//! Data fetching for the remote tabs.
//!
//! - `Resource<T>` fetches one URL, memoizing parsed bodies in a `ResponseCache`
//! - `Paginated<T>` accumulates `_page`/`_limit` pages of a collection
//!
//! Both run requests on the tokio runtime and report completion through a
//! channel that the UI tick drains with `poll()`. Failures never escape as
//! `Err`: they land in the mechanism's `error` slot as a display message.

mod cache;
mod error;
mod paginated;
mod resource;
#[cfg(test)]
pub(crate) mod stub;
mod transport;

pub use cache::ResponseCache;
pub use paginated::Paginated;
pub use resource::{FetchState, Resource};
pub use transport::{HttpTransport, Transport};
