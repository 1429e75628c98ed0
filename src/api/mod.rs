//! Remote JSON API the post tabs talk to.

pub mod types;

pub use types::Post;

use color_eyre::{eyre::eyre, Result};
use url::Url;

/// Resolved URLs for the API resources.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiEndpoints {
  posts: String,
}

impl ApiEndpoints {
  /// Resolve `posts_path` against `base_url`.
  pub fn new(base_url: &str, posts_path: &str) -> Result<Self> {
    let base = Url::parse(base_url).map_err(|e| eyre!("Invalid API URL {}: {}", base_url, e))?;
    if base.cannot_be_a_base() {
      return Err(eyre!("API URL {} cannot have a path", base_url));
    }

    let posts = base
      .join(posts_path)
      .map_err(|e| eyre!("Invalid posts path {}: {}", posts_path, e))?;

    Ok(Self {
      posts: posts.into(),
    })
  }

  pub fn posts(&self) -> &str {
    &self.posts
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_posts_url() {
    let api = ApiEndpoints::new("https://jsonplaceholder.typicode.com", "/posts").unwrap();
    assert_eq!(api.posts(), "https://jsonplaceholder.typicode.com/posts");
  }

  #[test]
  fn test_relative_path_joins_under_base_path() {
    let api = ApiEndpoints::new("http://localhost:3000/api/", "posts").unwrap();
    assert_eq!(api.posts(), "http://localhost:3000/api/posts");
  }

  #[test]
  fn test_rejects_bad_base() {
    assert!(ApiEndpoints::new("localhost", "/posts").is_err());
    assert!(ApiEndpoints::new("mailto:someone@example.com", "/posts").is_err());
  }
}
