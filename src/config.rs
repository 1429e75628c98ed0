use color_eyre::{eyre::eyre, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::api::ApiEndpoints;

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
  pub api: ApiConfig,
  pub posts: PostsConfig,
  pub catalog: CatalogConfig,
  pub ui: UiConfig,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct ApiConfig {
  /// Root of the JSON API
  pub base_url: String,
  /// Per-request timeout in seconds
  pub timeout_secs: u64,
}

impl Default for ApiConfig {
  fn default() -> Self {
    Self {
      base_url: "https://jsonplaceholder.typicode.com".to_string(),
      timeout_secs: 10,
    }
  }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct PostsConfig {
  /// Path of the posts collection, relative to the API root
  pub path: String,
  /// Items requested per page on the paginated tab
  pub page_size: u32,
  /// How many posts the cached tab shows
  pub preview_count: usize,
  /// Size of the collection, when known up front
  pub total: Option<u64>,
}

impl Default for PostsConfig {
  fn default() -> Self {
    Self {
      path: "/posts".to_string(),
      page_size: 10,
      preview_count: 10,
      total: None,
    }
  }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct CatalogConfig {
  /// Query string the address bar starts with
  pub initial_query: String,
  /// How much h/l and H/L move a price bound
  pub price_step: f64,
}

impl Default for CatalogConfig {
  fn default() -> Self {
    Self {
      initial_query: String::new(),
      price_step: 10.0,
    }
  }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct UiConfig {
  /// Event loop tick in milliseconds
  pub tick_rate_ms: u64,
}

impl Default for UiConfig {
  fn default() -> Self {
    Self { tick_rate_ms: 250 }
  }
}

impl Config {
  /// Load configuration from file.
  ///
  /// Search order:
  /// 1. Explicit path if provided (must exist)
  /// 2. ./tritab.yaml (current directory)
  /// 3. $XDG_CONFIG_HOME/tritab/config.yaml
  ///
  /// With no file found the built-in defaults are used.
  pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
    let path = if let Some(p) = explicit_path {
      if p.exists() {
        Some(p.to_path_buf())
      } else {
        return Err(eyre!("Config file not found: {}", p.display()));
      }
    } else {
      Self::find_config_file()
    };

    let config = match path {
      Some(p) => Self::load_from_path(&p)?,
      None => Self::default(),
    };
    config.validate()?;
    Ok(config)
  }

  fn find_config_file() -> Option<PathBuf> {
    let local = PathBuf::from("tritab.yaml");
    if local.exists() {
      return Some(local);
    }

    if let Some(config_dir) = dirs::config_dir() {
      let xdg_path = config_dir.join("tritab").join("config.yaml");
      if xdg_path.exists() {
        return Some(xdg_path);
      }
    }

    None
  }

  fn load_from_path(path: &Path) -> Result<Self> {
    let contents = std::fs::read_to_string(path)
      .map_err(|e| eyre!("Failed to read config file {}: {}", path.display(), e))?;

    Self::from_yaml(&contents)
      .map_err(|e| eyre!("Failed to parse config file {}: {}", path.display(), e))
  }

  fn from_yaml(contents: &str) -> Result<Self> {
    // An empty file means "all defaults"
    if contents.trim().is_empty() {
      return Ok(Self::default());
    }
    Ok(serde_yaml::from_str(contents)?)
  }

  /// Reject values the app cannot run with.
  pub fn validate(&self) -> Result<()> {
    self.endpoints()?;
    if self.posts.page_size == 0 {
      return Err(eyre!("posts.page_size must be at least 1"));
    }
    if !(self.catalog.price_step.is_finite() && self.catalog.price_step > 0.0) {
      return Err(eyre!("catalog.price_step must be a positive number"));
    }
    Ok(())
  }

  pub fn endpoints(&self) -> Result<ApiEndpoints> {
    ApiEndpoints::new(&self.api.base_url, &self.posts.path)
  }

  pub fn request_timeout(&self) -> Duration {
    Duration::from_secs(self.api.timeout_secs)
  }

  pub fn tick_rate(&self) -> Duration {
    Duration::from_millis(self.ui.tick_rate_ms.max(10))
  }
}
