//! HTTP transport seam.
//!
//! Mechanisms talk to a `Transport` trait object instead of a concrete client
//! so tests can script responses without a network.

use color_eyre::{eyre::eyre, Result};
use futures::future::{BoxFuture, FutureExt};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

use super::error::FetchError;

/// Header json-server style APIs use to report the full collection size
pub const TOTAL_COUNT_HEADER: &str = "x-total-count";

/// A response as seen by the fetch mechanisms.
#[derive(Debug, Clone)]
pub struct TransportResponse {
  pub status: u16,
  pub body: Vec<u8>,
  /// Size of the whole collection, when the server reports it
  pub total_count: Option<u64>,
}

impl TransportResponse {
  pub fn is_success(&self) -> bool {
    (200..300).contains(&self.status)
  }

  /// Classify the status and parse the body as JSON.
  pub fn into_json(self) -> Result<Value, FetchError> {
    if !self.is_success() {
      return Err(FetchError::Status(self.status));
    }
    serde_json::from_slice(&self.body).map_err(FetchError::decode)
  }
}

/// Something that can perform a GET.
pub trait Transport: Send + Sync {
  fn get(&self, url: &str) -> BoxFuture<'static, Result<TransportResponse, FetchError>>;
}

/// `Transport` backed by reqwest.
#[derive(Clone)]
pub struct HttpTransport {
  client: reqwest::Client,
}

impl HttpTransport {
  pub fn new(timeout: Duration) -> Result<Self> {
    let client = reqwest::Client::builder()
      .timeout(timeout)
      .user_agent(concat!("tritab/", env!("CARGO_PKG_VERSION")))
      .build()
      .map_err(|e| eyre!("Failed to create HTTP client: {}", e))?;

    Ok(Self { client })
  }
}

impl Transport for HttpTransport {
  fn get(&self, url: &str) -> BoxFuture<'static, Result<TransportResponse, FetchError>> {
    let client = self.client.clone();
    let url = url.to_string();

    async move {
      debug!(%url, "GET");
      let response = client
        .get(&url)
        .send()
        .await
        .map_err(|e| FetchError::transport(e.to_string()))?;

      let status = response.status().as_u16();
      let total_count = response
        .headers()
        .get(TOTAL_COUNT_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse().ok());

      let body = response
        .bytes()
        .await
        .map_err(|e| FetchError::transport(e.to_string()))?
        .to_vec();

      debug!(%url, status, bytes = body.len(), "response");
      Ok(TransportResponse {
        status,
        body,
        total_count,
      })
    }
    .boxed()
  }
}
