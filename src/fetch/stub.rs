//! Scripted transport for mechanism tests.

use futures::future::{BoxFuture, FutureExt};
use serde_json::{json, Value};
use std::sync::Mutex;
use std::time::Duration;

use super::error::FetchError;
use super::transport::{Transport, TransportResponse};

/// What the stub answers for one request.
#[derive(Debug, Clone)]
pub enum StubReply {
  Json(Value),
  JsonWithTotal(Value, u64),
  Status(u16),
  Fail(String),
  Delayed(Duration, Box<StubReply>),
}

impl StubReply {
  fn respond(self) -> Result<TransportResponse, FetchError> {
    match self {
      StubReply::Json(value) => Ok(TransportResponse {
        status: 200,
        body: value.to_string().into_bytes(),
        total_count: None,
      }),
      StubReply::JsonWithTotal(value, total) => Ok(TransportResponse {
        status: 200,
        body: value.to_string().into_bytes(),
        total_count: Some(total),
      }),
      StubReply::Status(status) => Ok(TransportResponse {
        status,
        body: Vec::new(),
        total_count: None,
      }),
      StubReply::Fail(message) => Err(FetchError::transport(message)),
      StubReply::Delayed(_, inner) => inner.respond(),
    }
  }
}

type Handler = Box<dyn Fn(&str) -> StubReply + Send + Sync>;

/// Transport that answers from a closure and records every URL requested.
pub struct StubTransport {
  handler: Handler,
  calls: Mutex<Vec<String>>,
}

impl StubTransport {
  pub fn new(handler: impl Fn(&str) -> StubReply + Send + Sync + 'static) -> Self {
    Self {
      handler: Box::new(handler),
      calls: Mutex::new(Vec::new()),
    }
  }

  pub fn calls(&self) -> Vec<String> {
    self.calls.lock().unwrap().clone()
  }

  pub fn call_count(&self) -> usize {
    self.calls.lock().unwrap().len()
  }
}

impl Transport for StubTransport {
  fn get(&self, url: &str) -> BoxFuture<'static, Result<TransportResponse, FetchError>> {
    self.calls.lock().unwrap().push(url.to_string());
    let reply = (self.handler)(url);

    async move {
      if let StubReply::Delayed(delay, _) = &reply {
        tokio::time::sleep(*delay).await;
      }
      reply.respond()
    }
    .boxed()
  }
}

/// A post record the way jsonplaceholder shapes it.
pub fn post_json(id: u64) -> Value {
  json!({
    "id": id,
    "title": format!("post {}", id),
    "body": format!("body of post {}", id),
    "userId": (id - 1) / 10 + 1,
  })
}

/// Serve `total` posts honoring `_page` and `_limit`.
pub fn paged_posts(total: u64, report_total: bool) -> impl Fn(&str) -> StubReply {
  move |url| {
    let parsed = url::Url::parse(url).unwrap();
    let param = |name: &str| {
      parsed
        .query_pairs()
        .find(|(k, _)| k == name)
        .and_then(|(_, v)| v.parse::<u64>().ok())
    };
    let page = param("_page").unwrap_or(1);
    let limit = param("_limit").unwrap_or(10);

    let start = (page - 1) * limit;
    let end = (start + limit).min(total);
    let items: Vec<Value> = (start..end).map(|i| post_json(i + 1)).collect();

    if report_total {
      StubReply::JsonWithTotal(Value::Array(items), total)
    } else {
      StubReply::Json(Value::Array(items))
    }
  }
}
