use thiserror::Error;

/// Message used when a transport failure carries no description of its own.
pub const GENERIC_FAILURE: &str = "An error occurred";

/// Why a fetch did not produce data.
///
/// Mechanisms never propagate this to their callers as a control-flow error;
/// it is rendered into the `error` slot of their state as a message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
  /// A response arrived but its status is outside 200..=299
  #[error("HTTP error! status: {0}")]
  Status(u16),

  /// The request could not complete (DNS, connect, timeout, bad URL)
  #[error("{0}")]
  Transport(String),

  /// The body was not the JSON shape the caller asked for
  #[error("Failed to decode response: {0}")]
  Decode(String),
}

impl FetchError {
  /// Build a transport error, falling back to a generic message when the
  /// underlying failure has nothing to say.
  pub fn transport(message: impl Into<String>) -> Self {
    let message = message.into();
    if message.trim().is_empty() {
      Self::Transport(GENERIC_FAILURE.to_string())
    } else {
      Self::Transport(message)
    }
  }

  pub fn decode(err: serde_json::Error) -> Self {
    Self::Decode(err.to_string())
  }
}
