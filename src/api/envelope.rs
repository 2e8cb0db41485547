//! Success/error envelope handed to the UI.
//!
//! `execute` is the one place where a failed API call turns into data.
//! Nothing built on top of it ever sees an `Err` or a panic.

use futures::FutureExt;
use serde::Serialize;
use std::fmt::Display;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use tracing::error;

/// Message used when a failure has no description of its own
pub const FALLBACK_ERROR: &str = "An error occurred";

/// `{success, data, error}`: exactly one of `data` and `error` is set
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Envelope<T> {
  pub success: bool,
  pub data: Option<T>,
  pub error: Option<String>,
}

impl<T> Envelope<T> {
  pub fn ok(data: T) -> Self {
    Self {
      success: true,
      data: Some(data),
      error: None,
    }
  }

  pub fn failed(message: impl Into<String>) -> Self {
    let message = message.into();
    let message = if message.trim().is_empty() {
      FALLBACK_ERROR.to_string()
    } else {
      message
    };

    Self {
      success: false,
      data: None,
      error: Some(message),
    }
  }

  pub fn into_result(self) -> Result<T, String> {
    match (self.data, self.error) {
      (Some(data), _) if self.success => Ok(data),
      (_, error) => Err(error.unwrap_or_else(|| FALLBACK_ERROR.to_string())),
    }
  }
}

/// Run `operation` and wrap whatever it produces.
///
/// Errors become failure envelopes carrying their display text; a panic
/// inside the operation becomes a failure envelope with the fallback text.
pub async fn execute<T, E, F, Fut>(operation: F) -> Envelope<T>
where
  F: FnOnce() -> Fut,
  Fut: Future<Output = Result<T, E>>,
  E: Display,
{
  let outcome = AssertUnwindSafe(async move { operation().await })
    .catch_unwind()
    .await;

  match outcome {
    Ok(Ok(data)) => Envelope::ok(data),
    Ok(Err(e)) => Envelope::failed(e.to_string()),
    Err(_) => {
      error!("API operation panicked");
      Envelope::failed(FALLBACK_ERROR)
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::api::ApiError;
  use serde_json::json;

  fn assert_total<T>(envelope: &Envelope<T>) {
    assert!(envelope.data.is_some() != envelope.error.is_some());
    assert_eq!(envelope.success, envelope.data.is_some());
  }

  #[tokio::test]
  async fn test_success_envelope() {
    let envelope = execute(|| async { Ok::<_, ApiError>(json!({"total": 3})) }).await;
    assert_total(&envelope);
    assert_eq!(envelope.data, Some(json!({"total": 3})));
  }

  #[tokio::test]
  async fn test_error_envelope_carries_message() {
    let envelope: Envelope<serde_json::Value> =
      execute(|| async { Err(ApiError::Transport { status: 500 }) }).await;
    assert_total(&envelope);
    assert_eq!(envelope.error.as_deref(), Some("HTTP error! status: 500"));
  }

  #[tokio::test]
  async fn test_empty_message_uses_fallback() {
    let envelope: Envelope<()> = execute(|| async { Err(String::new()) }).await;
    assert_total(&envelope);
    assert_eq!(envelope.error.as_deref(), Some(FALLBACK_ERROR));
  }

  #[tokio::test]
  async fn test_panic_becomes_failure() {
    let envelope: Envelope<u32> = execute(|| async {
      if true {
        panic!("broken operation");
      }
      Ok::<u32, String>(1)
    })
    .await;
    assert_total(&envelope);
    assert_eq!(envelope.error.as_deref(), Some(FALLBACK_ERROR));
  }

  #[test]
  fn test_serialized_shape() {
    let ok = serde_json::to_value(Envelope::ok(1)).unwrap();
    assert_eq!(ok, json!({"success": true, "data": 1, "error": null}));

    let failed = serde_json::to_value(Envelope::<u32>::failed("nope")).unwrap();
    assert_eq!(failed, json!({"success": false, "data": null, "error": "nope"}));
  }

  #[test]
  fn test_into_result() {
    assert_eq!(Envelope::ok(4).into_result(), Ok(4));
    assert_eq!(
      Envelope::<u32>::failed("down").into_result(),
      Err("down".to_string())
    );
  }
}
