use thiserror::Error;

/// Failures surfaced by the product API layer.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ApiError {
  /// The request could not be completed, or the body was not valid JSON
  #[error("network error: {0}")]
  Network(String),

  /// The server answered with a non-success status
  #[error("HTTP error! status: {status}")]
  Transport { status: u16 },

  /// A query was built from values the API cannot accept
  #[error("invalid request: {0}")]
  Validation(String),
}

impl ApiError {
  pub fn status(&self) -> Option<u16> {
    match self {
      ApiError::Transport { status } => Some(*status),
      _ => None,
    }
  }
}

impl From<reqwest::Error> for ApiError {
  fn from(e: reqwest::Error) -> Self {
    match e.status() {
      Some(status) if !status.is_success() => ApiError::Transport {
        status: status.as_u16(),
      },
      _ => ApiError::Network(e.to_string()),
    }
  }
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;
