//! API error type and [`axum::response::IntoResponse`] implementation.
//!
//! Client errors carry a short explanation. Server errors are logged in full
//! and answered with a generic message.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use selah_core::protocol::ErrorBody;
use thiserror::Error;

use crate::upstream::GenerateError;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("missing parameter: {0}")]
  MissingParameter(String),

  #[error("not found: {0}")]
  NotFound(String),

  #[error("corpus unavailable: {0}")]
  CorpusUnavailable(String),

  #[error(transparent)]
  Generate(#[from] GenerateError),

  /// A `/commentary` body that is not JSON at all.
  #[error("unreadable request body: {0}")]
  UnreadableBody(String),

  #[error("internal error: {0}")]
  Internal(String),
}

impl From<selah_core::Error> for ApiError {
  fn from(e: selah_core::Error) -> Self {
    match e {
      selah_core::Error::MissingParameter(p) => ApiError::MissingParameter(p.to_owned()),
      selah_core::Error::NotFound(m) => ApiError::NotFound(m),
      selah_core::Error::CorpusUnavailable(m) => ApiError::CorpusUnavailable(m),
      other => ApiError::Internal(other.to_string()),
    }
  }
}

impl ApiError {
  pub fn status(&self) -> StatusCode {
    match self {
      ApiError::MissingParameter(_) => StatusCode::BAD_REQUEST,
      ApiError::NotFound(_) => StatusCode::NOT_FOUND,
      ApiError::Generate(GenerateError::MissingInput) => StatusCode::BAD_REQUEST,
      ApiError::Generate(_)
      | ApiError::CorpusUnavailable(_)
      | ApiError::UnreadableBody(_)
      | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }

  fn public_message(&self) -> &'static str {
    match self {
      ApiError::MissingParameter(_) => "Book and chapter parameters are required",
      ApiError::NotFound(_) => "Book or chapter not found",
      ApiError::CorpusUnavailable(_) => "Failed to load bible data",
      ApiError::Generate(GenerateError::MissingInput) => "Verse text is required",
      ApiError::Generate(GenerateError::Misconfigured) => {
        "Commentary API key is not configured"
      }
      ApiError::Generate(_) | ApiError::UnreadableBody(_) => "Failed to generate commentary",
      ApiError::Internal(_) => "Internal server error",
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = self.status();
    if status.is_server_error() {
      tracing::error!(error = %self, "request failed");
    } else {
      tracing::debug!(error = %self, "rejected request");
    }
    let body = ErrorBody { error: self.public_message().to_owned() };
    (status, Json(body)).into_response()
  }
}
