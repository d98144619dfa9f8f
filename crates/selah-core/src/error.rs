//! Error types for `selah-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// A required request parameter was absent or empty.
  #[error("missing parameter: {0}")]
  MissingParameter(&'static str),

  #[error("not found: {0}")]
  NotFound(String),

  /// The corpus file is missing or is not a valid corpus document.
  #[error("corpus unavailable: {0}")]
  CorpusUnavailable(String),

  /// A book name cannot be used in a composite cache key.
  #[error("invalid verse key: {0:?}")]
  InvalidKey(String),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
