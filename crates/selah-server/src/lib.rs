//! HTTP front for Selah.
//!
//! Wraps [`selah_api::api_router`] under `/api`, adds a health check and
//! request tracing. `main.rs` owns configuration and the listener.

pub mod convert;

use std::path::PathBuf;

use axum::{Json, Router, routing::get};
use selah_api::{AppState, CommentaryGenerator, upstream::DEFAULT_API_URL};
use serde::{Deserialize, Serialize};
use tower_http::trace::TraceLayer;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and `SELAH_*`
/// environment variables.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
  pub host:                  String,
  pub port:                  u16,
  pub corpus_path:           PathBuf,
  /// Refuse to start without a loadable corpus. When `false` the server comes
  /// up anyway and corpus routes answer 500.
  pub require_corpus:        bool,
  pub gemini_api_key:        Option<String>,
  pub gemini_api_url:        String,
  pub upstream_timeout_secs: Option<u64>,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:                  "127.0.0.1".to_string(),
      port:                  3000,
      corpus_path:           PathBuf::from("public/bible_data.json"),
      require_corpus:        true,
      gemini_api_key:        None,
      gemini_api_url:        DEFAULT_API_URL.to_string(),
      upstream_timeout_secs: None,
    }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Health {
  pub status:  String,
  pub version: String,
}

async fn health() -> Json<Health> {
  Json(Health {
    status:  "ok".to_string(),
    version: env!("CARGO_PKG_VERSION").to_string(),
  })
}

/// The full application router: `/api/*` plus `/health`.
pub fn router<G>(state: AppState<G>) -> Router
where
  G: CommentaryGenerator + 'static,
{
  Router::new()
    .route("/health", get(health))
    .nest("/api", selah_api::api_router(state))
    .layer(TraceLayer::new_for_http())
}
