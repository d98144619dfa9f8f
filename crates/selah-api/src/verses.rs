//! Handler for `GET /verses`.

use axum::{
  Json,
  extract::{Query, State, rejection::QueryRejection},
};
use selah_core::protocol::VersesResponse;
use serde::Deserialize;

use crate::{AppState, error::ApiError, upstream::CommentaryGenerator};

/// Parameters are kept as raw strings; validation happens in the corpus.
#[derive(Debug, Deserialize)]
pub struct VersesParams {
  pub book:    Option<String>,
  pub chapter: Option<String>,
}

/// `GET /verses?book=<name>&chapter=<n>`
pub async fn handler<G>(
  State(state): State<AppState<G>>,
  params: Result<Query<VersesParams>, QueryRejection>,
) -> Result<Json<VersesResponse>, ApiError>
where
  G: CommentaryGenerator,
{
  let Query(params) = params.map_err(|r| ApiError::MissingParameter(r.body_text()))?;
  let verses = state
    .corpus()?
    .get_verses(params.book.as_deref(), params.chapter.as_deref())?;
  Ok(Json(VersesResponse::from(verses)))
}
