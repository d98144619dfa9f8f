//! Handler for `POST /commentary`.

use axum::{
  Json,
  extract::{State, rejection::JsonRejection},
};
use selah_core::protocol::{CommentaryRequest, CommentaryResponse};

use crate::{
  AppState,
  error::ApiError,
  upstream::{CommentaryGenerator, GenerateError},
};

/// `POST /commentary` with body `{"verse":"<text>"}`
///
/// A JSON body without a string `verse` is a 400; a body that cannot be read
/// as JSON is answered like any other generation failure.
pub async fn handler<G>(
  State(state): State<AppState<G>>,
  body: Result<Json<CommentaryRequest>, JsonRejection>,
) -> Result<Json<CommentaryResponse>, ApiError>
where
  G: CommentaryGenerator,
{
  let Json(body) = body.map_err(|rejection| match rejection {
    JsonRejection::JsonDataError(_) => ApiError::Generate(GenerateError::MissingInput),
    other => ApiError::UnreadableBody(other.body_text()),
  })?;
  let verse = body.verse.unwrap_or_default();
  let commentary = state.generator.generate(&verse).await?;
  Ok(Json(CommentaryResponse { commentary }))
}
