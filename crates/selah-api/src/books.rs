//! Handler for `GET /books`: the structural snapshot clients navigate with.

use axum::{Json, extract::State};
use selah_core::navigation::{self, BookSummary};

use crate::{AppState, error::ApiError, upstream::CommentaryGenerator};

/// `GET /books`: one summary per book, in corpus order.
pub async fn handler<G>(
  State(state): State<AppState<G>>,
) -> Result<Json<Vec<BookSummary>>, ApiError>
where
  G: CommentaryGenerator,
{
  Ok(Json(navigation::summaries(state.corpus()?)))
}
