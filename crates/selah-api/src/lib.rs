//! JSON API for Selah.
//!
//! Exposes an axum [`Router`] over a read-only [`Corpus`] and a
//! [`CommentaryGenerator`]. Tracing layers, TLS and listening are the
//! caller's responsibility.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/verses` | `?book=<name>&chapter=<n>`; 400 / 404 / 500 |
//! | `GET`  | `/books` | Book summaries in corpus order |
//! | `POST` | `/commentary` | Body `{"verse":"<text>"}` |
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", selah_api::api_router(state))
//! ```

pub mod books;
pub mod commentary;
pub mod error;
pub mod upstream;
pub mod verses;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post},
};
use selah_core::corpus::Corpus;

pub use error::ApiError;
pub use upstream::{CommentaryGenerator, GeminiGenerator, ReqwestTransport};

/// Shared state threaded through all handlers.
pub struct AppState<G> {
  /// `None` when the server was started without a loadable corpus; corpus
  /// routes then answer 500.
  pub corpus:    Option<Arc<Corpus>>,
  pub generator: Arc<G>,
}

impl<G> Clone for AppState<G> {
  fn clone(&self) -> Self {
    Self {
      corpus:    self.corpus.clone(),
      generator: Arc::clone(&self.generator),
    }
  }
}

impl<G> AppState<G> {
  pub fn new(corpus: Option<Arc<Corpus>>, generator: Arc<G>) -> Self {
    Self { corpus, generator }
  }

  pub(crate) fn corpus(&self) -> Result<&Corpus, ApiError> {
    self
      .corpus
      .as_deref()
      .ok_or_else(|| ApiError::CorpusUnavailable("corpus was not loaded".into()))
  }
}

/// Build the API router for `state`.
///
/// The returned `Router<()>` can be nested into any parent router.
pub fn api_router<G>(state: AppState<G>) -> Router<()>
where
  G: CommentaryGenerator + 'static,
{
  Router::new()
    .route("/verses", get(verses::handler::<G>))
    .route("/books", get(books::handler::<G>))
    .route("/commentary", post(commentary::handler::<G>))
    .with_state(state)
}

#[cfg(test)]
mod tests {
  use axum::{
    body::{Body, Bytes},
    http::{Request, StatusCode, header},
  };
  use selah_core::{
    navigation::{BookSummary, Testament},
    protocol::{CommentaryResponse, ErrorBody, VerseEntry, VersesResponse},
  };
  use serde::de::DeserializeOwned;
  use tower::ServiceExt as _;

  use super::*;
  use crate::upstream::{DEFAULT_API_URL, tests::StubTransport};

  const FIXTURE: &str = r#"{
    "Genesis": { "chapters": {
      "1": ["In the beginning God created the heaven and the earth.", null, "And God said, Let there be light."]
    }},
    "Matthew": { "chapters": { "1": ["The book of the generation of Jesus Christ"], "2": ["Now when Jesus was born"] } }
  }"#;

  type Stub = GeminiGenerator<StubTransport>;

  fn state_with(transport: StubTransport, key: Option<&str>) -> AppState<Stub> {
    let corpus = Corpus::from_json(FIXTURE).unwrap();
    AppState::new(
      Some(Arc::new(corpus)),
      Arc::new(GeminiGenerator::new(transport, key.map(str::to_owned), DEFAULT_API_URL)),
    )
  }

  fn state() -> AppState<Stub> {
    state_with(StubTransport::ok("## Light\n- God speaks"), Some("secret"))
  }

  async fn send(state: AppState<Stub>, req: Request<Body>) -> (StatusCode, Bytes) {
    let resp = api_router(state).oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    (status, bytes)
  }

  fn json<T: DeserializeOwned>(bytes: &[u8]) -> T {
    serde_json::from_slice(bytes).unwrap()
  }

  fn get_req(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
  }

  fn post_json(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
      .method("POST")
      .uri(uri)
      .header(header::CONTENT_TYPE, "application/json")
      .body(Body::from(body.to_owned()))
      .unwrap()
  }

  // ── /verses ───────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn verses_returns_present_verses_in_order() {
    let (status, body) = send(state(), get_req("/verses?book=Genesis&chapter=1")).await;
    assert_eq!(status, StatusCode::OK);
    let resp: VersesResponse = json(&body);
    assert_eq!(resp.verses, [
      VerseEntry { verse: 1, text: "In the beginning God created the heaven and the earth.".into() },
      VerseEntry { verse: 3, text: "And God said, Let there be light.".into() },
    ]);
  }

  #[tokio::test]
  async fn verses_without_parameters_is_400() {
    for uri in ["/verses", "/verses?book=Genesis", "/verses?chapter=1", "/verses?book=&chapter=1"] {
      let (status, body) = send(state(), get_req(uri)).await;
      assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
      let err: ErrorBody = json(&body);
      assert_eq!(err.error, "Book and chapter parameters are required");
    }
  }

  #[tokio::test]
  async fn malformed_query_is_400_with_error_body() {
    let (status, body) = send(state(), get_req("/verses?book=Genesis&book=Exodus&chapter=1")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json::<ErrorBody>(&body).error, "Book and chapter parameters are required");
  }

  #[tokio::test]
  async fn unknown_book_or_chapter_is_404() {
    for uri in ["/verses?book=Tobit&chapter=1", "/verses?book=Genesis&chapter=2", "/verses?book=Genesis&chapter=x"] {
      let (status, _) = send(state(), get_req(uri)).await;
      assert_eq!(status, StatusCode::NOT_FOUND, "{uri}");
    }
  }

  #[tokio::test]
  async fn missing_corpus_is_500() {
    let mut s = state();
    s.corpus = None;
    let (status, body) = send(s.clone(), get_req("/verses?book=Genesis&chapter=1")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json::<ErrorBody>(&body).error, "Failed to load bible data");

    let (status, _) = send(s, get_req("/books")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
  }

  // ── /books ────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn books_lists_summaries_in_corpus_order() {
    let (status, body) = send(state(), get_req("/books")).await;
    assert_eq!(status, StatusCode::OK);
    let books: Vec<BookSummary> = json(&body);
    assert_eq!(books, [
      BookSummary { name: "Genesis".into(), testament: Testament::Old, chapters: 1 },
      BookSummary { name: "Matthew".into(), testament: Testament::New, chapters: 2 },
    ]);
  }

  // ── /commentary ───────────────────────────────────────────────────────────

  #[tokio::test]
  async fn commentary_returns_generated_text() {
    let s = state();
    let generator = Arc::clone(&s.generator);
    let (status, body) = send(s, post_json("/commentary", r#"{"verse":"Let there be light"}"#)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json::<CommentaryResponse>(&body).commentary, "## Light\n- God speaks");
    assert_eq!(generator.transport().calls(), 1);
  }

  #[tokio::test]
  async fn commentary_without_verse_is_400() {
    for body in [r#"{}"#, r#"{"verse":""}"#] {
      let (status, resp) = send(state(), post_json("/commentary", body)).await;
      assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
      assert_eq!(json::<ErrorBody>(&resp).error, "Verse text is required");
    }
  }

  #[tokio::test]
  async fn commentary_with_non_string_verse_is_400() {
    for body in [r#"{"verse":5}"#, r#"{"verse":["a"]}"#, "[]"] {
      let (status, resp) = send(state(), post_json("/commentary", body)).await;
      assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
      assert_eq!(json::<ErrorBody>(&resp).error, "Verse text is required");
    }
  }

  #[tokio::test]
  async fn unreadable_commentary_body_is_generic_500() {
    let s = state();
    let generator = Arc::clone(&s.generator);
    let (status, resp) = send(s, post_json("/commentary", "not json")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json::<ErrorBody>(&resp).error, "Failed to generate commentary");

    let no_content_type = Request::builder()
      .method("POST")
      .uri("/commentary")
      .body(Body::from(r#"{"verse":"Jesus wept."}"#))
      .unwrap();
    let (status, resp) = send(state(), no_content_type).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json::<ErrorBody>(&resp).error, "Failed to generate commentary");
    assert_eq!(generator.transport().calls(), 0);
  }

  #[tokio::test]
  async fn commentary_without_key_is_500_and_never_calls_upstream() {
    let s = state_with(StubTransport::ok("unused"), None);
    let generator = Arc::clone(&s.generator);
    let (status, _) = send(s, post_json("/commentary", r#"{"verse":"Jesus wept."}"#)).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(generator.transport().calls(), 0);
  }

  #[tokio::test]
  async fn upstream_failure_is_generic_500() {
    let s = state_with(StubTransport::replying(StatusCode::BAD_GATEWAY, "oops"), Some("k"));
    let (status, body) = send(s, post_json("/commentary", r#"{"verse":"Jesus wept."}"#)).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json::<ErrorBody>(&body).error, "Failed to generate commentary");
  }
}
