//! Commentary generation through the upstream text-generation API.
//!
//! [`GeminiGenerator`] builds the prompt, checks configuration and decodes the
//! reply; the HTTP exchange itself sits behind [`Transport`] so it can be
//! replaced in tests. One request per call, no retries.

use std::{future::Future, time::Duration};

use axum::http::StatusCode;
use serde::Deserialize;
use serde_json::{Value, json};
use thiserror::Error;

/// Upstream endpoint used when none is configured.
pub const DEFAULT_API_URL: &str =
  "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.0-flash:generateContent";

/// Fixed instruction prepended to every verse.
pub const INSTRUCTION: &str = "Provide a Bible commentary with no preamble or postamble. \
                               Use markdown headings and bullet points to organize your thoughts.";

/// Upstream error bodies are truncated to this many bytes before logging.
const MAX_ERROR_BODY: usize = 512;

#[derive(Debug, Error)]
pub enum GenerateError {
  #[error("verse text is required")]
  MissingInput,

  #[error("upstream API key is not configured")]
  Misconfigured,

  /// Non-success status, malformed payload, or transport failure.
  #[error("upstream error{}: {message}", .status.map(|s| format!(" ({s})")).unwrap_or_default())]
  Upstream {
    status:  Option<StatusCode>,
    message: String,
  },
}

impl GenerateError {
  fn upstream(status: Option<StatusCode>, message: impl Into<String>) -> Self {
    GenerateError::Upstream { status, message: message.into() }
  }
}

// ─── Transport ───────────────────────────────────────────────────────────────

/// Raw upstream reply.
#[derive(Debug, Clone)]
pub struct UpstreamResponse {
  pub status: StatusCode,
  pub body:   String,
}

/// A single JSON POST to the upstream API.
pub trait Transport: Send + Sync {
  fn post_json<'a>(
    &'a self,
    url: &'a str,
    query: &'a [(&'a str, &'a str)],
    body: &'a Value,
  ) -> impl Future<Output = Result<UpstreamResponse, GenerateError>> + Send + 'a;
}

/// [`Transport`] over a shared [`reqwest::Client`].
#[derive(Clone)]
pub struct ReqwestTransport {
  client: reqwest::Client,
}

impl ReqwestTransport {
  /// `timeout` of `None` keeps the transport default.
  pub fn new(timeout: Option<Duration>) -> reqwest::Result<Self> {
    let mut builder = reqwest::Client::builder();
    if let Some(t) = timeout {
      builder = builder.timeout(t);
    }
    Ok(Self { client: builder.build()? })
  }
}

impl Transport for ReqwestTransport {
  async fn post_json(
    &self,
    url: &str,
    query: &[(&str, &str)],
    body: &Value,
  ) -> Result<UpstreamResponse, GenerateError> {
    // `without_url` keeps the API key out of error messages.
    let resp = self
      .client
      .post(url)
      .query(query)
      .json(body)
      .send()
      .await
      .map_err(|e| GenerateError::upstream(None, e.without_url().to_string()))?;

    let status = resp.status();
    let body = resp
      .text()
      .await
      .map_err(|e| GenerateError::upstream(Some(status), e.without_url().to_string()))?;
    Ok(UpstreamResponse { status, body })
  }
}

// ─── Generator ───────────────────────────────────────────────────────────────

/// Produces commentary for a verse.
pub trait CommentaryGenerator: Send + Sync {
  fn generate<'a>(
    &'a self,
    verse_text: &'a str,
  ) -> impl Future<Output = Result<String, GenerateError>> + Send + 'a;
}

/// The full prompt sent upstream for `verse_text`.
pub fn prompt(verse_text: &str) -> String {
  format!("{INSTRUCTION}\n\nVerse: {verse_text}")
}

/// Client for the `generateContent` endpoint.
pub struct GeminiGenerator<T> {
  transport: T,
  api_key:   Option<String>,
  api_url:   String,
}

impl<T: Transport> GeminiGenerator<T> {
  /// An empty `api_key` counts as unconfigured.
  pub fn new(transport: T, api_key: Option<String>, api_url: impl Into<String>) -> Self {
    Self {
      transport,
      api_key: api_key.filter(|k| !k.trim().is_empty()),
      api_url: api_url.into(),
    }
  }

  pub fn transport(&self) -> &T {
    &self.transport
  }

  pub fn is_configured(&self) -> bool {
    self.api_key.is_some()
  }
}

impl<T: Transport> CommentaryGenerator for GeminiGenerator<T> {
  async fn generate(&self, verse_text: &str) -> Result<String, GenerateError> {
    if verse_text.trim().is_empty() {
      return Err(GenerateError::MissingInput);
    }
    let Some(api_key) = self.api_key.as_deref() else {
      return Err(GenerateError::Misconfigured);
    };

    let body = json!({
      "contents": [{ "parts": [{ "text": prompt(verse_text) }] }]
    });
    let query = [("key", api_key)];
    let resp = self.transport.post_json(&self.api_url, &query, &body).await?;

    if !resp.status.is_success() {
      let mut detail = resp.body;
      if detail.len() > MAX_ERROR_BODY {
        let mut cut = MAX_ERROR_BODY;
        while !detail.is_char_boundary(cut) {
          cut -= 1;
        }
        detail.truncate(cut);
      }
      return Err(GenerateError::upstream(Some(resp.status), detail));
    }

    let commentary = extract_commentary(&resp.body)?;
    tracing::debug!(chars = commentary.len(), "commentary generated");
    Ok(commentary)
  }
}

// ─── Payload ─────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct GenerateResponse {
  #[serde(default)]
  candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
  content: Option<Content>,
}

#[derive(Deserialize)]
struct Content {
  #[serde(default)]
  parts: Vec<Part>,
}

#[derive(Deserialize)]
struct Part {
  text: Option<String>,
}

/// The first candidate's first text part. Anything else is malformed.
fn extract_commentary(body: &str) -> Result<String, GenerateError> {
  let malformed = |why: &str| GenerateError::upstream(None, format!("malformed payload: {why}"));

  let parsed: GenerateResponse =
    serde_json::from_str(body).map_err(|e| malformed(&e.to_string()))?;
  let text = parsed
    .candidates
    .into_iter()
    .next()
    .ok_or_else(|| malformed("no candidates"))?
    .content
    .and_then(|c| c.parts.into_iter().next())
    .and_then(|p| p.text)
    .ok_or_else(|| malformed("no text part"))?;

  if text.trim().is_empty() {
    return Err(malformed("empty commentary"));
  }
  Ok(text)
}

#[cfg(test)]
pub(crate) mod tests {
  use std::sync::{
    Mutex,
    atomic::{AtomicUsize, Ordering},
  };

  use super::*;

  /// Records every request and answers with a canned reply.
  pub(crate) struct StubTransport {
    status:              StatusCode,
    body:                String,
    pub(crate) calls:    AtomicUsize,
    pub(crate) requests: Mutex<Vec<(String, Vec<(String, String)>, Value)>>,
  }

  impl StubTransport {
    pub(crate) fn replying(status: StatusCode, body: impl Into<String>) -> Self {
      Self {
        status,
        body: body.into(),
        calls: AtomicUsize::new(0),
        requests: Mutex::new(Vec::new()),
      }
    }

    pub(crate) fn ok(commentary: &str) -> Self {
      Self::replying(
        StatusCode::OK,
        json!({
          "candidates": [{ "content": { "parts": [{ "text": commentary }] } }]
        })
        .to_string(),
      )
    }

    pub(crate) fn calls(&self) -> usize {
      self.calls.load(Ordering::SeqCst)
    }
  }

  impl Transport for StubTransport {
    async fn post_json(
      &self,
      url: &str,
      query: &[(&str, &str)],
      body: &Value,
    ) -> Result<UpstreamResponse, GenerateError> {
      self.calls.fetch_add(1, Ordering::SeqCst);
      self.requests.lock().unwrap().push((
        url.to_owned(),
        query.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect(),
        body.clone(),
      ));
      Ok(UpstreamResponse { status: self.status, body: self.body.clone() })
    }
  }

  fn generator(transport: StubTransport, key: Option<&str>) -> GeminiGenerator<StubTransport> {
    GeminiGenerator::new(transport, key.map(str::to_owned), DEFAULT_API_URL)
  }

  #[tokio::test]
  async fn missing_key_fails_without_network_call() {
    let g = generator(StubTransport::ok("unused"), None);
    let err = g.generate("Jesus wept.").await.unwrap_err();
    assert!(matches!(err, GenerateError::Misconfigured));
    assert_eq!(g.transport().calls(), 0);

    let g = generator(StubTransport::ok("unused"), Some("  "));
    assert!(matches!(g.generate("Jesus wept.").await, Err(GenerateError::Misconfigured)));
    assert_eq!(g.transport().calls(), 0);
  }

  #[tokio::test]
  async fn empty_verse_is_missing_input() {
    let g = generator(StubTransport::ok("unused"), Some("k"));
    assert!(matches!(g.generate(" \n").await, Err(GenerateError::MissingInput)));
    assert_eq!(g.transport().calls(), 0);
  }

  #[tokio::test]
  async fn sends_prompt_and_key_and_returns_first_part() {
    let g = generator(StubTransport::ok("## Grief\n- Jesus shares our sorrow"), Some("secret"));
    let text = g.generate("Jesus wept.").await.unwrap();
    assert_eq!(text, "## Grief\n- Jesus shares our sorrow");

    let requests = g.transport().requests.lock().unwrap();
    let (url, query, body) = &requests[0];
    assert_eq!(url, DEFAULT_API_URL);
    assert_eq!(query, &[("key".to_owned(), "secret".to_owned())]);
    let sent = body["contents"][0]["parts"][0]["text"].as_str().unwrap();
    assert!(sent.starts_with("Provide a Bible commentary with no preamble or postamble."));
    assert!(sent.ends_with("\n\nVerse: Jesus wept."));
  }

  #[tokio::test]
  async fn non_success_status_is_upstream_error() {
    let g = generator(
      StubTransport::replying(StatusCode::TOO_MANY_REQUESTS, "quota exceeded"),
      Some("k"),
    );
    match g.generate("Jesus wept.").await {
      Err(GenerateError::Upstream { status, message }) => {
        assert_eq!(status, Some(StatusCode::TOO_MANY_REQUESTS));
        assert_eq!(message, "quota exceeded");
      }
      other => panic!("unexpected: {other:?}"),
    }
  }

  #[tokio::test]
  async fn malformed_payloads_are_upstream_errors() {
    for body in [
      "not json",
      r#"{"candidates":[]}"#,
      r#"{"candidates":[{"content":{"parts":[]}}]}"#,
      r#"{"candidates":[{"finishReason":"SAFETY"}]}"#,
      r#"{"candidates":[{"content":{"parts":[{"text":""}]}}]}"#,
    ] {
      let g = generator(StubTransport::replying(StatusCode::OK, body), Some("k"));
      assert!(
        matches!(g.generate("Jesus wept.").await, Err(GenerateError::Upstream { status: None, .. })),
        "{body}"
      );
    }
  }
}
