//! Async HTTP client wrapping the Selah JSON API.

use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use reqwest::{Client, Response};
use selah_core::{
  corpus::Verse,
  navigation::BookSummary,
  protocol::{CommentaryRequest, CommentaryResponse, ErrorBody, VersesResponse},
};

/// Async HTTP client for the Selah JSON API.
///
/// Cheap to clone; the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct ApiClient {
  client:   Client,
  base_url: String,
}

impl ApiClient {
  pub fn new(base_url: impl Into<String>) -> Result<Self> {
    let client = Client::builder()
      .timeout(Duration::from_secs(60))
      .build()
      .context("failed to build HTTP client")?;
    Ok(Self { client, base_url: base_url.into() })
  }

  fn url(&self, path: &str) -> String {
    format!("{}/api{}", self.base_url.trim_end_matches('/'), path)
  }

  /// `GET /api/books`
  pub async fn books(&self) -> Result<Vec<BookSummary>> {
    let resp = self
      .client
      .get(self.url("/books"))
      .send()
      .await
      .context("GET /books failed")?;

    let resp = check(resp, "GET /books").await?;
    resp.json().await.context("deserialising books")
  }

  /// `GET /api/verses?book=<book>&chapter=<chapter>`
  pub async fn verses(&self, book: &str, chapter: u32) -> Result<Vec<Verse>> {
    let resp = self
      .client
      .get(self.url("/verses"))
      .query(&[("book", book.to_string()), ("chapter", chapter.to_string())])
      .send()
      .await
      .context("GET /verses failed")?;

    let resp = check(resp, "GET /verses").await?;
    let body: VersesResponse = resp.json().await.context("deserialising verses")?;
    Ok(body.into_verses(book, chapter))
  }

  /// `POST /api/commentary`
  pub async fn commentary(&self, verse_text: &str) -> Result<String> {
    let resp = self
      .client
      .post(self.url("/commentary"))
      .json(&CommentaryRequest { verse: Some(verse_text.to_string()) })
      .send()
      .await
      .context("POST /commentary failed")?;

    let resp = check(resp, "POST /commentary").await?;
    let body: CommentaryResponse = resp.json().await.context("deserialising commentary")?;
    Ok(body.commentary)
  }
}

/// Pass successful responses through; turn the rest into the server's
/// `{"error": …}` message when it sent one.
async fn check(resp: Response, what: &str) -> Result<Response> {
  let status = resp.status();
  if status.is_success() {
    return Ok(resp);
  }
  match resp.json::<ErrorBody>().await {
    Ok(body) => Err(anyhow!("{}", body.error)),
    Err(_) => Err(anyhow!("{what} → {status}")),
  }
}
