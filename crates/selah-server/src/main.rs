//! selah-server binary.
//!
//! Reads `config.toml` (or the path given with `--config`) overlaid by
//! `SELAH_*` environment variables, loads the corpus, and serves the JSON API
//! over HTTP.
//!
//! # Building the corpus
//!
//! ```text
//! selah-server convert bible.tsv --output public/bible_data.json
//! ```

use std::{
  path::{Path, PathBuf},
  sync::Arc,
  time::Duration,
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use selah_api::{AppState, GeminiGenerator, ReqwestTransport};
use selah_core::corpus::Corpus;
use selah_server::{ServerConfig, convert::convert_file};
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Selah scripture server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  #[command(subcommand)]
  command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
  /// Serve the API (default).
  Serve,
  /// Convert a tab-separated spreadsheet export into corpus JSON and exit.
  Convert {
    /// Export with a header row, then `id<TAB>reference<TAB>text` rows.
    input:  PathBuf,
    #[arg(short, long, default_value = "public/bible_data.json")]
    output: PathBuf,
  },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Initialise tracing.
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  // Helper mode: convert and exit.
  if let Some(Command::Convert { input, output }) = &cli.command {
    convert_file(&expand_tilde(input), &expand_tilde(output))?;
    return Ok(());
  }

  // Load configuration.
  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config).required(false))
    .add_source(config::Environment::with_prefix("SELAH"))
    .build()
    .context("failed to read config file")?;

  let mut server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;

  if server_cfg.gemini_api_key.is_none() {
    server_cfg.gemini_api_key = std::env::var("GEMINI_API_KEY").ok();
  }

  // Load the corpus.
  let corpus_path = expand_tilde(&server_cfg.corpus_path);
  let corpus = match Corpus::load(&corpus_path) {
    Ok(corpus) => Some(Arc::new(corpus)),
    Err(e) if !server_cfg.require_corpus => {
      tracing::error!("{e}; corpus routes will answer 500");
      None
    }
    Err(e) => {
      return Err(e).with_context(|| format!("failed to load corpus at {corpus_path:?}"));
    }
  };

  // Upstream commentary client.
  let transport = ReqwestTransport::new(server_cfg.upstream_timeout_secs.map(Duration::from_secs))
    .context("failed to build HTTP client")?;
  let generator = GeminiGenerator::new(
    transport,
    server_cfg.gemini_api_key.clone(),
    server_cfg.gemini_api_url.clone(),
  );
  if !generator.is_configured() {
    tracing::warn!("no upstream API key configured; commentary requests will fail");
  }

  let state = AppState::new(corpus, Arc::new(generator));
  let app = selah_server::router(state);
  let address = format!("{}:{}", server_cfg.host, server_cfg.port);

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
