//! `selah-server convert`: turn a tab-separated spreadsheet export into the
//! corpus JSON file the server loads.

use std::path::Path;

use anyhow::Context as _;
use selah_core::reference::{ConversionSummary, convert_tsv};

/// Read `input`, write the corpus to `output`, and report what was kept.
pub fn convert_file(input: &Path, output: &Path) -> anyhow::Result<ConversionSummary> {
  let raw = std::fs::read_to_string(input)
    .with_context(|| format!("failed to read {}", input.display()))?;

  let (corpus, summary) = convert_tsv(&raw);
  let json = corpus.to_json_pretty().context("failed to encode corpus")?;

  if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
    std::fs::create_dir_all(parent)
      .with_context(|| format!("failed to create {}", parent.display()))?;
  }
  std::fs::write(output, json)
    .with_context(|| format!("failed to write {}", output.display()))?;

  tracing::info!(
    books = summary.books,
    chapters = summary.chapters,
    verses = summary.verses,
    skipped = summary.skipped,
    output = %output.display(),
    "corpus written"
  );
  Ok(summary)
}

#[cfg(test)]
mod tests {
  use selah_core::corpus::Corpus;

  use super::*;

  #[test]
  fn converts_export_to_loadable_corpus() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("bible.tsv");
    let output = dir.path().join("public").join("bible_data.json");
    std::fs::write(
      &input,
      "id\treference\ttext\n\
       1\tExodus 3:14\tI am\n\
       2\tnot a reference\tdropped\n\
       3\tExodus 3:15\tThis is my name for ever\n",
    )
    .unwrap();

    let summary = convert_file(&input, &output).unwrap();
    assert_eq!(summary.verses, 2);
    assert_eq!(summary.skipped, 1);

    let corpus = Corpus::load(&output).unwrap();
    let verses = corpus.verses("Exodus", 3).unwrap();
    assert_eq!(verses[0].verse, 14);
    assert_eq!(verses[0].text, "I am");
  }

  #[test]
  fn missing_input_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = convert_file(&dir.path().join("absent.tsv"), &dir.path().join("out.json"));
    assert!(err.is_err());
  }
}
