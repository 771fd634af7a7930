//! Legacy record sources.
//!
//! Both variants yield the same loosely-typed record shape
//! (`serde_json::Value`) consumed by the normalizer, so the parsing
//! strategy stays swappable without touching normalization logic.

use std::sync::LazyLock;

use regex::Regex;
use scraper::{Html, Selector};
use serde_json::Value;

use crate::error::{Error, Result};

/// The script-tag id the legacy site embedded its directory data under.
pub const DEFAULT_SCRIPT_ID: &str = "contactData";

/// A JSON-producing assignment expression, e.g.
/// `var contacts = [ ... ];` — the historical embedding format.
static ASSIGNMENT: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"(?s)(?:var|const|let)\s+\w+\s*=\s*(\[.*\])\s*;?")
    .expect("assignment pattern")
});

// ─── LegacySource ────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub enum LegacySource {
  /// A raw JSON array of legacy records.
  JsonArray,
  /// An HTML document carrying the records inside a named `<script>` tag.
  EmbeddedScript { script_id: String },
}

impl LegacySource {
  /// The embedded-script source with the legacy site's default tag id.
  pub fn embedded() -> Self {
    Self::EmbeddedScript { script_id: DEFAULT_SCRIPT_ID.to_string() }
  }

  /// Read `input` into the loosely-typed intermediate record shape.
  pub fn records(&self, input: &str) -> Result<Vec<Value>> {
    match self {
      Self::JsonArray => json_records(input),
      Self::EmbeddedScript { script_id } => embedded_records(input, script_id),
    }
  }
}

fn json_records(input: &str) -> Result<Vec<Value>> {
  match serde_json::from_str::<Value>(input)? {
    Value::Array(records) => Ok(records),
    _ => Err(Error::NotAnArray),
  }
}

/// Extract the record array from the first matching script element whose
/// body parses. Two embedding strategies are tried per element; a parse
/// failure on one does not abort the other, nor later elements.
fn embedded_records(html: &str, script_id: &str) -> Result<Vec<Value>> {
  let document = Html::parse_document(html);
  let selector = Selector::parse(&format!("script#{script_id}"))
    .map_err(|_| Error::InvalidScriptId(script_id.to_string()))?;

  for script in document.select(&selector) {
    let body: String = script.text().collect();

    // Strategy 1: assignment expression.
    if let Some(captures) = ASSIGNMENT.captures(&body)
      && let Ok(Value::Array(records)) = serde_json::from_str(&captures[1])
    {
      return Ok(records);
    }

    // Strategy 2: the script body is the JSON array itself.
    if let Ok(Value::Array(records)) = serde_json::from_str(body.trim()) {
      return Ok(records);
    }
  }

  Err(Error::MissingPayload)
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn json_array_source() {
    let records = LegacySource::JsonArray
      .records(r#"[{"id":"1"},{"id":"2"}]"#)
      .unwrap();
    assert_eq!(records.len(), 2);
  }

  #[test]
  fn json_object_is_rejected() {
    let err = LegacySource::JsonArray
      .records(r#"{"id":"1"}"#)
      .unwrap_err();
    assert!(matches!(err, Error::NotAnArray));
  }

  #[test]
  fn embedded_assignment_expression() {
    let html = r#"<html><body>
      <script id="contactData">
        var contacts = [{"id":"1","name":"Alice"}];
      </script>
    </body></html>"#;
    let records = LegacySource::embedded().records(html).unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["name"], "Alice");
  }

  #[test]
  fn embedded_direct_json() {
    let html = r#"<script id="contactData">[{"id":"1"}]</script>"#;
    let records = LegacySource::embedded().records(html).unwrap();
    assert_eq!(records.len(), 1);
  }

  #[test]
  fn first_well_formed_script_wins() {
    let html = r#"
      <script id="contactData">var broken = [{"id":;</script>
      <script id="contactData">const contacts = [{"id":"7"}];</script>
    "#;
    let records = LegacySource::embedded().records(html).unwrap();
    assert_eq!(records[0]["id"], "7");
  }

  #[test]
  fn other_script_ids_are_ignored() {
    let html = r#"<script id="analytics">var x = [{"id":"1"}];</script>"#;
    let err = LegacySource::embedded().records(html).unwrap_err();
    assert!(matches!(err, Error::MissingPayload));
  }

  #[test]
  fn unparseable_script_id_is_an_error() {
    let source = LegacySource::EmbeddedScript { script_id: "bad id".into() };
    let err = source.records("<html></html>").unwrap_err();
    assert!(matches!(err, Error::InvalidScriptId(_)));
  }
}
