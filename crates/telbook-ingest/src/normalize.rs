//! Normalization of heterogeneous legacy records into the canonical
//! contact shape.
//!
//! Legacy exports are messy: ids may be numbers, multi-valued fields may
//! be comma-delimited strings, and "empty" comes in several spellings
//! (`""`, `null`, the literal string `"null"`). Everything here is
//! per-record; one bad record yields a [`Error::Transform`] and leaves the
//! rest of the batch alone.

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use telbook_core::contact::Contact;

use crate::error::{Error, Result};

/// Transform one legacy record.
///
/// The external identifier is imported verbatim as the canonical id (empty
/// string when absent) — migration never consults the sequential id
/// allocator. `expose` is forced true regardless of any legacy value, and
/// both timestamps are stamped at transform time.
pub fn normalize(raw: &Value, now: DateTime<Utc>) -> Result<Contact> {
  let Some(record) = raw.as_object() else {
    return Err(Error::Transform {
      id:     id_string(raw.get("id")),
      reason: "not a JSON object".to_string(),
    });
  };

  let id = id_string(record.get("id"));

  let name = match record.get("name") {
    None | Some(Value::Null) => String::new(),
    Some(Value::String(s)) => s.trim().to_string(),
    Some(other) => {
      return Err(Error::Transform {
        id,
        reason: format!("name is not a string: {other}"),
      });
    }
  };

  Ok(Contact {
    languages: string_list(record, "languages", &id)?,
    tags: string_list(record, "tags", &id)?,
    id,
    name,
    extension: optional_scalar(record.get("extension")),
    company: optional_scalar(record.get("company")),
    department: optional_scalar(record.get("department")),
    designation: optional_scalar(record.get("designation")),
    mobile: optional_scalar(record.get("mobile")),
    landline: optional_scalar(record.get("landline")),
    email: optional_scalar(record.get("email")),
    website: optional_scalar(record.get("website")),
    comments: optional_scalar(record.get("comments")),
    // Legacy visibility values like "all" are never interpreted.
    expose: true,
    is_ert: record.get("is_ert").and_then(Value::as_bool).unwrap_or(false),
    is_ifa: false,
    is_third_party: false,
    profile_picture: None,
    created_at: now,
    updated_at: now,
  })
}

/// String-cast of the legacy id; empty when absent or null.
fn id_string(value: Option<&Value>) -> String {
  match value {
    None | Some(Value::Null) => String::new(),
    Some(Value::String(s)) => s.clone(),
    Some(other) => other.to_string(),
  }
}

/// Empty string, `null`, and the literal string `"null"` all mean "not
/// set"; anything else is string-cast.
fn optional_scalar(value: Option<&Value>) -> Option<String> {
  match value {
    None | Some(Value::Null) => None,
    Some(Value::String(s)) if s.is_empty() || s == "null" => None,
    Some(Value::String(s)) => Some(s.clone()),
    Some(other) => Some(other.to_string()),
  }
}

/// Accept a sequence unchanged, split-trim a comma-delimited string
/// (dropping empty segments), and treat `null`/absent/empty-string as the
/// empty sequence.
fn string_list(
  record: &Map<String, Value>,
  key: &'static str,
  id: &str,
) -> Result<Vec<String>> {
  match record.get(key) {
    None | Some(Value::Null) => Ok(Vec::new()),
    Some(Value::Array(items)) => items
      .iter()
      .map(|item| match item {
        Value::String(s) => Ok(s.clone()),
        other => Err(Error::Transform {
          id:     id.to_string(),
          reason: format!("{key} element is not a string: {other}"),
        }),
      })
      .collect(),
    Some(Value::String(s)) => Ok(
      s.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(str::to_string)
        .collect(),
    ),
    Some(_) => Ok(Vec::new()),
  }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use chrono::TimeZone;
  use serde_json::json;

  use super::*;

  fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap()
  }

  #[test]
  fn comma_delimited_lists_are_split_and_trimmed() {
    let raw = json!({"id": "42", "languages": "English, French", "tags": ""});
    let c = normalize(&raw, now()).unwrap();
    assert_eq!(c.id, "42");
    assert_eq!(c.languages, ["English", "French"]);
    assert_eq!(c.tags, Vec::<String>::new());
    assert!(c.expose);
  }

  #[test]
  fn already_sequenced_lists_pass_through() {
    let raw = json!({"id": "1", "tags": ["A", "B"]});
    let c = normalize(&raw, now()).unwrap();
    assert_eq!(c.tags, ["A", "B"]);
  }

  #[test]
  fn numeric_id_is_string_cast() {
    let raw = json!({"id": 42, "name": "Alice"});
    let c = normalize(&raw, now()).unwrap();
    assert_eq!(c.id, "42");
  }

  #[test]
  fn absent_id_becomes_empty_string() {
    let raw = json!({"name": "Alice"});
    let c = normalize(&raw, now()).unwrap();
    assert_eq!(c.id, "");
  }

  #[test]
  fn name_is_trimmed() {
    let raw = json!({"id": "1", "name": "  Alice  "});
    let c = normalize(&raw, now()).unwrap();
    assert_eq!(c.name, "Alice");
  }

  #[test]
  fn empty_spellings_normalize_to_absent() {
    let raw = json!({
      "id": "1",
      "email": "",
      "mobile": "null",
      "landline": null,
      "company": "Fairmont The Palm"
    });
    let c = normalize(&raw, now()).unwrap();
    assert_eq!(c.email, None);
    assert_eq!(c.mobile, None);
    assert_eq!(c.landline, None);
    assert_eq!(c.company.as_deref(), Some("Fairmont The Palm"));
  }

  #[test]
  fn legacy_expose_values_are_overwritten() {
    let raw = json!({"id": "1", "expose": "all"});
    let c = normalize(&raw, now()).unwrap();
    assert!(c.expose);
  }

  #[test]
  fn is_ert_carries_through_with_default_false() {
    let raw = json!({"id": "1", "is_ert": true});
    assert!(normalize(&raw, now()).unwrap().is_ert);
    let raw = json!({"id": "2"});
    assert!(!normalize(&raw, now()).unwrap().is_ert);
  }

  #[test]
  fn timestamps_are_stamped_at_transform_time() {
    let raw = json!({"id": "1"});
    let c = normalize(&raw, now()).unwrap();
    assert_eq!(c.created_at, now());
    assert_eq!(c.updated_at, now());
  }

  #[test]
  fn non_object_record_is_a_transform_error() {
    let err = normalize(&json!("just a string"), now()).unwrap_err();
    assert!(matches!(err, Error::Transform { .. }));
  }

  #[test]
  fn non_string_name_is_a_transform_error() {
    let err = normalize(&json!({"id": "1", "name": 7}), now()).unwrap_err();
    assert!(matches!(err, Error::Transform { id, .. } if id == "1"));
  }
}
