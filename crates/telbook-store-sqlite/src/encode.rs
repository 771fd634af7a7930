//! Encoding and decoding helpers between Rust domain types and the
//! plain-text representations stored in SQLite columns.
//!
//! Timestamps are RFC 3339 strings; `languages` and `tags` are compact
//! JSON arrays. Decode failures are reported through
//! [`rusqlite::Error::FromSqlConversionFailure`] so they can surface from
//! inside a row mapper without a second error channel.

use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use telbook_core::contact::Contact;

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(idx: usize, s: &str) -> rusqlite::Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| {
      rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e))
    })
}

// ─── String lists ────────────────────────────────────────────────────────────

pub fn encode_list(items: &[String]) -> rusqlite::Result<String> {
  serde_json::to_string(items)
    .map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))
}

pub fn decode_list(idx: usize, s: &str) -> rusqlite::Result<Vec<String>> {
  serde_json::from_str(s).map_err(|e| {
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e))
  })
}

// ─── Row mapping ─────────────────────────────────────────────────────────────

/// Column list every full-row SELECT uses; order must match
/// [`contact_from_row`].
pub const CONTACT_COLUMNS: &str = "contact_id, name, extension, company, \
                                   department, designation, mobile, \
                                   landline, email, website, comments, \
                                   languages, tags, expose, is_ert, is_ifa, \
                                   is_third_party, profile_picture, \
                                   created_at, updated_at";

pub fn contact_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Contact> {
  let languages_json: String = row.get(11)?;
  let tags_json: String = row.get(12)?;
  let created_at_str: String = row.get(18)?;
  let updated_at_str: String = row.get(19)?;

  Ok(Contact {
    id:              row.get(0)?,
    name:            row.get(1)?,
    extension:       row.get(2)?,
    company:         row.get(3)?,
    department:      row.get(4)?,
    designation:     row.get(5)?,
    mobile:          row.get(6)?,
    landline:        row.get(7)?,
    email:           row.get(8)?,
    website:         row.get(9)?,
    comments:        row.get(10)?,
    languages:       decode_list(11, &languages_json)?,
    tags:            decode_list(12, &tags_json)?,
    expose:          row.get(13)?,
    is_ert:          row.get(14)?,
    is_ifa:          row.get(15)?,
    is_third_party:  row.get(16)?,
    profile_picture: row.get(17)?,
    created_at:      decode_dt(18, &created_at_str)?,
    updated_at:      decode_dt(19, &updated_at_str)?,
  })
}
