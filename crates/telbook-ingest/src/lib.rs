//! Legacy-data ingestion for Telbook.
//!
//! Reads heterogeneous legacy exports (a raw JSON array, or an HTML page
//! with the data embedded in a script tag), normalizes each record into
//! the canonical schema, and reconciles the batch against a contact store
//! with idempotent upsert semantics. Per-record failures are tallied, not
//! raised; one bad record never blocks the rest.

pub mod error;
mod normalize;
mod source;

use chrono::Utc;
use telbook_core::store::{ConflictPolicy, ContactStore};

pub use error::{Error, Result};
pub use normalize::normalize;
pub use source::{DEFAULT_SCRIPT_ID, LegacySource};

// ─── Statistics ──────────────────────────────────────────────────────────────

/// Per-run tallies. The counters always reconcile:
/// `inserted + updated + skipped + errors == total`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MigrationStats {
  pub total:    usize,
  /// Newly created records.
  pub inserted: usize,
  /// Existing records that were overwritten.
  pub updated:  usize,
  /// Existing records left untouched under `skip_duplicates`.
  pub skipped:  usize,
  /// Transform or write failures, each localized to its record.
  pub errors:   usize,
}

impl MigrationStats {
  pub fn is_clean(&self) -> bool { self.errors == 0 }
}

// ─── Driver ──────────────────────────────────────────────────────────────────

/// Run one migration batch against `store`.
///
/// With `skip_duplicates` the batch is insert-if-absent; otherwise every
/// record is upserted, overwriting all fields except `created_at` (set
/// only on first insert). Either way the whole batch is written in one
/// unordered pass and runs safely alongside live traffic — it assumes no
/// exclusive access to the collection.
pub async fn migrate<S: ContactStore>(
  store: &S,
  input: &str,
  source: &LegacySource,
  skip_duplicates: bool,
) -> Result<MigrationStats> {
  let raw_records = source.records(input)?;
  let total = raw_records.len();
  let now = Utc::now();

  let mut transform_errors = 0usize;
  let mut records = Vec::with_capacity(total);
  for raw in &raw_records {
    match normalize(raw, now) {
      Ok(contact) => records.push(contact),
      Err(e) => {
        tracing::warn!(error = %e, "skipping unusable legacy record");
        transform_errors += 1;
      }
    }
  }

  let policy = if skip_duplicates {
    ConflictPolicy::SkipExisting
  } else {
    ConflictPolicy::Overwrite
  };

  let outcome = store
    .bulk_reconcile(records, policy)
    .await
    .map_err(|e| Error::Store(e.into()))?;

  Ok(MigrationStats {
    total,
    inserted: outcome.inserted,
    updated:  outcome.updated,
    skipped:  outcome.skipped,
    errors:   transform_errors + outcome.errors,
  })
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use telbook_store_sqlite::SqliteStore;

  use super::*;

  async fn store() -> SqliteStore {
    SqliteStore::open_in_memory()
      .await
      .expect("in-memory store")
  }

  #[tokio::test]
  async fn migrates_a_json_array_end_to_end() {
    let s = store().await;
    let input = r#"[
      {"id": "42", "name": "Alice", "languages": "English, French",
       "tags": "", "email": "null", "is_ert": true},
      {"id": 43, "name": " Bob ", "extension": "100"}
    ]"#;

    let stats = migrate(&s, input, &LegacySource::JsonArray, false)
      .await
      .unwrap();
    assert_eq!(stats.total, 2);
    assert_eq!(stats.inserted, 2);
    assert_eq!(stats.errors, 0);

    use telbook_core::store::ContactStore as _;
    let alice = s.get("42").await.unwrap().unwrap();
    assert_eq!(alice.languages, ["English", "French"]);
    assert_eq!(alice.tags, Vec::<String>::new());
    assert_eq!(alice.email, None);
    assert!(alice.expose);
    assert!(alice.is_ert);

    let bob = s.get("43").await.unwrap().unwrap();
    assert_eq!(bob.name, "Bob");
    assert_eq!(bob.extension.as_deref(), Some("100"));
  }

  #[tokio::test]
  async fn one_malformed_record_does_not_block_the_rest() {
    let s = store().await;
    let mut records: Vec<String> = (1..=9)
      .map(|i| format!(r#"{{"id": "{i:04}", "name": "Contact {i}"}}"#))
      .collect();
    records.push(r#"{"id": "0010", "name": 404}"#.to_string());
    let input = format!("[{}]", records.join(","));

    let stats = migrate(&s, &input, &LegacySource::JsonArray, false)
      .await
      .unwrap();
    assert_eq!(stats.total, 10);
    assert_eq!(stats.errors, 1);
    assert_eq!(stats.inserted, 9);
    assert_eq!(
      stats.inserted + stats.updated + stats.skipped + stats.errors,
      stats.total
    );

    use telbook_core::store::ContactStore as _;
    assert!(s.get("0009").await.unwrap().is_some());
    assert!(s.get("0010").await.unwrap().is_none());
  }

  #[tokio::test]
  async fn rerunning_an_upsert_migration_is_idempotent() {
    let s = store().await;
    let input = r#"[{"id": "42", "name": "Alice"}, {"id": "43", "name": "Bob"}]"#;

    let first = migrate(&s, input, &LegacySource::JsonArray, false)
      .await
      .unwrap();
    assert_eq!(first.inserted, 2);

    use telbook_core::store::ContactStore as _;
    let created_before = s.get("42").await.unwrap().unwrap().created_at;

    let second = migrate(&s, input, &LegacySource::JsonArray, false)
      .await
      .unwrap();
    assert_eq!(second.inserted, 0);
    assert_eq!(second.updated, second.total);

    let after = s.get("42").await.unwrap().unwrap();
    assert_eq!(after.created_at, created_before);
    assert!(after.updated_at > after.created_at);
  }

  #[tokio::test]
  async fn skip_duplicates_leaves_existing_records_alone() {
    let s = store().await;
    let input = r#"[{"id": "42", "name": "Alice"}]"#;
    migrate(&s, input, &LegacySource::JsonArray, false)
      .await
      .unwrap();

    let replay = r#"[{"id": "42", "name": "Impostor"}, {"id": "44", "name": "Cleo"}]"#;
    let stats = migrate(&s, replay, &LegacySource::JsonArray, true)
      .await
      .unwrap();
    assert_eq!(stats.inserted, 1);
    assert_eq!(stats.skipped, 1);
    assert_eq!(stats.updated, 0);

    use telbook_core::store::ContactStore as _;
    assert_eq!(s.get("42").await.unwrap().unwrap().name, "Alice");
  }

  #[tokio::test]
  async fn migrates_from_an_embedded_script() {
    let s = store().await;
    let html = r#"<html><head>
      <script id="contactData">
        var directory = [{"id": "7", "name": "Grace"}];
      </script>
    </head></html>"#;

    let stats = migrate(&s, html, &LegacySource::embedded(), false)
      .await
      .unwrap();
    assert_eq!(stats.inserted, 1);

    use telbook_core::store::ContactStore as _;
    assert_eq!(s.get("7").await.unwrap().unwrap().name, "Grace");
  }
}
