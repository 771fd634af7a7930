//! The `ContactStore` trait and supporting bulk-write types.
//!
//! The trait is implemented by storage backends (e.g.
//! `telbook-store-sqlite`). Higher layers (`telbook-api`,
//! `telbook-ingest`) depend on this abstraction, not on any concrete
//! backend.

use std::future::Future;

use crate::{
  contact::{Contact, NewContact},
  patch::ContactPatch,
  query::{ContactPage, ContactQuery},
};

// ─── Bulk reconciliation types ───────────────────────────────────────────────

/// How [`ContactStore::bulk_reconcile`] treats a record whose id already
/// exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConflictPolicy {
  /// Upsert: overwrite every field except `created_at`, which is set only
  /// on first insert.
  #[default]
  Overwrite,
  /// Insert-if-absent: existing records are left untouched.
  SkipExisting,
}

/// Per-batch write tallies. Record-level failures are counted here, never
/// raised individually.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BulkOutcome {
  pub inserted: usize,
  pub updated:  usize,
  pub skipped:  usize,
  pub errors:   usize,
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a Telbook contact store backend.
///
/// Absent records are `Ok(None)` / `false`, not errors. Domain failures
/// (duplicate email, id-allocation exhaustion) surface through the
/// backend's error type, which must convert into the shared
/// [`crate::Error`] taxonomy so callers can match on them.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait ContactStore: Send + Sync {
  type Error: std::error::Error + Into<crate::Error> + Send + Sync + 'static;

  /// The next sequential id: current maximum numeric id plus one,
  /// zero-padded to four digits; `"0001"` on an empty store. A
  /// non-numeric maximum falls back to `count + 1` (best-effort only —
  /// not safe under concurrent creators, which is why [`Self::create`]
  /// owns the retry).
  fn next_id(
    &self,
  ) -> impl Future<Output = Result<String, Self::Error>> + Send + '_;

  /// Assign an id, stamp both timestamps, persist and return the record.
  /// Fails on a duplicate non-empty email. Id collisions with concurrent
  /// creators are retried transparently a bounded number of times.
  fn create(
    &self,
    candidate: NewContact,
  ) -> impl Future<Output = Result<Contact, Self::Error>> + Send + '_;

  fn get<'a>(
    &'a self,
    id: &'a str,
  ) -> impl Future<Output = Result<Option<Contact>, Self::Error>> + Send + 'a;

  /// Merge only the set fields of `patch` into the stored record and
  /// refresh `updated_at`. Setting `email` to a value held by a different
  /// record fails; re-setting a record's own email is allowed.
  fn update<'a>(
    &'a self,
    id: &'a str,
    patch: ContactPatch,
  ) -> impl Future<Output = Result<Option<Contact>, Self::Error>> + Send + 'a;

  /// Hard removal. `true` iff a record existed and was removed.
  fn delete<'a>(
    &'a self,
    id: &'a str,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + 'a;

  /// Execute `query` and return one page plus the total count over the
  /// filtered set.
  fn list<'a>(
    &'a self,
    query: &'a ContactQuery,
  ) -> impl Future<Output = Result<ContactPage, Self::Error>> + Send + 'a;

  /// Sorted distinct union of every record's `tags`.
  fn distinct_tags(
    &self,
  ) -> impl Future<Output = Result<Vec<String>, Self::Error>> + Send + '_;

  /// Sorted distinct union of every record's `languages`, with
  /// `"English"` removed regardless of case (fixed business rule, not a
  /// filter parameter).
  fn distinct_languages(
    &self,
  ) -> impl Future<Output = Result<Vec<String>, Self::Error>> + Send + '_;

  /// Write a migration batch in one unordered pass. Ids are taken from
  /// the records verbatim and per-record duplicate-email checks do not
  /// apply; a failing record is tallied in the outcome and does not block
  /// the rest.
  fn bulk_reconcile(
    &self,
    records: Vec<Contact>,
    policy: ConflictPolicy,
  ) -> impl Future<Output = Result<BulkOutcome, Self::Error>> + Send + '_;
}
