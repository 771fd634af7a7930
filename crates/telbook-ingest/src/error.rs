//! Error types for the legacy-data ingestion pipeline.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("input is not a JSON array of records")]
  NotAnArray,

  #[error("no contact payload found in document")]
  MissingPayload,

  #[error("invalid script id {0:?}")]
  InvalidScriptId(String),

  #[error("invalid JSON: {0}")]
  Json(#[from] serde_json::Error),

  /// A single legacy record could not be normalized; localized to that
  /// record during migration and tallied, never raised batch-wide.
  #[error("record {id:?} could not be transformed: {reason}")]
  Transform { id: String, reason: String },

  #[error("store error: {0}")]
  Store(#[source] telbook_core::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
