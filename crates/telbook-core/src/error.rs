//! Error types for `telbook-core`.
//!
//! This is the caller-visible taxonomy: storage backends keep their own
//! error enums but must convert into this one (see
//! [`crate::store::ContactStore::Error`]). Absence is not an error —
//! lookups return `Option` and the API layer decides what a missing id
//! means.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// The email uniqueness invariant would be violated.
  #[error("a contact with email {0:?} already exists")]
  DuplicateEmail(String),

  /// A field failed length or shape validation before reaching the store.
  #[error("invalid {field}: {reason}")]
  Validation {
    field:  &'static str,
    reason: String,
  },

  /// Sequential id assignment kept colliding with concurrent creators.
  #[error("could not allocate a contact id after {attempts} attempts")]
  IdAllocation { attempts: u32 },

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),

  /// Transient or unexpected failure from the persistent store.
  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
