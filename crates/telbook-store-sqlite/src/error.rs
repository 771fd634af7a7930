//! Error type for `telbook-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] telbook_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),
}

// Backends must surface through the shared caller-visible taxonomy;
// anything that isn't already a domain error is an opaque store failure.
impl From<Error> for telbook_core::Error {
  fn from(e: Error) -> Self {
    match e {
      Error::Core(inner) => inner,
      Error::Database(inner) => telbook_core::Error::Store(Box::new(inner)),
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
