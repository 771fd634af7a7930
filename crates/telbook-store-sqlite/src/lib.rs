//! SQLite backend for the Telbook contact store.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated
//! thread without blocking the async runtime. Every store operation is a
//! single `call` against the connection, which gives the per-document
//! atomic read-modify-write the concurrency model relies on.

mod encode;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;
