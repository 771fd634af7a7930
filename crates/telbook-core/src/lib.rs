//! Core types and trait definitions for the Telbook directory service.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! All other crates depend on it; it depends on nothing proprietary.

pub mod asset;
pub mod contact;
pub mod error;
pub mod patch;
pub mod query;
pub mod store;

pub use error::{Error, Result};
