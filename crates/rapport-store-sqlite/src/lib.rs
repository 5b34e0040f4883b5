//! SQLite backend for the Rapport persistence gateway.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime. Uniqueness rules are enforced by the
//! schema and reported as conflicts through [`rapport_core::store::StoreError`].

mod encode;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;
