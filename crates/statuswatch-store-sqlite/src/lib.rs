//! SQLite backend for the statuswatch snapshot cache.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated
//! thread without blocking the async runtime. One row per cache key; the
//! snapshot is stored as a single JSON document.

mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;
