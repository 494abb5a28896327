//! Error type for `statuswatch-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// The store was opened without a database path.
  #[error("no database path configured")]
  NotConfigured,

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  /// A stored document failed to parse. A corrupt cache is reported, never
  /// passed off as an absent one.
  #[error("stored snapshot is not valid JSON: {0}")]
  Json(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
