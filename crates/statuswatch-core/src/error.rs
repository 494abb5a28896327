//! Error types for `statuswatch-core`.

use thiserror::Error;

/// Boxed error surfaced by a pluggable backend (store or feed client).
pub type BackendError = Box<dyn std::error::Error + Send + Sync>;

/// Failure of a single poll cycle, tagged with the stage that failed.
#[derive(Debug, Error)]
pub enum PollError {
  /// The previous snapshot could not be read. Distinct from "no snapshot
  /// yet": treating a transient read failure as empty state would reset
  /// the watermark and re-fetch history that is already cached.
  #[error("cache read failed: {0}")]
  CacheRead(#[source] BackendError),

  /// The feed query failed. Nothing has been written; the cached snapshot
  /// keeps serving until the next cycle succeeds.
  #[error("event source query failed: {0}")]
  SourceQuery(#[source] BackendError),

  /// The merged snapshot could not be persisted. The previous snapshot is
  /// untouched and the merge result is rebuilt on the next cycle.
  #[error("cache write failed: {0}")]
  CacheWrite(#[source] BackendError),
}

pub type Result<T, E = PollError> = std::result::Result<T, E>;
