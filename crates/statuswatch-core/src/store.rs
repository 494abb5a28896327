//! The [`SnapshotStore`] trait, the seam between sync logic and storage.

use std::future::Future;

use crate::snapshot::CacheSnapshot;

/// Abstraction over the durable snapshot cache.
///
/// Semantics are blob-like on purpose: `get` distinguishes "absent" from
/// failure, and `put` replaces the stored document wholesale. No locking
/// is provided; the poll worker is the only writer by construction.
pub trait SnapshotStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Fetch the snapshot stored under `key`. `Ok(None)` means the backing
  /// container or entry does not exist yet. A failed read is an error,
  /// never `None`; callers rely on the distinction.
  fn get<'a>(
    &'a self,
    key: &'a str,
  ) -> impl Future<Output = Result<Option<CacheSnapshot>, Self::Error>> + Send + 'a;

  /// Store `snapshot` under `key`, creating the backing container on
  /// first write and overwriting any previous document.
  fn put<'a>(
    &'a self,
    key: &'a str,
    snapshot: &'a CacheSnapshot,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;
}
