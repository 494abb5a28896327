//! The [`EventSource`] trait, the seam between sync logic and the feed.

use std::future::Future;

use chrono::{DateTime, Utc};

use crate::event::HealthEvent;

/// Abstraction over the upstream health-event feed.
pub trait EventSource: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Fetch candidate events for `subscription_id`.
  ///
  /// Implementations return the union of events that are currently active
  /// and events updated at or after `window_start`: a long-running issue
  /// that last changed before the window must still be included. Ordering
  /// of the returned batch is unspecified.
  fn fetch<'a>(
    &'a self,
    subscription_id: &'a str,
    window_start: DateTime<Utc>,
  ) -> impl Future<Output = Result<Vec<HealthEvent>, Self::Error>> + Send + 'a;
}
