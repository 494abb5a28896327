//! The persisted cache document.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::event::HealthEvent;

/// The single JSON document holding the entire known event set for one
/// subscription.
///
/// The synchronization engine maintains three invariants on every write:
/// keyed events are unique by identity key, `events` is sorted most
/// recently updated first (unreadable timestamps last), and
/// `last_event_time` carries the raw timestamp of `events[0]`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CacheSnapshot {
  pub subscription_id: String,
  /// When this snapshot was written; drives freshness classification.
  pub cached_at:       DateTime<Utc>,
  /// Watermark for the next poll, as the raw feed string of the newest
  /// event.
  pub last_event_time: String,
  /// Identity keys of all keyed events, for quick inspection without
  /// walking `events`.
  pub tracking_ids:    Vec<String>,
  pub events:          Vec<HealthEvent>,
}
