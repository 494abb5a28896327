//! Health events, the unit of the cloud service-health feed.
//!
//! Field names mirror the feed's JSON, so everything serializes camelCase.
//! `lastUpdateTime` is kept as the raw feed string and parsed on demand: a
//! mangled timestamp must never abort a merge, so parse failures degrade
//! (the event sorts last and drops out of trend windows) instead of
//! erroring.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

// ─── Open Value Sets ─────────────────────────────────────────────────────────

/// Category of a health event. The feed grows new categories over time;
/// unknown values are carried verbatim rather than rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventType {
  ServiceIssue,
  PlannedMaintenance,
  #[serde(untagged)]
  Other(String),
}

impl EventType {
  pub fn as_str(&self) -> &str {
    match self {
      Self::ServiceIssue => "ServiceIssue",
      Self::PlannedMaintenance => "PlannedMaintenance",
      Self::Other(s) => s,
    }
  }
}

impl Default for EventType {
  fn default() -> Self { Self::Other(String::new()) }
}

impl From<&str> for EventType {
  fn from(s: &str) -> Self {
    match s {
      "ServiceIssue" => Self::ServiceIssue,
      "PlannedMaintenance" => Self::PlannedMaintenance,
      other => Self::Other(other.to_owned()),
    }
  }
}

/// Lifecycle state of a health event. Same open-set treatment as
/// [`EventType`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventStatus {
  Active,
  Resolved,
  #[serde(untagged)]
  Other(String),
}

impl EventStatus {
  pub fn as_str(&self) -> &str {
    match self {
      Self::Active => "Active",
      Self::Resolved => "Resolved",
      Self::Other(s) => s,
    }
  }

  /// Only `Active` counts as an ongoing issue; every other value,
  /// including unknowns, does not.
  pub fn is_active(&self) -> bool { matches!(self, Self::Active) }
}

impl Default for EventStatus {
  fn default() -> Self { Self::Other(String::new()) }
}

impl From<&str> for EventStatus {
  fn from(s: &str) -> Self {
    match s {
      "Active" => Self::Active,
      "Resolved" => Self::Resolved,
      other => Self::Other(other.to_owned()),
    }
  }
}

// ─── Impact Records ──────────────────────────────────────────────────────────

/// One impacted service and the regions affected within it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ServiceImpact {
  pub service: String,
  pub regions: Vec<String>,
}

// ─── Health Events ───────────────────────────────────────────────────────────

/// A single health event as cached. At most one event per identity key
/// survives a merge, and the most recently updated version wins.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HealthEvent {
  /// Opaque resource identifier; empty on some degraded feed rows.
  pub id:                String,
  /// Preferred deduplication key when present.
  pub tracking_id:       Option<String>,
  pub event_type:        EventType,
  pub status:            EventStatus,
  pub title:             String,
  pub summary:           String,
  /// Severity label, an open set ("Warning", "Error", ...).
  pub level:             String,
  /// Impact records in feed order.
  pub impacted_services: Vec<ServiceImpact>,
  /// Authoritative ordering field, kept as the raw feed string.
  pub last_update_time:  String,
}

impl HealthEvent {
  /// The deduplication key: the tracking id when non-blank, else the
  /// resource id, else `None`. Events without a key cannot be
  /// deduplicated and every occurrence is treated as distinct.
  pub fn identity_key(&self) -> Option<&str> {
    match self.tracking_id.as_deref() {
      Some(tracking) if !tracking.trim().is_empty() => Some(tracking),
      _ if !self.id.trim().is_empty() => Some(&self.id),
      _ => None,
    }
  }

  /// `lastUpdateTime`, parsed leniently. `None` when the feed string is
  /// blank or unreadable.
  pub fn parsed_last_update(&self) -> Option<DateTime<Utc>> {
    parse_feed_timestamp(&self.last_update_time)
  }

  pub fn is_active(&self) -> bool { self.status.is_active() }
}

// ─── Timestamps ──────────────────────────────────────────────────────────────

/// Parse a feed timestamp: RFC 3339 first, then the offset-less
/// `YYYY-MM-DDTHH:MM:SS[.fff]` form some feed surfaces emit, taken as UTC.
pub fn parse_feed_timestamp(raw: &str) -> Option<DateTime<Utc>> {
  let raw = raw.trim();
  if raw.is_empty() {
    return None;
  }
  if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
    return Some(parsed.with_timezone(&Utc));
  }
  NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
    .ok()
    .map(|naive| naive.and_utc())
}
