//! The incremental synchronization engine.
//!
//! One poll cycle reads the previous snapshot, derives the query window
//! from its watermark, fetches a batch, merges, and writes only when the
//! merge changed something. All the interesting logic lives in
//! [`merge_events`], which is a pure function of its inputs; the cycle
//! driver just wires it between a [`SnapshotStore`] and an [`EventSource`].

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use crate::{
  error::{PollError, Result},
  event::{HealthEvent, parse_feed_timestamp},
  snapshot::CacheSnapshot,
  source::EventSource,
  store::SnapshotStore,
};

/// Query window used when no usable watermark exists. Bounds the catch-up
/// on first run and after a corrupted watermark.
pub const CATCH_UP_WINDOW_DAYS: i64 = 7;

// ─── Query Window ────────────────────────────────────────────────────────────

/// Lower bound for the next feed query: the previous snapshot's watermark,
/// or `now` minus [`CATCH_UP_WINDOW_DAYS`] when there is no previous
/// snapshot or its watermark does not parse.
pub fn poll_window_start(
  previous: Option<&CacheSnapshot>,
  now: DateTime<Utc>,
) -> DateTime<Utc> {
  previous
    .and_then(|snapshot| parse_feed_timestamp(&snapshot.last_event_time))
    .unwrap_or_else(|| now - Duration::days(CATCH_UP_WINDOW_DAYS))
}

// ─── Merge ───────────────────────────────────────────────────────────────────

/// Result of merging a fetched batch into the previous snapshot.
#[derive(Debug)]
pub enum MergeOutcome {
  /// Nothing new and nothing fresher; the previous snapshot stands and no
  /// write should happen.
  Unchanged,
  /// The merge changed the event set; `snapshot` is ready to persist.
  Updated {
    snapshot:       CacheSnapshot,
    new_events:     usize,
    updated_events: usize,
  },
}

/// Merge `batch` into `previous`, deduplicating by identity key with the
/// most recently updated version winning.
///
/// A batch event counts as a change when its identity key is unknown (or
/// it has no key), or when its timestamp is strictly later than the cached
/// copy's. Everything else is dropped in favour of the cached copy, so
/// refetching identical events never causes a write.
pub fn merge_events(
  previous: Option<CacheSnapshot>,
  batch: Vec<HealthEvent>,
  subscription_id: &str,
  now: DateTime<Utc>,
) -> MergeOutcome {
  let previous_events = previous.map(|s| s.events).unwrap_or_default();

  // Identity key of each cached event, with its parsed timestamp.
  let cached_times: HashMap<String, Option<DateTime<Utc>>> = previous_events
    .iter()
    .filter_map(|event| {
      event
        .identity_key()
        .map(|key| (key.to_owned(), event.parsed_last_update()))
    })
    .collect();

  let mut incoming = Vec::new();
  let mut new_events = 0usize;
  let mut updated_events = 0usize;

  for event in batch {
    match event.identity_key().and_then(|key| cached_times.get(key)) {
      // Unknown key, or no key at all: a new event either way.
      None => {
        new_events += 1;
        incoming.push(event);
      }
      Some(cached) => {
        if supersedes(event.parsed_last_update(), *cached) {
          updated_events += 1;
          incoming.push(event);
        }
        // Same age or older: the cache already has the freshest version.
      }
    }
  }

  if incoming.is_empty() {
    return MergeOutcome::Unchanged;
  }

  // Incoming goes first: the sort below is stable, so among events whose
  // timestamps compare equal the batch version is kept over the cached one.
  let mut merged = incoming;
  merged.extend(previous_events);
  sort_most_recent_first(&mut merged);
  dedupe_keep_first(&mut merged);

  let last_event_time = merged
    .first()
    .map(|event| event.last_update_time.clone())
    .unwrap_or_else(|| now.to_rfc3339());

  let tracking_ids = merged
    .iter()
    .filter_map(|event| event.identity_key().map(str::to_owned))
    .collect();

  MergeOutcome::Updated {
    snapshot: CacheSnapshot {
      subscription_id: subscription_id.to_owned(),
      cached_at: now,
      last_event_time,
      tracking_ids,
      events: merged,
    },
    new_events,
    updated_events,
  }
}

/// Whether a batch timestamp supersedes the cached one. An unreadable
/// batch timestamp never claims freshness; an unreadable cached timestamp
/// is superseded by any batch copy that parses.
fn supersedes(
  incoming: Option<DateTime<Utc>>,
  cached: Option<DateTime<Utc>>,
) -> bool {
  match (incoming, cached) {
    (Some(incoming), Some(cached)) => incoming > cached,
    (Some(_), None) => true,
    (None, _) => false,
  }
}

/// Stable descending sort by parsed `lastUpdateTime`. `None` compares
/// below every parsed time, so unreadable timestamps sort last.
fn sort_most_recent_first(events: &mut [HealthEvent]) {
  events.sort_by(|a, b| b.parsed_last_update().cmp(&a.parsed_last_update()));
}

/// Drop all but the first occurrence of each identity key, preserving
/// order. The input is sorted most-recent-first, so the survivor of a
/// duplicated key is its freshest version. Un-keyed events receive a
/// surrogate key per occurrence and always survive.
fn dedupe_keep_first(events: &mut Vec<HealthEvent>) {
  let mut seen = HashSet::new();
  events.retain(|event| {
    let key = event
      .identity_key()
      .map(str::to_owned)
      .unwrap_or_else(|| Uuid::new_v4().to_string());
    seen.insert(key)
  });
}

// ─── Poll Cycle ──────────────────────────────────────────────────────────────

/// Summary of one poll cycle, for operational logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollOutcome {
  /// Lower bound of the feed query window that was used.
  pub window_start:   DateTime<Utc>,
  pub fetched:        usize,
  pub new_events:     usize,
  pub updated_events: usize,
  /// Events in the snapshot after the cycle; the previous count when
  /// nothing was written.
  pub total_events:   usize,
  pub written:        bool,
}

/// One full read, fetch, merge, write pass.
///
/// The write is skipped when the merge reports no change. A failure at any
/// stage leaves the stored snapshot exactly as it was; the next scheduled
/// cycle retries from that state.
pub async fn run_poll_cycle<S, E>(
  store: &S,
  source: &E,
  subscription_id: &str,
  cache_key: &str,
  now: DateTime<Utc>,
) -> Result<PollOutcome>
where
  S: SnapshotStore,
  E: EventSource,
{
  let previous = store
    .get(cache_key)
    .await
    .map_err(|e| PollError::CacheRead(Box::new(e)))?;

  let window_start = poll_window_start(previous.as_ref(), now);
  let previous_total = previous.as_ref().map_or(0, |s| s.events.len());

  let batch = source
    .fetch(subscription_id, window_start)
    .await
    .map_err(|e| PollError::SourceQuery(Box::new(e)))?;
  let fetched = batch.len();

  match merge_events(previous, batch, subscription_id, now) {
    MergeOutcome::Unchanged => Ok(PollOutcome {
      window_start,
      fetched,
      new_events: 0,
      updated_events: 0,
      total_events: previous_total,
      written: false,
    }),
    MergeOutcome::Updated { snapshot, new_events, updated_events } => {
      let total_events = snapshot.events.len();
      store
        .put(cache_key, &snapshot)
        .await
        .map_err(|e| PollError::CacheWrite(Box::new(e)))?;
      Ok(PollOutcome {
        window_start,
        fetched,
        new_events,
        updated_events,
        total_events,
        written: true,
      })
    }
  }
}
