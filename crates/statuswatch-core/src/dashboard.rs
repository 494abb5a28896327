//! Dashboard aggregation, a pure read model over one snapshot.
//!
//! Nothing here touches storage or the wall clock. `now` is an input, so
//! the freshness boundary and trend buckets are deterministic under test,
//! and every event's timestamp is parsed exactly once per report.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::snapshot::CacheSnapshot;

// ─── Tuning Constants ────────────────────────────────────────────────────────

/// Entry count for the top-affected tables when the caller does not ask
/// for one.
pub const DEFAULT_TOP_N: usize = 5;
/// Upper end of the accepted `topN` range.
pub const MAX_TOP_N: usize = 100;
/// Cache age at which the report flips to `Stale`: one poll period plus
/// slack for a single missed cycle.
pub const STALE_AFTER_MINUTES: i64 = 20;
/// Projection cadence for `nextUpdate`, matching the default poll
/// interval.
pub const UPDATE_PERIOD_MINUTES: i64 = 15;

/// Resolve a raw `topN` request value. Non-numeric and out-of-range input
/// silently falls back to [`DEFAULT_TOP_N`].
pub fn effective_top_n(raw: Option<&str>) -> usize {
  raw
    .and_then(|value| value.trim().parse::<usize>().ok())
    .filter(|n| (1..=MAX_TOP_N).contains(n))
    .unwrap_or(DEFAULT_TOP_N)
}

// ─── Report Model ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DataHealth {
  Healthy,
  Stale,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemStatus {
  pub data_health:       DataHealth,
  pub last_updated:      DateTime<Utc>,
  pub cache_age_minutes: i64,
  /// Informational projection, not a schedule guarantee.
  pub next_update:       DateTime<Utc>,
  pub active_issues:     u64,
  pub total_events:      u64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventStatistics {
  pub by_type:   BTreeMap<String, u64>,
  pub by_status: BTreeMap<String, u64>,
  pub by_level:  BTreeMap<String, u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AffectedEntry {
  pub name:  String,
  pub count: u64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopAffected {
  pub services: Vec<AffectedEntry>,
  pub regions:  Vec<AffectedEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendCounts {
  pub last_24_hours: u64,
  pub last_7_days:   u64,
  pub last_30_days:  u64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardReport {
  pub system_status: SystemStatus,
  pub statistics:    EventStatistics,
  pub top_affected:  TopAffected,
  pub trends:        TrendCounts,
}

// ─── Aggregation ─────────────────────────────────────────────────────────────

/// Occurrence counter that remembers first-encounter order, so top-N ties
/// resolve the same way on every run.
#[derive(Default)]
struct OrderedCounter {
  counts: HashMap<String, u64>,
  order:  Vec<String>,
}

impl OrderedCounter {
  /// Blank names are skipped; there is no "Unknown" service or region row.
  fn bump(&mut self, name: &str) {
    let name = name.trim();
    if name.is_empty() {
      return;
    }
    match self.counts.get_mut(name) {
      Some(count) => *count += 1,
      None => {
        self.counts.insert(name.to_owned(), 1);
        self.order.push(name.to_owned());
      }
    }
  }

  fn top(self, n: usize) -> Vec<AffectedEntry> {
    let OrderedCounter { counts, order } = self;
    let mut entries: Vec<AffectedEntry> = order
      .into_iter()
      .map(|name| {
        let count = counts[&name];
        AffectedEntry { name, count }
      })
      .collect();
    // Stable sort: equal counts keep first-encounter order.
    entries.sort_by(|a, b| b.count.cmp(&a.count));
    entries.truncate(n);
    entries
  }
}

/// Grouping label with a shared bucket for blank values.
fn label_or_unknown(raw: &str) -> String {
  let raw = raw.trim();
  if raw.is_empty() { "Unknown".to_owned() } else { raw.to_owned() }
}

/// Build the full dashboard report for one snapshot.
pub fn build_dashboard(
  snapshot: &CacheSnapshot,
  top_n: usize,
  now: DateTime<Utc>,
) -> DashboardReport {
  let cache_age = now - snapshot.cached_at;
  let data_health = if cache_age < Duration::minutes(STALE_AFTER_MINUTES) {
    DataHealth::Healthy
  } else {
    DataHealth::Stale
  };

  let day_ago = now - Duration::hours(24);
  let week_ago = now - Duration::days(7);
  let month_ago = now - Duration::days(30);

  let mut by_type: BTreeMap<String, u64> = BTreeMap::new();
  let mut by_status: BTreeMap<String, u64> = BTreeMap::new();
  let mut by_level: BTreeMap<String, u64> = BTreeMap::new();
  let mut services = OrderedCounter::default();
  let mut regions = OrderedCounter::default();
  let mut trends = TrendCounts { last_24_hours: 0, last_7_days: 0, last_30_days: 0 };
  let mut active_issues = 0u64;

  for event in &snapshot.events {
    *by_type.entry(label_or_unknown(event.event_type.as_str())).or_insert(0) += 1;
    *by_status.entry(label_or_unknown(event.status.as_str())).or_insert(0) += 1;
    *by_level.entry(label_or_unknown(&event.level)).or_insert(0) += 1;

    if event.is_active() {
      active_issues += 1;
    }

    for impact in &event.impacted_services {
      services.bump(&impact.service);
      for region in &impact.regions {
        regions.bump(region);
      }
    }

    // Events with unreadable timestamps drop out of the trend buckets but
    // still count everywhere else.
    if let Some(updated) = event.parsed_last_update() {
      if updated >= day_ago {
        trends.last_24_hours += 1;
      }
      if updated >= week_ago {
        trends.last_7_days += 1;
      }
      if updated >= month_ago {
        trends.last_30_days += 1;
      }
    }
  }

  DashboardReport {
    system_status: SystemStatus {
      data_health,
      last_updated: snapshot.cached_at,
      cache_age_minutes: cache_age.num_minutes(),
      next_update: snapshot.cached_at + Duration::minutes(UPDATE_PERIOD_MINUTES),
      active_issues,
      total_events: snapshot.events.len() as u64,
    },
    statistics: EventStatistics { by_type, by_status, by_level },
    top_affected: TopAffected {
      services: services.top(top_n),
      regions: regions.top(top_n),
    },
    trends,
  }
}
