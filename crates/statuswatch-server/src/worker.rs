//! Background poll worker.
//!
//! Owns the timer loop: one cycle immediately on startup, then one per
//! interval tick until shutdown. A failed cycle is logged and the loop
//! keeps going; the next tick retries from whatever state is stored.

use std::sync::Arc;

use chrono::Utc;
use statuswatch_core::{
  PollError,
  sync::{PollOutcome, run_poll_cycle},
};
use statuswatch_source_http::HttpEventSource;
use statuswatch_store_sqlite::SqliteStore;
use tokio::time::{Duration, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

pub struct PollWorker {
  store:           Arc<SqliteStore>,
  source:          HttpEventSource,
  subscription_id: String,
  cache_key:       String,
  interval:        Duration,
  shutdown:        CancellationToken,
}

impl PollWorker {
  pub fn new(
    store: Arc<SqliteStore>,
    source: HttpEventSource,
    subscription_id: String,
    cache_key: String,
    interval: Duration,
    shutdown: CancellationToken,
  ) -> Self {
    Self { store, source, subscription_id, cache_key, interval, shutdown }
  }

  /// Run until cancelled. The first tick fires immediately, so a fresh
  /// deployment serves data without waiting out a full interval. A cycle
  /// already in flight finishes before the loop exits; writes are never
  /// torn by shutdown.
  pub async fn run(self) {
    tracing::info!(
      subscription = %self.subscription_id,
      interval_secs = self.interval.as_secs(),
      "poll worker started"
    );

    let mut ticker = tokio::time::interval(self.interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
      tokio::select! {
        _ = self.shutdown.cancelled() => {
          tracing::info!("poll worker shutting down");
          break;
        }
        _ = ticker.tick() => {
          match self.poll_once().await {
            Ok(outcome) => log_outcome(&outcome),
            Err(e) => tracing::error!(error = %e, "poll cycle failed"),
          }
        }
      }
    }
  }

  /// One cycle against the live clock.
  pub async fn poll_once(&self) -> Result<PollOutcome, PollError> {
    run_poll_cycle(
      self.store.as_ref(),
      &self.source,
      &self.subscription_id,
      &self.cache_key,
      Utc::now(),
    )
    .await
  }
}

fn log_outcome(outcome: &PollOutcome) {
  if outcome.written {
    tracing::info!(
      fetched = outcome.fetched,
      new = outcome.new_events,
      updated = outcome.updated_events,
      total = outcome.total_events,
      "cache updated"
    );
  } else {
    tracing::info!(
      fetched = outcome.fetched,
      total = outcome.total_events,
      "cache already current"
    );
  }
}
