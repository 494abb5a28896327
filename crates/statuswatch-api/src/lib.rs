//! JSON read surface for the statuswatch cache.
//!
//! Exposes an axum [`Router`] backed by any
//! [`statuswatch_core::store::SnapshotStore`]. Every endpoint is
//! read-only; writes happen exclusively in the poll worker. Auth, TLS, and
//! transport concerns are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", statuswatch_api::api_router(store.clone(), "health-events"))
//! ```

pub mod cache;
pub mod dashboard;
pub mod error;
pub mod ping;

use std::sync::Arc;

use axum::{Router, routing::get};
use statuswatch_core::store::SnapshotStore;

pub use error::ApiError;

/// Shared state for all API handlers.
#[derive(Clone)]
pub struct AppState<S> {
  pub store:     Arc<S>,
  /// The key the poll worker writes under; all reads go through it.
  pub cache_key: String,
}

/// Build a fully-materialised API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router
/// regardless of its own state type. `GET` and `POST` are interchangeable
/// on the data endpoints; some dashboard clients only speak `POST`.
pub fn api_router<S>(store: Arc<S>, cache_key: impl Into<String>) -> Router<()>
where
  S: SnapshotStore + Clone + Send + Sync + 'static,
{
  let state = AppState { store, cache_key: cache_key.into() };
  Router::new()
    .route("/cache", get(cache::fetch::<S>).post(cache::fetch::<S>))
    .route(
      "/dashboard",
      get(dashboard::report::<S>).post(dashboard::report::<S>),
    )
    .route("/ping", get(ping::handler))
    .with_state(state)
}

#[cfg(test)]
mod tests {
  use std::sync::Arc;

  use axum::{
    body::Body,
    http::{Request, StatusCode},
  };
  use chrono::{DateTime, Duration, Utc};
  use serde_json::Value;
  use statuswatch_core::{
    event::{EventStatus, EventType, HealthEvent, ServiceImpact},
    snapshot::CacheSnapshot,
    store::SnapshotStore,
  };
  use statuswatch_store_sqlite::SqliteStore;
  use tower::ServiceExt as _;

  use super::*;

  const CACHE_KEY: &str = "health-events";

  fn event(key: &str, service: &str, minutes_ago: i64) -> HealthEvent {
    let updated = Utc::now() - Duration::minutes(minutes_ago);
    HealthEvent {
      id: format!("/events/{key}"),
      tracking_id: Some(key.to_owned()),
      event_type: EventType::ServiceIssue,
      status: EventStatus::Active,
      title: format!("issue {key}"),
      level: "Warning".to_owned(),
      impacted_services: vec![ServiceImpact {
        service: service.to_owned(),
        regions: vec!["westeurope".to_owned()],
      }],
      last_update_time: updated.to_rfc3339(),
      ..Default::default()
    }
  }

  fn snapshot(cached_at: DateTime<Utc>, events: Vec<HealthEvent>) -> CacheSnapshot {
    CacheSnapshot {
      subscription_id: "sub-1".to_owned(),
      cached_at,
      last_event_time: events
        .first()
        .map(|e| e.last_update_time.clone())
        .unwrap_or_default(),
      tracking_ids: events
        .iter()
        .filter_map(|e| e.identity_key().map(str::to_owned))
        .collect(),
      events,
    }
  }

  async fn router_with(stored: Option<CacheSnapshot>) -> Router<()> {
    let store = SqliteStore::open_in_memory().await.unwrap();
    if let Some(snapshot) = &stored {
      store.put(CACHE_KEY, snapshot).await.unwrap();
    }
    api_router(Arc::new(store), CACHE_KEY)
  }

  async fn request(router: Router<()>, method: &str, uri: &str) -> (StatusCode, Value) {
    let resp = router
      .oneshot(
        Request::builder()
          .method(method)
          .uri(uri)
          .body(Body::empty())
          .unwrap(),
      )
      .await
      .unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
      Value::Null
    } else {
      serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
  }

  // ── /cache ──────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn cache_returns_stored_snapshot() {
    let stored = snapshot(Utc::now() - Duration::minutes(5), vec![
      event("E1", "Storage", 30),
      event("E2", "Compute", 60),
    ]);
    let router = router_with(Some(stored)).await;

    let (status, body) = request(router, "GET", "/cache").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["subscriptionId"], "sub-1");
    assert_eq!(body["events"].as_array().unwrap().len(), 2);
    assert_eq!(body["trackingIds"], serde_json::json!(["E1", "E2"]));
  }

  #[tokio::test]
  async fn cache_answers_post_identically() {
    let stored = snapshot(Utc::now(), vec![event("E1", "Storage", 30)]);
    let (status, body) = request(router_with(Some(stored)).await, "POST", "/cache").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["events"].as_array().unwrap().len(), 1);
  }

  #[tokio::test]
  async fn cache_empty_is_no_content() {
    let (status, body) = request(router_with(None).await, "GET", "/cache").await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(body, Value::Null);
  }

  // ── /dashboard ──────────────────────────────────────────────────────────

  #[tokio::test]
  async fn dashboard_reports_fresh_cache() {
    let stored = snapshot(Utc::now() - Duration::minutes(5), vec![
      event("E1", "Storage", 30),
      event("E2", "Compute", 60),
    ]);
    let (status, body) =
      request(router_with(Some(stored)).await, "GET", "/dashboard").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["systemStatus"]["dataHealth"], "Healthy");
    assert_eq!(body["systemStatus"]["activeIssues"], 2);
    assert_eq!(body["systemStatus"]["totalEvents"], 2);
    assert_eq!(body["statistics"]["byType"]["ServiceIssue"], 2);
    assert_eq!(body["statistics"]["byLevel"]["Warning"], 2);
    assert_eq!(body["trends"]["last24Hours"], 2);
  }

  #[tokio::test]
  async fn dashboard_answers_post_identically() {
    let stored = snapshot(Utc::now(), vec![
      event("E1", "Storage", 30),
      event("E2", "Compute", 60),
    ]);
    let (status, body) =
      request(router_with(Some(stored)).await, "POST", "/dashboard?topN=1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["systemStatus"]["totalEvents"], 2);
    assert_eq!(body["topAffected"]["services"].as_array().unwrap().len(), 1);
  }

  #[tokio::test]
  async fn dashboard_flags_stale_cache() {
    let stored = snapshot(Utc::now() - Duration::minutes(45), vec![event(
      "E1", "Storage", 30,
    )]);
    let (status, body) =
      request(router_with(Some(stored)).await, "GET", "/dashboard").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["systemStatus"]["dataHealth"], "Stale");
  }

  #[tokio::test]
  async fn dashboard_truncates_to_requested_top_n() {
    let services = ["Storage", "Compute", "Networking", "Database", "Cache", "DNS"];
    let events = services
      .iter()
      .enumerate()
      .map(|(i, service)| event(&format!("E{i}"), service, 30))
      .collect();
    let router = router_with(Some(snapshot(Utc::now(), events))).await;

    let (_, body) = request(router.clone(), "GET", "/dashboard?topN=2").await;
    assert_eq!(body["topAffected"]["services"].as_array().unwrap().len(), 2);

    // No parameter: default of five, even though six services are impacted.
    let (_, body) = request(router.clone(), "GET", "/dashboard").await;
    assert_eq!(body["topAffected"]["services"].as_array().unwrap().len(), 5);

    // Unusable values fall back silently rather than erroring.
    let (status, body) = request(router, "GET", "/dashboard?topN=plenty").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["topAffected"]["services"].as_array().unwrap().len(), 5);
  }

  #[tokio::test]
  async fn dashboard_empty_is_no_content() {
    let (status, _) = request(router_with(None).await, "GET", "/dashboard").await;
    assert_eq!(status, StatusCode::NO_CONTENT);
  }

  // ── /ping ───────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn ping_answers_without_a_store() {
    let (status, body) = request(router_with(None).await, "GET", "/ping").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
  }

  // ── failure paths ───────────────────────────────────────────────────────

  #[derive(Clone)]
  struct BrokenStore;

  impl SnapshotStore for BrokenStore {
    type Error = std::io::Error;

    async fn get(&self, _key: &str) -> Result<Option<CacheSnapshot>, Self::Error> {
      Err(std::io::Error::other("backend down"))
    }

    async fn put(&self, _key: &str, _snapshot: &CacheSnapshot) -> Result<(), Self::Error> {
      Err(std::io::Error::other("backend down"))
    }
  }

  #[tokio::test]
  async fn store_failure_maps_to_500_with_envelope() {
    let router = api_router(Arc::new(BrokenStore), CACHE_KEY);
    let (status, body) = request(router.clone(), "GET", "/cache").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].as_str().unwrap().contains("backend down"));

    let (status, _) = request(router, "GET", "/dashboard").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
  }
}
