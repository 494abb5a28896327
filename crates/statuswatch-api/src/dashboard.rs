//! Handler for the aggregated dashboard endpoint.

use axum::{
  Json,
  extract::{Query, State},
  http::StatusCode,
  response::{IntoResponse, Response},
};
use chrono::Utc;
use serde::Deserialize;
use statuswatch_core::{
  dashboard::{build_dashboard, effective_top_n},
  store::SnapshotStore,
};

use crate::{AppState, error::ApiError};

#[derive(Debug, Deserialize)]
pub struct DashboardParams {
  /// Raw `topN` value. Kept as a string so unusable input falls back to
  /// the default instead of rejecting the request.
  #[serde(rename = "topN")]
  pub top_n: Option<String>,
}

/// `GET /dashboard?topN=10` (also mounted for `POST`)
pub async fn report<S>(
  State(state): State<AppState<S>>,
  Query(params): Query<DashboardParams>,
) -> Result<Response, ApiError>
where
  S: SnapshotStore + Clone + Send + Sync + 'static,
{
  let snapshot = state
    .store
    .get(&state.cache_key)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;

  let Some(snapshot) = snapshot else {
    return Ok(StatusCode::NO_CONTENT.into_response());
  };

  let top_n = effective_top_n(params.top_n.as_deref());
  Ok(Json(build_dashboard(&snapshot, top_n, Utc::now())).into_response())
}
