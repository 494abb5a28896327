//! Handler for the raw cache endpoint.

use axum::{
  Json,
  extract::State,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use statuswatch_core::store::SnapshotStore;

use crate::{AppState, error::ApiError};

/// `GET /cache` (also mounted for `POST`)
///
/// Returns the stored snapshot verbatim, or an empty 204 when no poll has
/// written yet. Read failures surface as a 500 with an error envelope;
/// they are never passed off as an empty cache.
pub async fn fetch<S>(State(state): State<AppState<S>>) -> Result<Response, ApiError>
where
  S: SnapshotStore + Clone + Send + Sync + 'static,
{
  let snapshot = state
    .store
    .get(&state.cache_key)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;

  Ok(match snapshot {
    Some(snapshot) => Json(snapshot).into_response(),
    None => StatusCode::NO_CONTENT.into_response(),
  })
}
