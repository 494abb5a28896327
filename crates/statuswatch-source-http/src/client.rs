//! Async HTTP client for the resource-graph query endpoint.

use std::time::Duration;

use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::Client;

use statuswatch_core::{event::HealthEvent, source::EventSource};

use crate::{
  error::{Error, Result},
  wire::QueryResponse,
};

/// Default query endpoint base.
pub const DEFAULT_ENDPOINT: &str = "https://management.azure.com";

const QUERY_PATH: &str = "/providers/Microsoft.ResourceGraph/resources";
const API_VERSION: &str = "2021-03-01";

/// Connection settings for the feed.
#[derive(Debug, Clone)]
pub struct SourceConfig {
  pub endpoint: String,
  /// Bearer token for the query endpoint; omitted when empty.
  pub token:    Option<String>,
}

impl Default for SourceConfig {
  fn default() -> Self {
    Self { endpoint: DEFAULT_ENDPOINT.to_owned(), token: None }
  }
}

/// Event source speaking to the resource-graph query API.
///
/// Cheap to clone — the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct HttpEventSource {
  client: Client,
  config: SourceConfig,
}

impl HttpEventSource {
  pub fn new(config: SourceConfig) -> Result<Self> {
    let client = Client::builder()
      .timeout(Duration::from_secs(30))
      .build()
      .map_err(Error::Client)?;
    Ok(Self { client, config })
  }

  fn url(&self) -> String {
    format!(
      "{}{QUERY_PATH}?api-version={API_VERSION}",
      self.config.endpoint.trim_end_matches('/'),
    )
  }
}

/// Build the feed query for one poll window.
///
/// The filter is a union on purpose: an event that last changed before
/// `window_start` but is still active must keep appearing in every batch,
/// or a long-running incident would vanish from the cache's view of "new
/// data" and never refresh.
pub fn build_query(window_start: DateTime<Utc>) -> String {
  format!(
    "servicehealthresources \
     | where type == 'microsoft.resourcehealth/events' \
     | where properties.Status == 'Active' or properties.LastUpdateTime >= datetime({})",
    window_start.to_rfc3339_opts(SecondsFormat::Secs, true)
  )
}

impl EventSource for HttpEventSource {
  type Error = Error;

  async fn fetch(
    &self,
    subscription_id: &str,
    window_start: DateTime<Utc>,
  ) -> Result<Vec<HealthEvent>> {
    let body = serde_json::json!({
      "subscriptions": [subscription_id],
      "query": build_query(window_start),
    });

    let mut request = self.client.post(self.url()).json(&body);
    if let Some(token) = self.config.token.as_deref().filter(|t| !t.is_empty()) {
      request = request.bearer_auth(token);
    }

    let response = request.send().await.map_err(Error::Request)?;
    if !response.status().is_success() {
      let status = response.status();
      let body = response.text().await.unwrap_or_default();
      return Err(Error::Status { status, body });
    }

    let decoded: QueryResponse = response.json().await.map_err(Error::Decode)?;
    tracing::debug!(rows = decoded.data.len(), "feed query returned");
    Ok(decoded.data.into_iter().map(Into::into).collect())
  }
}
