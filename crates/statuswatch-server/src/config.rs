//! Runtime configuration for the statuswatch server.

use std::{path::PathBuf, time::Duration};

use serde::Deserialize;
use thiserror::Error;

/// Runtime server configuration, deserialised from `config.toml` with
/// `STATUSWATCH_*` environment overrides.
///
/// Exactly one running server may poll into a given store file; the cache
/// write path assumes a single writer.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
  /// Interface the HTTP listener binds.
  #[serde(default = "default_host")]
  pub host:                  String,
  #[serde(default = "default_port")]
  pub port:                  u16,

  /// Subscription whose health events are polled. Required.
  #[serde(default)]
  pub subscription_id:       String,
  /// SQLite database file backing the cache. Required.
  #[serde(default)]
  pub store_path:            PathBuf,
  /// Row key the snapshot is stored under.
  #[serde(default = "default_cache_key")]
  pub cache_key:             String,

  /// Minutes between poll cycles.
  #[serde(default = "default_poll_interval")]
  pub poll_interval_minutes: u64,
  /// Base URL of the feed query endpoint.
  #[serde(default = "default_source_endpoint")]
  pub source_endpoint:       String,
  /// Bearer token for the feed, when the endpoint needs one.
  #[serde(default)]
  pub source_token:          Option<String>,
}

/// Rejected configuration, reported before anything starts.
#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("subscription_id must be set")]
  MissingSubscription,

  #[error("store_path must be set")]
  MissingStorePath,

  #[error("poll_interval_minutes must be at least 1")]
  ZeroPollInterval,
}

impl ServerConfig {
  /// Check the fields that have no usable default.
  pub fn validate(&self) -> Result<(), ConfigError> {
    if self.subscription_id.trim().is_empty() {
      return Err(ConfigError::MissingSubscription);
    }
    if self.store_path.as_os_str().is_empty() {
      return Err(ConfigError::MissingStorePath);
    }
    if self.poll_interval_minutes == 0 {
      return Err(ConfigError::ZeroPollInterval);
    }
    Ok(())
  }

  /// Poll cadence as a [`Duration`]; saturates on absurdly large values.
  pub fn poll_interval(&self) -> Duration {
    Duration::from_secs(self.poll_interval_minutes.saturating_mul(60))
  }
}

fn default_host() -> String {
  "127.0.0.1".to_owned()
}

fn default_port() -> u16 {
  8080
}

fn default_cache_key() -> String {
  "health-events".to_owned()
}

fn default_poll_interval() -> u64 {
  15
}

fn default_source_endpoint() -> String {
  statuswatch_source_http::DEFAULT_ENDPOINT.to_owned()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn minimal_config_fills_defaults() {
    let config: ServerConfig = serde_json::from_str(
      r#"{ "subscription_id": "sub-1", "store_path": "/var/lib/statuswatch/cache.db" }"#,
    )
    .unwrap();

    config.validate().unwrap();
    assert_eq!(config.host, "127.0.0.1");
    assert_eq!(config.port, 8080);
    assert_eq!(config.cache_key, "health-events");
    assert_eq!(config.poll_interval_minutes, 15);
    assert_eq!(config.poll_interval(), Duration::from_secs(15 * 60));
    assert_eq!(config.source_endpoint, "https://management.azure.com");
    assert!(config.source_token.is_none());
  }

  #[test]
  fn missing_required_fields_fail_validation() {
    let config: ServerConfig = serde_json::from_str("{}").unwrap();
    assert!(matches!(config.validate(), Err(ConfigError::MissingSubscription)));

    let config: ServerConfig =
      serde_json::from_str(r#"{ "subscription_id": "sub-1" }"#).unwrap();
    assert!(matches!(config.validate(), Err(ConfigError::MissingStorePath)));
  }

  #[test]
  fn zero_interval_is_rejected() {
    let config: ServerConfig = serde_json::from_str(
      r#"{
        "subscription_id": "sub-1",
        "store_path": "cache.db",
        "poll_interval_minutes": 0
      }"#,
    )
    .unwrap();
    assert!(matches!(config.validate(), Err(ConfigError::ZeroPollInterval)));
  }

  #[test]
  fn oversized_interval_saturates() {
    let config: ServerConfig = serde_json::from_str(
      r#"{
        "subscription_id": "sub-1",
        "store_path": "cache.db",
        "poll_interval_minutes": 18446744073709551615
      }"#,
    )
    .unwrap();
    assert_eq!(config.poll_interval(), Duration::from_secs(u64::MAX));
  }
}
