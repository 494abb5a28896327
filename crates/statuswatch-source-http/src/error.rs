//! Error type for `statuswatch-source-http`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("failed to build HTTP client: {0}")]
  Client(#[source] reqwest::Error),

  #[error("feed query failed: {0}")]
  Request(#[source] reqwest::Error),

  /// Non-2xx from the feed, with whatever body it sent.
  #[error("feed returned {status}: {body}")]
  Status {
    status: reqwest::StatusCode,
    body:   String,
  },

  #[error("failed to decode feed response: {0}")]
  Decode(#[source] reqwest::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
