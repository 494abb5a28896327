//! HTTP adapter for the cloud health-event feed.
//!
//! Implements [`statuswatch_core::source::EventSource`] against the
//! resource-graph query endpoint: one POST per poll, carrying a query that
//! selects currently-active events plus anything updated inside the poll
//! window.

mod client;
mod wire;

pub mod error;

pub use client::{DEFAULT_ENDPOINT, HttpEventSource, SourceConfig, build_query};
pub use error::{Error, Result};
