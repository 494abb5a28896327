//! Core types and logic for the statuswatch health-event cache.
//!
//! This crate holds the domain model, the incremental synchronization
//! engine, and the dashboard aggregation, all behind storage and feed
//! traits so it carries no HTTP or database dependencies of its own.

pub mod dashboard;
pub mod error;
pub mod event;
pub mod snapshot;
pub mod source;
pub mod store;
pub mod sync;

pub use error::{PollError, Result};
