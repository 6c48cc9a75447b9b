//! Feature modules implementing the Census API
//!
//! Each feature is a vertical slice:
//! - `commands/` - Write operations
//! - `queries/` - Read operations
//! - `routes.rs` - HTTP route definitions
//!
//! Routes call each operation's `handle` function directly.
//!
//! # Features
//!
//! - **people**: ingestion of the people source and the age distribution report

pub mod people;

use axum::Router;
use std::sync::Arc;

use crate::config::AggregationConfig;
use crate::ingest::{IngestConfig, UserSink};

/// Shared state for all feature routes
#[derive(Clone)]
pub struct FeatureState {
    /// Storage for ingested users
    pub sink: Arc<dyn UserSink>,
    pub ingest: IngestConfig,
    pub aggregation: AggregationConfig,
}

/// Creates the router with every feature mounted at the root:
/// - `/upload` - Ingestion trigger
/// - `/age-distribution` - Age bucket report
pub fn router(state: FeatureState) -> Router<()> {
    Router::new().merge(people::people_routes().with_state(state))
}
