//! Test helpers for Census server integration tests
//!
//! - [`MemorySink`]: in-memory [`UserSink`] with optional write failures
//! - Source file fixtures backed by `tempfile`
//! - Router builders for oneshot HTTP tests

#![allow(dead_code, clippy::unwrap_used, clippy::expect_used)]

use async_trait::async_trait;
use axum::{body::Body, http::Request, Router};
use census_common::distribution::UnparseableAgePolicy;
use census_server::{
    config::AggregationConfig,
    features::{self, FeatureState},
    ingest::{IngestConfig, MalformedRecordPolicy, PersistedUser, SinkError, UserSink},
};
use std::io::Write;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tempfile::NamedTempFile;
use tower::ServiceExt;

/// Header used by most fixtures
pub const PEOPLE_HEADER: &str = "name.firstName,name.lastName,age,address.city,gender";

// ============================================================================
// In-memory sink
// ============================================================================

#[derive(Default)]
pub struct MemorySink {
    users: Mutex<Vec<PersistedUser>>,
    ages: Mutex<Option<Vec<String>>>,
    fail_after: Option<usize>,
    fail_reads: bool,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accepts `n` inserts, then fails every further one
    pub fn failing_after(n: usize) -> Self {
        Self {
            fail_after: Some(n),
            ..Self::default()
        }
    }

    /// `select_all_ages` always fails
    pub fn failing_reads() -> Self {
        Self {
            fail_reads: true,
            ..Self::default()
        }
    }

    /// Serves `ages` from `select_all_ages` instead of the stored users
    pub fn with_ages<I, S>(ages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            ages: Mutex::new(Some(ages.into_iter().map(Into::into).collect())),
            ..Self::default()
        }
    }

    pub fn users(&self) -> Vec<PersistedUser> {
        self.users.lock().unwrap().clone()
    }

    pub fn len(&self) -> usize {
        self.users.lock().unwrap().len()
    }
}

#[async_trait]
impl UserSink for MemorySink {
    async fn insert_user(&self, user: &PersistedUser) -> Result<(), SinkError> {
        let mut users = self.users.lock().unwrap();
        if self.fail_after.is_some_and(|n| users.len() >= n) {
            return Err(SinkError::Unavailable("connection reset".to_string()));
        }
        users.push(user.clone());
        Ok(())
    }

    async fn select_all_ages(&self) -> Result<Vec<String>, SinkError> {
        if self.fail_reads {
            return Err(SinkError::Unavailable("connection reset".to_string()));
        }
        if let Some(ages) = self.ages.lock().unwrap().clone() {
            return Ok(ages);
        }
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .map(|user| user.age.clone().unwrap_or_default())
            .collect())
    }
}

// ============================================================================
// Source fixtures
// ============================================================================

/// Writes `contents` to a temporary source file
pub fn source_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("create temp source");
    file.write_all(contents.as_bytes()).expect("write temp source");
    file.flush().expect("flush temp source");
    file
}

pub fn ingest_config(path: &Path, policy: MalformedRecordPolicy) -> IngestConfig {
    IngestConfig {
        source_path: path.to_path_buf(),
        malformed_record_policy: policy,
    }
}

// ============================================================================
// HTTP helpers
// ============================================================================

pub fn feature_app(
    sink: Arc<dyn UserSink>,
    ingest: IngestConfig,
    policy: UnparseableAgePolicy,
) -> Router {
    features::router(FeatureState {
        sink,
        ingest,
        aggregation: AggregationConfig {
            unparseable_age_policy: policy,
        },
    })
}

pub async fn send(app: &Router, method: &str, uri: &str) -> (axum::http::StatusCode, serde_json::Value) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method(method)
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null);

    (status, json)
}
