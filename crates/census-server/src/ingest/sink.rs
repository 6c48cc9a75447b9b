//! Persistence sink interface
//!
//! The pipeline and the age distribution query only need two capabilities
//! from storage: a parameterized insert of one user and a read of the raw age
//! column. [`crate::db::users::PgUserSink`] provides them on Postgres.

use async_trait::async_trait;
use thiserror::Error;

use super::projection::PersistedUser;

/// Errors raised by a [`UserSink`]
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Sink unavailable: {0}")]
    Unavailable(String),
}

/// Storage for ingested users
///
/// Each call is a single statement; the sink guarantees atomicity per call
/// only.
#[async_trait]
pub trait UserSink: Send + Sync {
    /// Insert one projected user
    async fn insert_user(&self, user: &PersistedUser) -> Result<(), SinkError>;

    /// Every stored age, unparsed. Missing ages come back as empty strings.
    async fn select_all_ages(&self) -> Result<Vec<String>, SinkError>;
}
