//! People API routes
//!
//! # Route Structure
//!
//! - `GET|POST /upload` - Load the configured source file into `users`
//! - `GET /age-distribution` - Percentage of stored users per age bucket

use crate::api::response::{ApiResponse, ErrorResponse};
use crate::features::FeatureState;
use crate::ingest::IngestError;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::json;

use super::{
    commands::IngestPeopleCommand,
    queries::{AgeDistributionError, AgeDistributionQuery},
};

/// Generic body for any ingestion failure; the cause only goes to the log.
pub const INGEST_FAILURE_MESSAGE: &str = "Error processing CSV data.";

// ============================================================================
// Router Configuration
// ============================================================================

pub fn people_routes() -> Router<FeatureState> {
    Router::new()
        .route("/upload", get(upload).post(upload))
        .route("/age-distribution", get(age_distribution))
}

// ============================================================================
// Command Handlers (Write Operations)
// ============================================================================

/// Run one ingestion of the configured source
///
/// # Endpoint
///
/// `GET /upload` or `POST /upload`
///
/// # Response
///
/// - `200 OK` - Every line was handled; the report counts written and skipped rows
/// - `500 Internal Server Error` - The run stopped; rows written before the
///   failure stay stored
#[tracing::instrument(skip(state))]
async fn upload(State(state): State<FeatureState>) -> Result<Response, PeopleApiError> {
    let command = IngestPeopleCommand {
        config: state.ingest.clone(),
    };

    let response = super::commands::ingest::handle(state.sink.as_ref(), command).await?;

    tracing::info!(
        run_id = %response.run_id,
        rows_written = response.rows_written,
        rows_skipped = response.rows_skipped,
        "Ingestion completed via API"
    );

    Ok((StatusCode::OK, Json(ApiResponse::success(response))).into_response())
}

// ============================================================================
// Query Handlers (Read Operations)
// ============================================================================

/// Age distribution of the stored users
///
/// # Endpoint
///
/// `GET /age-distribution`
///
/// # Response
///
/// - `200 OK` - Percentages per bucket, with counts in `meta`
/// - `404 Not Found` - No parseable ages are stored
/// - `422 Unprocessable Entity` - A stored age is not an integer and the
///   policy is `reject`
/// - `500 Internal Server Error` - Database error
#[tracing::instrument(skip(state))]
async fn age_distribution(State(state): State<FeatureState>) -> Result<Response, PeopleApiError> {
    let query = AgeDistributionQuery {
        policy: state.aggregation.unparseable_age_policy,
    };

    let response = super::queries::age_distribution::handle(state.sink.as_ref(), query).await?;

    let meta = json!({
        "total": response.total,
        "excluded": response.excluded,
        "counts": response.counts,
    });

    Ok(
        (StatusCode::OK, Json(ApiResponse::success_with_meta(response.distribution, meta)))
            .into_response(),
    )
}

// ============================================================================
// Error Handling
// ============================================================================

/// Unified error type for people API endpoints
#[derive(Debug)]
enum PeopleApiError {
    Ingest(IngestError),
    AgeDistribution(AgeDistributionError),
}

impl From<IngestError> for PeopleApiError {
    fn from(err: IngestError) -> Self {
        Self::Ingest(err)
    }
}

impl From<AgeDistributionError> for PeopleApiError {
    fn from(err: AgeDistributionError) -> Self {
        Self::AgeDistribution(err)
    }
}

impl IntoResponse for PeopleApiError {
    fn into_response(self) -> Response {
        match self {
            PeopleApiError::Ingest(err) => {
                tracing::error!(
                    error = %err,
                    rows_written = err.rows_written(),
                    "Ingestion failed"
                );
                let error = ErrorResponse::new("INGESTION_FAILED", INGEST_FAILURE_MESSAGE);
                (StatusCode::INTERNAL_SERVER_ERROR, Json(error)).into_response()
            },
            PeopleApiError::AgeDistribution(AgeDistributionError::NoData { excluded }) => {
                let error = ErrorResponse::with_details(
                    "NO_DATA",
                    "No stored ages to aggregate",
                    json!({ "excluded": excluded }),
                );
                (StatusCode::NOT_FOUND, Json(error)).into_response()
            },
            PeopleApiError::AgeDistribution(err @ AgeDistributionError::InvalidAge(_)) => {
                tracing::warn!(error = %err, "Rejected stored age");
                let error = ErrorResponse::new("INVALID_STORED_AGE", err.to_string());
                (StatusCode::UNPROCESSABLE_ENTITY, Json(error)).into_response()
            },
            PeopleApiError::AgeDistribution(err @ AgeDistributionError::Sink(_)) => {
                tracing::error!(error = %err, "Failed to fetch age distribution");
                let error =
                    ErrorResponse::new("INTERNAL_ERROR", "Error fetching age distribution.");
                (StatusCode::INTERNAL_SERVER_ERROR, Json(error)).into_response()
            },
        }
    }
}
