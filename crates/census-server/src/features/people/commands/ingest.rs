use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::ingest::{IngestConfig, IngestError, IngestPipeline, IngestReport, UserSink};

pub const INGEST_SUCCESS_MESSAGE: &str = "CSV data has been uploaded to the database!";

/// Load the configured source into the `users` table
#[derive(Debug, Clone)]
pub struct IngestPeopleCommand {
    pub config: IngestConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestPeopleResponse {
    pub message: String,
    pub run_id: Uuid,
    pub source: String,
    pub rows_written: u64,
    pub rows_skipped: u64,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub duration_ms: i64,
}

impl From<IngestReport> for IngestPeopleResponse {
    fn from(report: IngestReport) -> Self {
        Self {
            message: INGEST_SUCCESS_MESSAGE.to_string(),
            duration_ms: report.duration_ms(),
            run_id: report.run_id,
            source: report.source,
            rows_written: report.rows_written,
            rows_skipped: report.rows_skipped,
            started_at: report.started_at,
            finished_at: report.finished_at,
        }
    }
}

#[tracing::instrument(
    skip(sink, command),
    fields(source = %command.config.source_path.display())
)]
pub async fn handle(
    sink: &dyn UserSink,
    command: IngestPeopleCommand,
) -> Result<IngestPeopleResponse, IngestError> {
    let pipeline = IngestPipeline::new(&command.config);
    let report = pipeline.run(sink).await?;

    Ok(report.into())
}
