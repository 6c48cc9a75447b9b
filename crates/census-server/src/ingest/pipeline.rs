//! Streaming ingestion of a delimited source into a [`UserSink`]
//!
//! The first non-empty line is the header. Empty lines are ignored; a line
//! holding only whitespace is data like any other. Every following line is rebuilt
//! into a record, projected onto a [`PersistedUser`] and written through the
//! sink, one row at a time and in file order. There is no transaction: a
//! failure leaves the rows already written in place, and every error reports
//! how many that was.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs::File;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tracing::{debug, info, info_span, warn, Instrument};
use uuid::Uuid;

use census_common::record::{build, split_fields, HeaderSchema};

use super::config::{IngestConfig, MalformedRecordPolicy};
use super::projection::{PersistedUser, RecordError};
use super::sink::{SinkError, UserSink};

const BYTE_ORDER_MARK: char = '\u{feff}';

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("Source file not found: {}", path.display())]
    SourceNotFound { path: PathBuf },

    #[error("Failed to read source after {rows_written} rows: {source}")]
    SourceRead {
        rows_written: u64,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed record on line {line} after {rows_written} rows: {source}")]
    MalformedRecord {
        line: u64,
        rows_written: u64,
        #[source]
        source: RecordError,
    },

    #[error("Failed to write line {line} after {rows_written} rows: {source}")]
    SinkWrite {
        line: u64,
        rows_written: u64,
        #[source]
        source: SinkError,
    },
}

impl IngestError {
    /// Rows committed before the run stopped
    pub fn rows_written(&self) -> u64 {
        match self {
            IngestError::SourceNotFound { .. } => 0,
            IngestError::SourceRead { rows_written, .. }
            | IngestError::MalformedRecord { rows_written, .. }
            | IngestError::SinkWrite { rows_written, .. } => *rows_written,
        }
    }

    /// Process exit status for the one-shot binary
    pub fn exit_code(&self) -> u8 {
        match self {
            IngestError::SourceNotFound { .. } => 2,
            IngestError::MalformedRecord { .. } => 3,
            IngestError::SinkWrite { .. } => 4,
            IngestError::SourceRead { .. } => 1,
        }
    }
}

// ============================================================================
// Report
// ============================================================================

/// Outcome of a successful run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngestReport {
    pub run_id: Uuid,
    pub source: String,
    pub rows_written: u64,
    /// Lines dropped under [`MalformedRecordPolicy::Skip`]
    pub rows_skipped: u64,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl IngestReport {
    pub fn duration_ms(&self) -> i64 {
        (self.finished_at - self.started_at).num_milliseconds()
    }
}

// ============================================================================
// Pipeline
// ============================================================================

/// Ingestion pipeline over a configured source
#[derive(Debug, Clone)]
pub struct IngestPipeline {
    source_path: PathBuf,
    policy: MalformedRecordPolicy,
}

impl IngestPipeline {
    pub fn new(config: &IngestConfig) -> Self {
        Self {
            source_path: config.source_path.clone(),
            policy: config.malformed_record_policy,
        }
    }

    pub fn source_path(&self) -> &Path {
        &self.source_path
    }

    pub fn policy(&self) -> MalformedRecordPolicy {
        self.policy
    }

    /// Ingest the configured source
    pub async fn run(&self, sink: &dyn UserSink) -> Result<IngestReport, IngestError> {
        self.ingest_file(&self.source_path, sink).await
    }

    /// Open `path` and ingest it
    pub async fn ingest_file(
        &self,
        path: &Path,
        sink: &dyn UserSink,
    ) -> Result<IngestReport, IngestError> {
        let file = match File::open(path).await {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(IngestError::SourceNotFound {
                    path: path.to_path_buf(),
                });
            },
            Err(source) => {
                return Err(IngestError::SourceRead {
                    rows_written: 0,
                    source,
                });
            },
        };

        self.ingest(&path.display().to_string(), BufReader::new(file), sink)
            .await
    }

    /// Ingest an already opened source; `source` only labels the report and
    /// the log span.
    pub async fn ingest<R>(
        &self,
        source: &str,
        reader: R,
        sink: &dyn UserSink,
    ) -> Result<IngestReport, IngestError>
    where
        R: AsyncBufRead + Unpin,
    {
        let run_id = Uuid::new_v4();
        let span = info_span!("ingest_run", run_id = %run_id, source = %source, policy = %self.policy);

        self.ingest_lines(run_id, source, reader, sink)
            .instrument(span)
            .await
    }

    async fn ingest_lines<R>(
        &self,
        run_id: Uuid,
        source: &str,
        mut reader: R,
        sink: &dyn UserSink,
    ) -> Result<IngestReport, IngestError>
    where
        R: AsyncBufRead + Unpin,
    {
        let started_at = Utc::now();
        let mut line_number: u64 = 0;
        let mut rows_written: u64 = 0;
        let mut rows_skipped: u64 = 0;

        info!("Starting ingestion");

        let schema = loop {
            let Some(line) = next_line(&mut reader, rows_written).await? else {
                info!("Source has no header line, nothing to ingest");
                return Ok(IngestReport {
                    run_id,
                    source: source.to_string(),
                    rows_written,
                    rows_skipped,
                    started_at,
                    finished_at: Utc::now(),
                });
            };
            line_number += 1;

            let header = line.strip_prefix(BYTE_ORDER_MARK).unwrap_or(line.as_str());
            if !header.is_empty() {
                break HeaderSchema::parse(header);
            }
        };

        debug!(columns = schema.len(), "Parsed header");

        while let Some(line) = next_line(&mut reader, rows_written).await? {
            line_number += 1;
            if line.is_empty() {
                continue;
            }

            let user = match project_line(&schema, &line) {
                Ok(user) => user,
                Err(source) => match self.policy {
                    MalformedRecordPolicy::Abort => {
                        return Err(IngestError::MalformedRecord {
                            line: line_number,
                            rows_written,
                            source,
                        });
                    },
                    MalformedRecordPolicy::Skip => {
                        warn!(line = line_number, error = %source, "Skipping malformed record");
                        rows_skipped += 1;
                        continue;
                    },
                },
            };

            sink.insert_user(&user)
                .await
                .map_err(|source| IngestError::SinkWrite {
                    line: line_number,
                    rows_written,
                    source,
                })?;
            rows_written += 1;

            debug!(line = line_number, name = %user.name, "Row written");
        }

        let report = IngestReport {
            run_id,
            source: source.to_string(),
            rows_written,
            rows_skipped,
            started_at,
            finished_at: Utc::now(),
        };

        info!(
            rows_written = report.rows_written,
            rows_skipped = report.rows_skipped,
            duration_ms = report.duration_ms(),
            "Ingestion finished"
        );

        Ok(report)
    }
}

/// Next line without its terminator. `\n` and `\r\n` both end a line, as
/// does a lone `\r` before end of input; any other `\r` is data.
async fn next_line<R>(reader: &mut R, rows_written: u64) -> Result<Option<String>, IngestError>
where
    R: AsyncBufRead + Unpin,
{
    let mut line = String::new();
    let read = reader
        .read_line(&mut line)
        .await
        .map_err(|source| IngestError::SourceRead {
            rows_written,
            source,
        })?;

    if read == 0 {
        return Ok(None);
    }

    if line.ends_with('\n') {
        line.pop();
    }
    if line.ends_with('\r') {
        line.pop();
    }
    Ok(Some(line))
}

/// Split, rebuild and project one data line
fn project_line(schema: &HeaderSchema, line: &str) -> Result<PersistedUser, RecordError> {
    let values: Vec<&str> = split_fields(line).collect();
    if values.len() != schema.len() {
        return Err(RecordError::FieldCount {
            expected: schema.len(),
            found: values.len(),
        });
    }

    PersistedUser::from_record(&build(schema, &values))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_project_line() {
        let schema = HeaderSchema::parse("name.firstName,name.lastName,age,address.city");
        let user = project_line(&schema, "Ada,Lovelace,36,London").unwrap();

        assert_eq!(user.name, "Ada Lovelace");
        assert_eq!(user.age.as_deref(), Some("36"));
        assert_eq!(user.address, Some(json!({"city": "London"})));
    }

    #[test]
    fn test_project_line_arity_mismatch() {
        let schema = HeaderSchema::parse("name.firstName,name.lastName,age");

        assert_eq!(
            project_line(&schema, "Ada,Lovelace"),
            Err(RecordError::FieldCount {
                expected: 3,
                found: 2
            })
        );
        assert_eq!(
            project_line(&schema, "Ada,Lovelace,36,London"),
            Err(RecordError::FieldCount {
                expected: 3,
                found: 4
            })
        );
    }

    #[tokio::test]
    async fn test_next_line_strips_only_the_terminator() {
        let mut reader = BufReader::new(&b"a,b\r\nc,d\r\r\ne\rf\n\ng,h\r"[..]);

        assert_eq!(next_line(&mut reader, 0).await.unwrap().as_deref(), Some("a,b"));
        assert_eq!(next_line(&mut reader, 0).await.unwrap().as_deref(), Some("c,d\r"));
        assert_eq!(next_line(&mut reader, 0).await.unwrap().as_deref(), Some("e\rf"));
        assert_eq!(next_line(&mut reader, 0).await.unwrap().as_deref(), Some(""));
        assert_eq!(next_line(&mut reader, 0).await.unwrap().as_deref(), Some("g,h"));
        assert_eq!(next_line(&mut reader, 0).await.unwrap(), None);
    }

    #[test]
    fn test_rows_written_on_every_variant() {
        let not_found = IngestError::SourceNotFound {
            path: PathBuf::from("missing.csv"),
        };
        assert_eq!(not_found.rows_written(), 0);

        let malformed = IngestError::MalformedRecord {
            line: 4,
            rows_written: 2,
            source: RecordError::MissingName,
        };
        assert_eq!(malformed.rows_written(), 2);
        assert!(malformed.to_string().contains("line 4"));

        let sink = IngestError::SinkWrite {
            line: 7,
            rows_written: 5,
            source: SinkError::Unavailable("closed".to_string()),
        };
        assert_eq!(sink.rows_written(), 5);

        assert_eq!(not_found.exit_code(), 2);
        assert_eq!(malformed.exit_code(), 3);
        assert_eq!(sink.exit_code(), 4);
    }
}
