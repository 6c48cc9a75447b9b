//! People ingestion
//!
//! # Architecture
//!
//! - **config**: source path and malformed record policy (`CSV_FILE_PATH`,
//!   `MALFORMED_RECORD_POLICY`)
//! - **projection**: rebuilt record to `users` row
//! - **sink**: storage trait the pipeline and the age queries write and read through
//! - **pipeline**: line-by-line run over a source
//!
//! The HTTP trigger lives in `features::people`; the one-shot binary is
//! `census-ingest`.

pub mod config;
pub mod pipeline;
pub mod projection;
pub mod sink;

pub use config::{IngestConfig, MalformedRecordPolicy};
pub use pipeline::{IngestError, IngestPipeline, IngestReport};
pub use projection::{PersistedUser, RecordError};
pub use sink::{SinkError, UserSink};
