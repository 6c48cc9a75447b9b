pub mod ingest;

pub use ingest::{IngestPeopleCommand, IngestPeopleResponse};
