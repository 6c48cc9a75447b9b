//! Error types for Census

use thiserror::Error;

/// Result type alias for Census operations
pub type Result<T> = std::result::Result<T, CensusError>;

/// Main error type for Census domain logic
#[derive(Error, Debug)]
pub enum CensusError {
    #[error("Invalid age value '{value}': {source}")]
    AgeParse {
        value: String,
        #[source]
        source: std::num::ParseIntError,
    },

    #[error("No ages available to aggregate")]
    EmptyInput,
}
