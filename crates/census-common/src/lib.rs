//! Census Common Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Shared domain logic for the Census workspace.
//!
//! # Overview
//!
//! - **Records**: rebuilding nested records from dot-path column headers
//! - **Distribution**: bucketing ages into a percentage distribution
//! - **Error Handling**: common error and result types
//! - **Logging**: tracing subscriber setup shared by every binary
//!
//! # Example
//!
//! ```
//! use census_common::record::{build, HeaderSchema};
//!
//! let schema = HeaderSchema::parse("name.firstName,name.lastName,age");
//! let record = build(&schema, &["Ada", "Lovelace", "36"]);
//!
//! assert_eq!(record.leaf("age"), Some("36"));
//! ```

pub mod distribution;
pub mod error;
pub mod logging;
pub mod record;

// Re-export commonly used types
pub use error::{CensusError, Result};
