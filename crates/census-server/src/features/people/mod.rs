//! People feature: loading the source file into `users` and reporting the
//! age distribution of what was stored.

pub mod commands;
pub mod queries;
pub mod routes;

pub use commands::{IngestPeopleCommand, IngestPeopleResponse};
pub use queries::{AgeDistributionError, AgeDistributionQuery, AgeDistributionResponse};
pub use routes::people_routes;
