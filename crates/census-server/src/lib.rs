//! Census Server Library
//!
//! Loads a delimited file of people into Postgres and reports the age
//! distribution of what was stored.
//!
//! # Overview
//!
//! - **Ingestion**: header-driven record rebuilding and a streaming pipeline
//!   into a [`ingest::UserSink`]
//! - **API Endpoints**: `/upload`, `/age-distribution` and `/health`
//! - **Database**: PostgreSQL through SQLx
//! - **Configuration**: environment-based, loaded once in `main`
//! - **Middleware**: CORS and request tracing
//!
//! # Example
//!
//! ```no_run
//! use census_server::{api, config::Config, db};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load()?;
//!     let pool = db::create_pool(&config.database).await?;
//!     api::serve(config, pool).await?;
//!     Ok(())
//! }
//! ```

#![deny(clippy::unwrap_used, clippy::expect_used)]

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod features;
pub mod ingest;
pub mod middleware;

pub use error::{ApiResult, AppError};
