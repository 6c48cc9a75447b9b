//! Census Server - Main entry point

use anyhow::Result;
use census_common::logging::{init_logging, LogConfig};
use tracing::info;

use census_server::{api, config::Config, db};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let log_config = LogConfig::builder()
        .log_file_prefix("census-server")
        .filter_directives("census_server=debug,tower_http=debug,sqlx=warn")
        .build()
        .merge_env()?;

    let _guard = init_logging(&log_config)?;

    info!("Starting Census Server");

    let config = Config::load()?;
    info!(
        source = %config.ingest.source_path.display(),
        malformed_record_policy = %config.ingest.malformed_record_policy,
        unparseable_age_policy = %config.aggregation.unparseable_age_policy,
        "Configuration loaded - server will bind to {}:{}",
        config.server.host,
        config.server.port
    );

    let pool = db::create_pool(&config.database).await?;
    info!("Database connection pool established");

    api::serve(config, pool).await
}
