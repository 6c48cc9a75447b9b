//! Census Ingest - one-shot load of the people source into Postgres
//!
//! Exit status: 0 success, 2 source not found, 3 malformed record,
//! 4 database write failure, 1 anything else.

use anyhow::Result;
use census_common::logging::{init_logging, LogConfig, LogLevel};
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};

use census_server::{
    config::Config,
    db::{self, PgUserSink},
    ingest::{IngestError, IngestPipeline, IngestReport, MalformedRecordPolicy},
};

#[derive(Parser, Debug)]
#[command(name = "census-ingest")]
#[command(author, version, about = "Load a people CSV file into the users table")]
struct Cli {
    /// Source file; defaults to CSV_FILE_PATH
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// What to do with a malformed line (abort or skip); defaults to
    /// MALFORMED_RECORD_POLICY
    #[arg(long, value_name = "POLICY")]
    on_malformed: Option<MalformedRecordPolicy>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    dotenvy::dotenv().ok();

    let log_level = if cli.verbose {
        LogLevel::Debug
    } else {
        LogLevel::Info
    };

    let log_config = LogConfig::builder()
        .level(log_level)
        .log_file_prefix("census-ingest")
        .filter_directives("sqlx=warn")
        .build();

    // Environment variables take precedence
    let log_config = log_config.clone().merge_env().unwrap_or(log_config);
    let _guard = init_logging(&log_config).ok().flatten();

    match run(cli).await {
        Ok(report) => {
            println!(
                "Ingested {} rows ({} skipped) from {}",
                report.rows_written, report.rows_skipped, report.source
            );
            ExitCode::SUCCESS
        },
        Err(e) => {
            error!(error = %e, "Ingestion failed");
            eprintln!("Error: {:#}", e);
            ExitCode::from(exit_code(&e))
        },
    }
}

async fn run(cli: Cli) -> Result<IngestReport> {
    let mut config = Config::load()?;
    if let Some(file) = cli.file {
        config.ingest.source_path = file;
    }
    if let Some(policy) = cli.on_malformed {
        config.ingest.malformed_record_policy = policy;
    }

    info!(
        source = %config.ingest.source_path.display(),
        policy = %config.ingest.malformed_record_policy,
        "Starting one-shot ingestion"
    );

    let pool = db::create_pool(&config.database).await?;
    let sink = PgUserSink::new(pool);

    let report = IngestPipeline::new(&config.ingest).run(&sink).await?;
    Ok(report)
}

fn exit_code(err: &anyhow::Error) -> u8 {
    err.downcast_ref::<IngestError>()
        .map(IngestError::exit_code)
        .unwrap_or(1)
}
