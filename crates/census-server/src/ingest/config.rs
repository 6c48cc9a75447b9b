//! Ingestion configuration

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default location of the delimited source file.
pub const DEFAULT_SOURCE_PATH: &str = "data/users.csv";

/// What a run does when a line cannot be turned into a stored user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MalformedRecordPolicy {
    /// Stop at the first malformed line; rows already written stay committed
    #[default]
    Abort,
    /// Log the line, count it as skipped and keep going
    Skip,
}

impl std::str::FromStr for MalformedRecordPolicy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "abort" | "fail" => Ok(MalformedRecordPolicy::Abort),
            "skip" | "continue" => Ok(MalformedRecordPolicy::Skip),
            _ => Err(anyhow::anyhow!("Invalid malformed record policy: {}", s)),
        }
    }
}

impl std::fmt::Display for MalformedRecordPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MalformedRecordPolicy::Abort => write!(f, "abort"),
            MalformedRecordPolicy::Skip => write!(f, "skip"),
        }
    }
}

/// Ingestion settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestConfig {
    /// Delimited file read by a run (`CSV_FILE_PATH`)
    pub source_path: PathBuf,
    /// `MALFORMED_RECORD_POLICY`
    pub malformed_record_policy: MalformedRecordPolicy,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            source_path: PathBuf::from(DEFAULT_SOURCE_PATH),
            malformed_record_policy: MalformedRecordPolicy::default(),
        }
    }
}

impl IngestConfig {
    /// Load ingestion settings from a variable lookup
    pub fn from_vars(var: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let malformed_record_policy = match var("MALFORMED_RECORD_POLICY") {
            Some(value) => value.parse()?,
            None => MalformedRecordPolicy::default(),
        };

        Ok(Self {
            source_path: var("CSV_FILE_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_SOURCE_PATH)),
            malformed_record_policy,
        })
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.source_path.as_os_str().is_empty() {
            anyhow::bail!("CSV_FILE_PATH cannot be empty");
        }
        Ok(())
    }
}
