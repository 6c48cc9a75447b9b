use census_common::distribution::{
    parse_ages, AgeDistribution, BucketCounts, UnparseableAgePolicy,
};
use census_common::CensusError;
use serde::{Deserialize, Serialize};

use crate::ingest::{SinkError, UserSink};

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct AgeDistributionQuery {
    pub policy: UnparseableAgePolicy,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgeDistributionResponse {
    pub distribution: AgeDistribution,
    pub counts: BucketCounts,
    /// Ages that were counted
    pub total: u64,
    /// Stored values dropped as unparseable
    pub excluded: u64,
}

#[derive(Debug, thiserror::Error)]
pub enum AgeDistributionError {
    #[error("No stored ages to aggregate")]
    NoData { excluded: u64 },
    #[error("Stored age is not an integer: {0}")]
    InvalidAge(#[source] CensusError),
    #[error("Failed to read stored ages: {0}")]
    Sink(#[from] SinkError),
}

#[tracing::instrument(skip(sink), fields(policy = %query.policy))]
pub async fn handle(
    sink: &dyn UserSink,
    query: AgeDistributionQuery,
) -> Result<AgeDistributionResponse, AgeDistributionError> {
    let raw = sink.select_all_ages().await?;
    let parsed = parse_ages(&raw, query.policy).map_err(AgeDistributionError::InvalidAge)?;

    let counts = BucketCounts::tally(&parsed.ages);
    let distribution = counts.percentages().map_err(|err| match err {
        CensusError::EmptyInput => AgeDistributionError::NoData {
            excluded: parsed.excluded,
        },
        other => AgeDistributionError::InvalidAge(other),
    })?;

    tracing::debug!(
        stored = raw.len(),
        total = counts.total(),
        excluded = parsed.excluded,
        "Computed age distribution"
    );

    Ok(AgeDistributionResponse {
        distribution,
        counts,
        total: counts.total(),
        excluded: parsed.excluded,
    })
}
