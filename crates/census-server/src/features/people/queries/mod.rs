pub mod age_distribution;

pub use age_distribution::{AgeDistributionError, AgeDistributionQuery, AgeDistributionResponse};
