//! Age bucket distribution
//!
//! Ages are tallied into four fixed buckets and reported as percentages of the
//! total. Raw stored values cross a single typed parse step ([`parse_age`])
//! before they are counted; what happens to values that fail it is decided by
//! an [`UnparseableAgePolicy`].

use serde::{Deserialize, Serialize};

use crate::error::{CensusError, Result};

/// One of the four fixed age ranges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AgeBucket {
    /// `age < 20`, including negative ages
    Under20,
    /// `20 <= age < 40`
    From20To40,
    /// `40 <= age < 60`
    From40To60,
    /// `age >= 60`
    Over60,
}

impl AgeBucket {
    pub const ALL: [AgeBucket; 4] = [
        AgeBucket::Under20,
        AgeBucket::From20To40,
        AgeBucket::From40To60,
        AgeBucket::Over60,
    ];

    pub fn for_age(age: i64) -> Self {
        match age {
            i64::MIN..=19 => AgeBucket::Under20,
            20..=39 => AgeBucket::From20To40,
            40..=59 => AgeBucket::From40To60,
            _ => AgeBucket::Over60,
        }
    }

    /// Label used in reports
    pub fn label(self) -> &'static str {
        match self {
            AgeBucket::Under20 => "< 20",
            AgeBucket::From20To40 => "20 to 40",
            AgeBucket::From40To60 => "40 to 60",
            AgeBucket::Over60 => "> 60",
        }
    }
}

impl std::fmt::Display for AgeBucket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Number of ages that fell into each bucket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketCounts {
    #[serde(rename = "< 20")]
    pub under_20: u64,
    #[serde(rename = "20 to 40")]
    pub from_20_to_40: u64,
    #[serde(rename = "40 to 60")]
    pub from_40_to_60: u64,
    #[serde(rename = "> 60")]
    pub over_60: u64,
}

impl BucketCounts {
    pub fn tally(ages: &[i64]) -> Self {
        let mut counts = Self::default();
        for &age in ages {
            counts.record(age);
        }
        counts
    }

    pub fn record(&mut self, age: i64) {
        *self.slot_mut(AgeBucket::for_age(age)) += 1;
    }

    pub fn count(&self, bucket: AgeBucket) -> u64 {
        match bucket {
            AgeBucket::Under20 => self.under_20,
            AgeBucket::From20To40 => self.from_20_to_40,
            AgeBucket::From40To60 => self.from_40_to_60,
            AgeBucket::Over60 => self.over_60,
        }
    }

    fn slot_mut(&mut self, bucket: AgeBucket) -> &mut u64 {
        match bucket {
            AgeBucket::Under20 => &mut self.under_20,
            AgeBucket::From20To40 => &mut self.from_20_to_40,
            AgeBucket::From40To60 => &mut self.from_40_to_60,
            AgeBucket::Over60 => &mut self.over_60,
        }
    }

    pub fn total(&self) -> u64 {
        AgeBucket::ALL.iter().map(|&bucket| self.count(bucket)).sum()
    }

    /// Converts the counts into percentages of the total.
    ///
    /// # Errors
    ///
    /// [`CensusError::EmptyInput`] when nothing was counted.
    pub fn percentages(&self) -> Result<AgeDistribution> {
        let total = self.total();
        if total == 0 {
            return Err(CensusError::EmptyInput);
        }

        let share = |bucket| (self.count(bucket) as f64 / total as f64) * 100.0;
        Ok(AgeDistribution {
            under_20: share(AgeBucket::Under20),
            from_20_to_40: share(AgeBucket::From20To40),
            from_40_to_60: share(AgeBucket::From40To60),
            over_60: share(AgeBucket::Over60),
        })
    }
}

/// Percentage of ages per bucket, each in `0.0..=100.0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AgeDistribution {
    #[serde(rename = "< 20")]
    pub under_20: f64,
    #[serde(rename = "20 to 40")]
    pub from_20_to_40: f64,
    #[serde(rename = "40 to 60")]
    pub from_40_to_60: f64,
    #[serde(rename = "> 60")]
    pub over_60: f64,
}

impl AgeDistribution {
    pub fn share(&self, bucket: AgeBucket) -> f64 {
        match bucket {
            AgeBucket::Under20 => self.under_20,
            AgeBucket::From20To40 => self.from_20_to_40,
            AgeBucket::From40To60 => self.from_40_to_60,
            AgeBucket::Over60 => self.over_60,
        }
    }
}

/// Computes the percentage distribution of `ages`.
///
/// # Errors
///
/// [`CensusError::EmptyInput`] when `ages` is empty.
pub fn distribution(ages: &[i64]) -> Result<AgeDistribution> {
    BucketCounts::tally(ages).percentages()
}

// ============================================================================
// Parsing
// ============================================================================

/// What to do with a stored age that is not an integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum UnparseableAgePolicy {
    /// Drop the value and count it as excluded
    #[default]
    Exclude,
    /// Fail the whole aggregation
    Reject,
}

impl std::str::FromStr for UnparseableAgePolicy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "exclude" | "skip" => Ok(UnparseableAgePolicy::Exclude),
            "reject" | "fail" => Ok(UnparseableAgePolicy::Reject),
            _ => Err(anyhow::anyhow!("Invalid unparseable age policy: {}", s)),
        }
    }
}

impl std::fmt::Display for UnparseableAgePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UnparseableAgePolicy::Exclude => write!(f, "exclude"),
            UnparseableAgePolicy::Reject => write!(f, "reject"),
        }
    }
}

/// Parses one stored age. Surrounding whitespace is ignored; anything else
/// that is not a base-10 integer fails.
pub fn parse_age(raw: &str) -> Result<i64> {
    raw.trim()
        .parse::<i64>()
        .map_err(|source| CensusError::AgeParse {
            value: raw.to_string(),
            source,
        })
}

/// Ages that survived [`parse_ages`], plus how many values were dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedAges {
    pub ages: Vec<i64>,
    pub excluded: u64,
}

/// Parses raw stored ages under `policy`.
///
/// # Errors
///
/// [`CensusError::AgeParse`] for the first bad value under
/// [`UnparseableAgePolicy::Reject`].
pub fn parse_ages<I, S>(raw: I, policy: UnparseableAgePolicy) -> Result<ParsedAges>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut parsed = ParsedAges::default();
    for value in raw {
        match parse_age(value.as_ref()) {
            Ok(age) => parsed.ages.push(age),
            Err(err) => match policy {
                UnparseableAgePolicy::Reject => return Err(err),
                UnparseableAgePolicy::Exclude => {
                    tracing::debug!(error = %err, "Excluding unparseable age");
                    parsed.excluded += 1;
                },
            },
        }
    }
    Ok(parsed)
}
