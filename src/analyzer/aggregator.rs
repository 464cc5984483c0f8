use crate::domain::{BumpLevel, Classification, Version};
use crate::error::{Result, SemrelError};
use regex::Regex;
use tracing::debug;

/// Validated aggregation settings
#[derive(Debug, Clone)]
pub struct AggregationConfig {
    /// Matched against the raw subject; hits leave the changelog only
    pub exclude_patterns: Vec<Regex>,
    pub major_on_zero: bool,
}

impl Default for AggregationConfig {
    fn default() -> Self {
        AggregationConfig {
            exclude_patterns: Vec::new(),
            major_on_zero: true,
        }
    }
}

/// Bump decision plus the changelog entries that survived filtering
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Aggregation {
    pub level: BumpLevel,
    pub entries: Vec<Classification>,
    /// A major bump was demoted to minor because of `major_on_zero`
    pub demoted: bool,
}

impl AggregationConfig {
    pub fn new<S: AsRef<str>>(exclude_patterns: &[S], major_on_zero: bool) -> Result<Self> {
        let exclude_patterns = exclude_patterns
            .iter()
            .map(|pattern| {
                let pattern = pattern.as_ref();
                Regex::new(pattern).map_err(|e| {
                    SemrelError::config(format!(
                        "Invalid changelog exclusion pattern '{}': {}",
                        pattern, e
                    ))
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(AggregationConfig {
            exclude_patterns,
            major_on_zero,
        })
    }

    /// Reduce classifications to one bump level and the changelog entries
    ///
    /// The level is the maximum over every classification, so the input
    /// order never matters. Exclusion patterns only filter entries.
    pub fn aggregate(&self, classifications: &[Classification], current: &Version) -> Aggregation {
        let mut level = classifications
            .iter()
            .map(|c| c.bump_level)
            .max()
            .unwrap_or(BumpLevel::None);

        let demoted = level == BumpLevel::Major && !self.major_on_zero && current.major == 0;
        if demoted {
            debug!(current = %current, "major bump demoted to minor while major is 0");
            level = BumpLevel::Minor;
        }

        let entries: Vec<Classification> = classifications
            .iter()
            .filter(|c| !c.exclude_from_changelog)
            .filter(|c| !self.is_excluded(&c.raw_subject))
            .cloned()
            .collect();

        debug!(
            %level,
            commits = classifications.len(),
            entries = entries.len(),
            "aggregated classifications"
        );
        Aggregation {
            level,
            entries,
            demoted,
        }
    }

    fn is_excluded(&self, subject: &str) -> bool {
        self.exclude_patterns.iter().any(|p| p.is_match(subject))
    }
}

/// Aggregate without changelog exclusion patterns
pub fn aggregate(
    classifications: &[Classification],
    major_on_zero: bool,
    current_version: &Version,
) -> Aggregation {
    AggregationConfig {
        exclude_patterns: Vec::new(),
        major_on_zero,
    }
    .aggregate(classifications, current_version)
}
