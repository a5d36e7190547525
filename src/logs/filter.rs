use std::fmt;
use std::str::FromStr;

use crate::models::{DeliveryAttemptRecord, Outcome};

/// Outcome filter applied to the current batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutcomeFilter {
    #[default]
    All,
    Only(Outcome),
}

impl OutcomeFilter {
    pub fn matches(&self, record: &DeliveryAttemptRecord) -> bool {
        match self {
            Self::All => true,
            Self::Only(outcome) => record.outcome == *outcome,
        }
    }

    /// Non-destructive projection over `records`, preserving order
    pub fn apply<'a>(
        &self,
        records: &'a [DeliveryAttemptRecord],
    ) -> Vec<&'a DeliveryAttemptRecord> {
        records.iter().filter(|r| self.matches(r)).collect()
    }

    /// all -> SUCCESS -> FAILED_ATTEMPT -> FAILURE -> all
    pub fn next(&self) -> Self {
        match self {
            Self::All => Self::Only(Outcome::Success),
            Self::Only(Outcome::Success) => Self::Only(Outcome::FailedAttempt),
            Self::Only(Outcome::FailedAttempt) => Self::Only(Outcome::Failure),
            Self::Only(Outcome::Failure) => Self::All,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Only(outcome) => outcome.as_str(),
        }
    }
}

impl fmt::Display for OutcomeFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for OutcomeFilter {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        if value.trim().eq_ignore_ascii_case("all") {
            return Ok(Self::All);
        }
        value
            .parse::<Outcome>()
            .map(Self::Only)
            .map_err(|_| {
                format!(
                    "Invalid outcome filter: '{}'. \
                     Must be one of: all, SUCCESS, FAILED_ATTEMPT, FAILURE",
                    value
                )
            })
    }
}
