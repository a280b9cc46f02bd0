use serde::Deserialize;
use std::fmt;

/// Body of the instance status endpoint. Only the release number is read.
#[derive(Debug, Deserialize)]
pub struct StatusResponse {
    #[serde(rename = "releaseNumber")]
    pub release_number: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Matched { version: String },
    Mismatched { expected: String, actual: String },
    FetchFailed { reason: String },
}

/// One instance's result, as sent through the result channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckResult {
    pub instance: String,
    pub outcome: Outcome,
}

impl fmt::Display for CheckResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.outcome {
            Outcome::Matched { version } => write!(
                f,
                "Release number matches for instance {}: {}",
                self.instance, version
            ),
            Outcome::Mismatched { expected, actual } => write!(
                f,
                "Release number mismatch for instance {}: expected {}, got {}",
                self.instance, expected, actual
            ),
            Outcome::FetchFailed { reason } => write!(
                f,
                "Error fetching status for instance {}: {}",
                self.instance, reason
            ),
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    pub matched: usize,
    pub mismatched: usize,
    pub failed: usize,
}

impl Summary {
    pub fn record(&mut self, outcome: &Outcome) {
        match outcome {
            Outcome::Matched { .. } => self.matched += 1,
            Outcome::Mismatched { .. } => self.mismatched += 1,
            Outcome::FetchFailed { .. } => self.failed += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.matched + self.mismatched + self.failed
    }

    /// A run is unhealthy when any instance reported a different version.
    /// Fetch failures only count when `fail_on_error` is set.
    pub fn is_healthy(&self, fail_on_error: bool) -> bool {
        self.mismatched == 0 && (!fail_on_error || self.failed == 0)
    }
}
