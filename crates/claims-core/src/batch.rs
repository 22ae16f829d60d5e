use std::collections::BTreeMap;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::claim::ImageSide;

/// Claim identifier → raw extraction text, for every claim that succeeded.
pub type BatchResult = BTreeMap<String, String>;

/// What happened to one claim group during a batch run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ClaimOutcome {
    Processed,
    SkippedIncomplete { missing: ImageSide },
    SkippedExtractionFailed { error: String },
}

impl ClaimOutcome {
    pub fn is_processed(&self) -> bool {
        matches!(self, ClaimOutcome::Processed)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchReport {
    pub run_id: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub input_dir: PathBuf,
    pub output_path: PathBuf,
    pub files_scanned: usize,
    /// Files whose names carry no `<claimId>_<side>`.
    pub unparsable_files: Vec<String>,
    pub claims: BTreeMap<String, ClaimOutcome>,
    #[serde(skip)]
    pub results: BatchResult,
}

impl BatchReport {
    pub fn total_claims(&self) -> usize {
        self.claims.len()
    }

    pub fn processed(&self) -> usize {
        self.claims.values().filter(|o| o.is_processed()).count()
    }

    /// Claims with both sides, whether or not extraction succeeded.
    pub fn attempted(&self) -> usize {
        self.claims
            .values()
            .filter(|o| !matches!(o, ClaimOutcome::SkippedIncomplete { .. }))
            .count()
    }

    pub fn failed(&self) -> Vec<(&str, &str)> {
        self.claims
            .iter()
            .filter_map(|(id, outcome)| match outcome {
                ClaimOutcome::SkippedExtractionFailed { error } => {
                    Some((id.as_str(), error.as_str()))
                }
                _ => None,
            })
            .collect()
    }

    pub fn incomplete(&self) -> Vec<&str> {
        self.claims
            .iter()
            .filter(|(_, o)| matches!(o, ClaimOutcome::SkippedIncomplete { .. }))
            .map(|(id, _)| id.as_str())
            .collect()
    }
}
