//! Identity and provenance of one pipeline run.
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::data_handling::{Partition, SplitConfig};

/// Shared by the metrics table and every persisted artifact of a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunInfo {
    pub run_id: String,
    /// UTC, RFC 3339.
    pub created_at: String,
    pub seed: u64,
    pub test_fraction: f64,
    pub stratify: bool,
    pub dataset: Option<String>,
    pub n_rows: usize,
    pub n_train: usize,
    pub n_test: usize,
}

impl RunInfo {
    pub fn new(split: &SplitConfig, partition: &Partition, dataset: Option<String>) -> Self {
        RunInfo {
            run_id: Uuid::new_v4().to_string(),
            created_at: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
            seed: split.seed,
            test_fraction: split.test_fraction,
            stratify: split.stratify,
            dataset,
            n_rows: partition.n_rows(),
            n_train: partition.train.len(),
            n_test: partition.test.len(),
        }
    }
}
