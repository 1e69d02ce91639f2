//! Diff result types
//!
//! These structures are the contract handed to report renderers; they
//! serialize with camelCase keys.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Size changes with an absolute delta at or below this many bytes are
/// reported as zero
pub const SIGNIFICANT_CHANGE_THRESHOLD: u64 = 30;

/// Diff outcome for one asset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetStat {
    /// Friendly (hash-stripped) asset name
    pub asset_name: String,
    /// Asset carries a key-asset marker
    pub is_key_asset: bool,
    /// Key-asset marker carried an explicit target and threshold
    pub has_target: bool,
    /// Baseline size, or the key-asset target when one is set
    pub baseline_asset_size: u64,
    /// Candidate size
    pub candidate_asset_size: u64,
    /// Candidate minus baseline; zero unless the change is significant
    pub size_diff: i64,
    /// Significant growth
    pub is_size_increase: bool,
    /// Significant shrink
    pub is_size_reduction: bool,
    /// Asset absent (or empty) in the baseline
    pub is_added: bool,
    /// Asset absent (or empty) in the candidate
    pub is_removed: bool,
}

/// Assets that changed size significantly
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangedStats {
    /// Grew beyond the threshold
    pub increased: Vec<AssetStat>,
    /// Shrank beyond the threshold
    pub decreased: Vec<AssetStat>,
}

/// Asset-level diff of one stats file pair
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiffStats {
    /// Any asset was added, removed, or changed significantly
    pub is_changed: bool,
    /// Assets only in the candidate
    pub new_assets: Vec<AssetStat>,
    /// Assets only in the baseline
    pub removed_assets: Vec<AssetStat>,
    /// Assets on both sides with a significant size change
    pub changed_stats: ChangedStats,
    /// Assets on both sides without a significant size change
    pub unchanged_stats: Vec<AssetStat>,
}

/// Diff of one stats file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileDiffResult {
    /// Stats file base name
    pub name: String,
    /// Asset-level diff
    pub diff_stats: DiffStats,
    /// Owners of the stats file
    pub owned_by: Vec<String>,
    /// Link to a visual comparison of the two builds
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub comparison_tool_url: Option<String>,
}

/// Stats file that only exists in the baseline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemovedFile {
    /// Stats file base name
    pub name: String,
    /// Where the baseline file was found
    pub baseline_path: PathBuf,
}

/// Stats file whose comparison was rejected as ambiguous
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FailedFile {
    /// Stats file base name
    pub name: String,
    /// Why the comparison was rejected
    pub error: String,
}

/// Result of a whole diff run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileDiffResults {
    /// Files present in both builds
    pub with_differences: Vec<FileDiffResult>,
    /// Files only in the candidate build
    pub new_files: Vec<FileDiffResult>,
    /// Files only in the baseline build
    pub removed_files: Vec<RemovedFile>,
    /// Files rejected because their assets could not be matched unambiguously
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failed_files: Vec<FailedFile>,
}

impl FileDiffResults {
    /// Number of files with at least one changed asset, new files included
    pub fn changed_file_count(&self) -> usize {
        self.with_differences
            .iter()
            .chain(&self.new_files)
            .filter(|r| r.diff_stats.is_changed)
            .count()
    }
}

/// Outcome of diffing one file pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PairOutcome {
    /// Both sides present
    Changed(FileDiffResult),
    /// Candidate only
    Added(FileDiffResult),
    /// Baseline only
    Removed(RemovedFile),
    /// Pair diff was rejected; reported in `failed_files`
    Rejected(FailedFile),
    /// Pair could not be read; dropped from the results
    Failed {
        /// Stats file base name
        name: String,
        /// What went wrong
        message: String,
    },
}

impl FromIterator<PairOutcome> for FileDiffResults {
    fn from_iter<I: IntoIterator<Item = PairOutcome>>(outcomes: I) -> Self {
        let mut results = Self::default();
        for outcome in outcomes {
            match outcome {
                PairOutcome::Changed(r) => results.with_differences.push(r),
                PairOutcome::Added(r) => results.new_files.push(r),
                PairOutcome::Removed(r) => results.removed_files.push(r),
                PairOutcome::Rejected(r) => results.failed_files.push(r),
                PairOutcome::Failed { .. } => {}
            }
        }
        results
    }
}
