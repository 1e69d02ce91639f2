//! Configuration file data structures

use crate::diff::SIGNIFICANT_CHANGE_THRESHOLD;
use anyhow::Result;
use serde::{Deserialize, Deserializer, Serialize};

/// Configuration file name
pub const CONFIG_FILE_NAME: &str = ".bundle-diff.toml";

/// Default cap on parallel diff workers
pub const DEFAULT_MAX_WORKERS: usize = 8;

/// Default number of pairs a worker handles per batch
pub const DEFAULT_BATCH_SIZE: usize = 10;

/// Options controlling a diff run
///
/// ```toml
/// threshold = 30
/// file-glob = ["**/*-stats.json"]
/// asset-filter = ["!*.map", "!*.d.ts"]
/// parallel = true
/// max-workers = 8
/// batch-size = 10
/// host-url = "https://compare.example.com/"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct DiffOptions {
    /// Bytes an asset may move before the change counts
    pub threshold: u64,

    /// Which stats files to compare; empty means every top-level file
    #[serde(deserialize_with = "one_or_many")]
    pub file_glob: Vec<String>,

    /// Which assets to compare; empty means all of them
    #[serde(deserialize_with = "one_or_many")]
    pub asset_filter: Vec<String>,

    /// Diff file pairs on a worker pool
    pub parallel: bool,

    /// Upper bound on worker threads
    pub max_workers: usize,

    /// Pairs per worker batch
    pub batch_size: usize,

    /// Base URL of the comparison tool
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host_url: Option<String>,
}

impl Default for DiffOptions {
    fn default() -> Self {
        Self {
            threshold: SIGNIFICANT_CHANGE_THRESHOLD,
            file_glob: Vec::new(),
            asset_filter: Vec::new(),
            parallel: true,
            max_workers: DEFAULT_MAX_WORKERS,
            batch_size: DEFAULT_BATCH_SIZE,
            host_url: None,
        }
    }
}

impl DiffOptions {
    /// Reject settings that would stall the worker pool
    pub fn validate(&self) -> Result<()> {
        if self.max_workers == 0 {
            anyhow::bail!("max-workers must be at least 1");
        }
        if self.batch_size == 0 {
            anyhow::bail!("batch-size must be at least 1");
        }
        Ok(())
    }
}

/// Accept `"*.json"` as shorthand for `["*.json"]`
fn one_or_many<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(pattern) => vec![pattern],
        OneOrMany::Many(patterns) => patterns,
    })
}
