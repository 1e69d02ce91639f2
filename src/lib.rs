#![warn(missing_docs)]
#![warn(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

//! bundle-stats-diff library
//!
//! Compares the bundle stats (bundler-emitted JSON describing every output
//! asset) of a baseline and a candidate build. The result lists, per stats
//! file, which assets grew, shrank, appeared or disappeared, and is the
//! input of CI size-regression reports.
//!
//! # Basic Example
//!
//! Diffing two in-memory documents:
//!
//! ```
//! use bundle_stats_diff::diff::AssetDiffer;
//! use bundle_stats_diff::stats::{Artifact, StatsDocument};
//!
//! let baseline = StatsDocument::from_assets(vec![
//!     Artifact::new("main_0123456789abcdef0123.js", 1000),
//!     Artifact::new("legacy.js", 400),
//! ]);
//! let candidate = StatsDocument::from_assets(vec![
//!     Artifact::new("main_fedcba9876543210fedc.js", 1010),
//! ]);
//!
//! let stats = AssetDiffer::new().diff(&baseline, &candidate)?;
//!
//! // A 10 byte change is below the significance threshold
//! assert_eq!(stats.unchanged_stats[0].asset_name, "main.js");
//! assert_eq!(stats.removed_assets[0].asset_name, "legacy.js");
//! assert!(stats.is_changed);
//! # Ok::<(), bundle_stats_diff::error::DiffError>(())
//! ```
//!
//! # Advanced Example: Key Asset Budgets
//!
//! A chunk named `⭐ <name> <target> <threshold>` compares the candidate
//! against a fixed budget instead of the baseline:
//!
//! ```
//! use bundle_stats_diff::diff::AssetDiffer;
//! use bundle_stats_diff::stats::{Artifact, StatsDocument};
//!
//! let baseline = StatsDocument::from_assets(vec![
//!     Artifact::new("main_0123456789abcdef0123.js", 1000),
//! ]);
//! let candidate = StatsDocument::from_assets(vec![
//!     Artifact::new("main_fedcba9876543210fedc.js", 5300).with_chunk_names(["⭐ main 5000 200"]),
//! ]);
//!
//! let stats = AssetDiffer::new().diff(&baseline, &candidate)?;
//! let main = &stats.changed_stats.increased[0];
//! assert!(main.has_target);
//! assert_eq!(main.baseline_asset_size, 5000);
//! assert_eq!(main.size_diff, 300);
//! # Ok::<(), bundle_stats_diff::error::DiffError>(())
//! ```
//!
//! # Advanced Example: Whole Directories
//!
//! ```no_run
//! use bundle_stats_diff::diff::{DiffOrchestrator, DiffRequest};
//!
//! let request = DiffRequest::new("main/stats", "pr/stats")
//!     .file_glob(["**/*-stats.json"])
//!     .asset_filter(["!*.map", "!*.d.ts"]);
//! let results = DiffOrchestrator::new().diff(&request)?;
//! println!("{}", serde_json::to_string_pretty(&results).unwrap());
//! # Ok::<(), bundle_stats_diff::error::DiffError>(())
//! ```

/// Command handlers for CLI operations
pub mod cmd;
/// `.bundle-diff.toml` options
pub mod config;
/// Pairing, asset comparison and run orchestration
pub mod diff;
/// Error types with contextual suggestions
pub mod error;
/// Infrastructure traits for filesystem access
pub mod infra;
/// Stats document model, naming, filtering and loading
pub mod stats;
