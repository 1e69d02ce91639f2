//! Comparing the stats of two builds
//!
//! - [`pairing`]: match stats files (and remote uploads) by base name
//! - [`assets`]: compare the assets of one pair
//! - [`orchestrator`]: discover, pair and diff two whole directories
//! - [`manifest`]: comparison links for uploaded stats files

pub mod assets;
pub mod discover;
pub mod key_asset;
pub mod manifest;
pub mod orchestrator;
pub mod pairing;
pub mod types;

pub use assets::{diff_assets, AssetDiffer};
pub use discover::discover_stats_files;
pub use key_asset::{Budget, KeyAsset, KEY_ASSET_MARKER};
pub use manifest::{comparison_address, load_manifest, ManifestSource, RemoteArtifact, RemoteManifests};
pub use orchestrator::{worker_count, DiffOrchestrator, DiffRequest};
pub use pairing::{pair_files, pair_remote_artifacts, FilePair, OwnershipMap, Sides};
pub use types::{
    AssetStat, ChangedStats, DiffStats, FailedFile, FileDiffResult, FileDiffResults, PairOutcome,
    RemovedFile, SIGNIFICANT_CHANGE_THRESHOLD,
};
