//! Bundle stats documents: model, naming, filtering and loading

pub mod loader;
pub mod names;
pub mod pattern;
pub mod types;

pub use loader::{StatsLoader, STREAMING_THRESHOLD_BYTES};
pub use names::{friendly_asset, friendly_asset_name, remove_hash_from_name};
pub use pattern::{matches_pattern, PatternFilter};
pub use types::{Artifact, ChunkId, ExtraKeys, StatsDocument};
