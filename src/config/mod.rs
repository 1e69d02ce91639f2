//! `.bundle-diff.toml` support
//!
//! Options default to the built-in values when the file is absent; command
//! line flags override whatever the file sets.

pub mod file;
pub mod loader;

pub use file::{DiffOptions, CONFIG_FILE_NAME, DEFAULT_BATCH_SIZE, DEFAULT_MAX_WORKERS};
pub use loader::ConfigLoader;
