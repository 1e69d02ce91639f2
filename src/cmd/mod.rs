//! Command handlers for the bundle-stats-diff CLI
//!
//! Each submodule handles a specific CLI command.

pub mod completions;
pub mod diff;

pub use completions::cmd_completions;
pub use diff::{cmd_diff, DiffArgs};
