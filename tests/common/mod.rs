//! Common test utilities and helpers
//!
//! This module provides shared functionality for integration tests:
//! - Stats fixture writers (plain and gzipped)
//! - Lookup and assertion helpers for diff results
//!
//! # Usage
//!
//! ```rust,no_run
//! mod common;
//! use common::fixtures::*;
//!
//! fn test_growth() {
//!     let builds = Builds::new();
//!     write_stats(&builds.baseline, "app.json", &[("app.js", 1000)]);
//!     write_stats(&builds.candidate, "app.json", &[("app.js", 1100)]);
//! }
//! ```

pub mod assertions;
pub mod fixtures;
