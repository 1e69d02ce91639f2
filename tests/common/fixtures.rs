//! Test fixture helpers for creating stats directories
//!
//! Provides utilities for laying out a baseline and a candidate build the
//! way a CI job would download them.

#![allow(dead_code)]

use flate2::write::GzEncoder;
use flate2::Compression;
use serde_json::{json, Value};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A temporary workspace with `baseline/` and `candidate/` directories
///
/// The TempDir must be kept alive for as long as the paths are used.
pub struct Builds {
    pub root: TempDir,
    pub baseline: PathBuf,
    pub candidate: PathBuf,
}

impl Builds {
    pub fn new() -> Self {
        let root = TempDir::new().expect("Failed to create temp dir");
        let baseline = root.path().join("baseline");
        let candidate = root.path().join("candidate");
        fs::create_dir_all(&baseline).expect("Failed to create baseline dir");
        fs::create_dir_all(&candidate).expect("Failed to create candidate dir");
        Self {
            root,
            baseline,
            candidate,
        }
    }

    /// Path of a file in the workspace root
    pub fn path(&self, name: &str) -> PathBuf {
        self.root.path().join(name)
    }
}

/// Stats JSON with the given `(name, size)` assets
pub fn stats_json(assets: &[(&str, u64)]) -> Value {
    let assets: Vec<Value> = assets
        .iter()
        .map(|(name, size)| json!({ "name": name, "size": size }))
        .collect();
    json!({ "hash": "0123abcd", "assets": assets })
}

/// Write a stats file and return its path
pub fn write_stats(dir: &Path, file: &str, assets: &[(&str, u64)]) -> PathBuf {
    write_json(dir, file, &stats_json(assets))
}

/// Write arbitrary JSON, creating parent directories
pub fn write_json(dir: &Path, file: &str, value: &Value) -> PathBuf {
    let path = dir.join(file);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("Failed to create fixture dir");
    }
    fs::write(&path, value.to_string()).expect("Failed to write fixture");
    path
}

/// Write a gzip-compressed stats file and return its path
pub fn write_gzipped_stats(dir: &Path, file: &str, assets: &[(&str, u64)]) -> PathBuf {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(stats_json(assets).to_string().as_bytes())
        .expect("Failed to compress fixture");
    let path = dir.join(file);
    fs::write(&path, encoder.finish().expect("Failed to finish gzip"))
        .expect("Failed to write fixture");
    path
}
