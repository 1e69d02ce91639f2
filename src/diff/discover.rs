//! Stats file discovery

use crate::error::DiffError;
use crate::stats::pattern::PatternFilter;
use log::debug;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// List the stats files under `dir` as absolute paths.
///
/// Without a filter only the top-level files are returned. With one, the
/// whole tree is walked and each file's `/`-separated path relative to
/// `dir` is matched against it, so `*.json` selects top-level files and
/// `**/*.json` reaches into subdirectories. Paths come back sorted by
/// relative path.
///
/// # Errors
///
/// [`DiffError::Discovery`] when `dir` or one of its subdirectories cannot be
/// read.
pub fn discover_stats_files(
    dir: &Path,
    filter: Option<&PatternFilter>,
) -> Result<Vec<PathBuf>, DiffError> {
    let root = std::path::absolute(dir).map_err(|source| DiffError::io(dir, source))?;

    let mut walker = WalkDir::new(&root).min_depth(1).follow_links(true);
    if filter.is_none() {
        walker = walker.max_depth(1);
    }

    let mut found: Vec<(String, PathBuf)> = Vec::new();
    for entry in walker {
        let entry = entry.map_err(|source| DiffError::Discovery {
            dir: root.clone(),
            source,
        })?;
        if !entry.file_type().is_file() {
            continue;
        }

        let rel = relative_slash_path(&root, entry.path());
        if filter.is_some_and(|f| !f.is_match(&rel)) {
            continue;
        }
        found.push((rel, entry.into_path()));
    }
    found.sort_by(|a, b| a.0.cmp(&b.0));

    debug!("Found {} stats files in {}", found.len(), root.display());
    Ok(found.into_iter().map(|(_, path)| path).collect())
}

fn relative_slash_path(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
