//! Pairing baseline and candidate inputs by logical name
//!
//! Stats files are matched by base name: `a/stat_1.json` and
//! `b/stat_1.json` describe the same logical bundle in two builds. The same
//! strategy pairs remote artifacts and, inside the differ, assets.

use super::manifest::RemoteArtifact;
use log::warn;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Stats file base name to owner handles
pub type OwnershipMap = HashMap<String, Vec<String>>;

/// Which sides of a pair exist. A pair always has at least one side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sides<T> {
    /// Present in both builds
    Both {
        /// Baseline location
        baseline: T,
        /// Candidate location
        candidate: T,
    },
    /// Removed in the candidate
    BaselineOnly(T),
    /// New in the candidate
    CandidateOnly(T),
}

impl<T> Sides<T> {
    fn from_options(baseline: Option<T>, candidate: Option<T>) -> Option<Self> {
        match (baseline, candidate) {
            (Some(baseline), Some(candidate)) => Some(Self::Both {
                baseline,
                candidate,
            }),
            (Some(baseline), None) => Some(Self::BaselineOnly(baseline)),
            (None, Some(candidate)) => Some(Self::CandidateOnly(candidate)),
            (None, None) => None,
        }
    }

    /// Baseline side, if present
    pub fn baseline(&self) -> Option<&T> {
        match self {
            Self::Both { baseline, .. } | Self::BaselineOnly(baseline) => Some(baseline),
            Self::CandidateOnly(_) => None,
        }
    }

    /// Candidate side, if present
    pub fn candidate(&self) -> Option<&T> {
        match self {
            Self::Both { candidate, .. } | Self::CandidateOnly(candidate) => Some(candidate),
            Self::BaselineOnly(_) => None,
        }
    }
}

/// Baseline and/or candidate input sharing one logical name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePair<T = PathBuf> {
    /// Logical name (base name of the file)
    pub name: String,
    /// Locations on each side
    pub sides: Sides<T>,
    /// Owners of this file; empty when unknown
    pub owned_by: Vec<String>,
}

impl<T> FilePair<T> {
    /// Baseline location, if present
    pub fn baseline(&self) -> Option<&T> {
        self.sides.baseline()
    }

    /// Candidate location, if present
    pub fn candidate(&self) -> Option<&T> {
        self.sides.candidate()
    }
}

/// Pair two named collections by name.
///
/// Names come out in first-seen order, baseline first. When a name repeats
/// within one side the last item wins.
pub(crate) fn pair_by_name<T>(
    baseline: impl IntoIterator<Item = (String, T)>,
    candidate: impl IntoIterator<Item = (String, T)>,
) -> Vec<(String, Option<T>, Option<T>)> {
    let mut order: Vec<String> = Vec::new();
    let mut slots: HashMap<String, (Option<T>, Option<T>)> = HashMap::new();

    for (name, item) in baseline {
        let slot = slots.entry(name.clone()).or_insert_with(|| {
            order.push(name.clone());
            (None, None)
        });
        if slot.0.replace(item).is_some() {
            warn!("'{}' appears more than once in the baseline, keeping the last", name);
        }
    }

    for (name, item) in candidate {
        let slot = slots.entry(name.clone()).or_insert_with(|| {
            order.push(name.clone());
            (None, None)
        });
        if slot.1.replace(item).is_some() {
            warn!("'{}' appears more than once in the candidate, keeping the last", name);
        }
    }

    order
        .into_iter()
        .filter_map(|name| {
            let (baseline, candidate) = slots.remove(&name)?;
            Some((name, baseline, candidate))
        })
        .collect()
}

fn base_name(path: &Path) -> String {
    path.file_name()
        .unwrap_or(path.as_os_str())
        .to_string_lossy()
        .into_owned()
}

/// Pair stats file paths by base name, attaching owners.
///
/// Every distinct base name yields exactly one pair. Owners are looked up by
/// base name; unmapped names get an empty list.
///
/// # Examples
///
/// ```
/// use bundle_stats_diff::diff::pair_files;
///
/// let pairs = pair_files(&["a/stat_1.json", "a/stat_2.json"], &["b/stat_1.json"], None);
/// assert_eq!(pairs.len(), 2);
/// assert!(pairs[1].candidate().is_none());
/// ```
pub fn pair_files<P: AsRef<Path>>(
    baseline: &[P],
    candidate: &[P],
    ownership: Option<&OwnershipMap>,
) -> Vec<FilePair<PathBuf>> {
    let named = |paths: &[P]| -> Vec<(String, PathBuf)> {
        paths
            .iter()
            .map(|p| (base_name(p.as_ref()), p.as_ref().to_path_buf()))
            .collect()
    };

    pair_by_name(named(baseline), named(candidate))
        .into_iter()
        .filter_map(|(name, baseline, candidate)| {
            let sides = Sides::from_options(baseline, candidate)?;
            let owned_by = ownership
                .and_then(|owners| owners.get(&name))
                .cloned()
                .unwrap_or_default();
            Some(FilePair {
                name,
                sides,
                owned_by,
            })
        })
        .collect()
}

/// Pair remote artifacts by the base name of their blob name; each side of
/// a pair holds the artifact's URL.
pub fn pair_remote_artifacts(
    baseline: &[RemoteArtifact],
    candidate: &[RemoteArtifact],
) -> Vec<FilePair<String>> {
    let named = |artifacts: &[RemoteArtifact]| -> Vec<(String, String)> {
        artifacts
            .iter()
            .map(|a| (base_name(Path::new(&a.name)), a.url.clone()))
            .collect()
    };

    pair_by_name(named(baseline), named(candidate))
        .into_iter()
        .filter_map(|(name, baseline, candidate)| {
            Some(FilePair {
                name,
                sides: Sides::from_options(baseline, candidate)?,
                owned_by: Vec::new(),
            })
        })
        .collect()
}
