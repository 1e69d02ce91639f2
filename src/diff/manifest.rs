//! Remote artifact manifests and comparison links
//!
//! When the stats files of both builds were also uploaded to a blob store,
//! each side comes with a manifest listing where every file lives. Pairing
//! the two manifests yields, per stats file, a link to a hosted visual
//! comparison of the two uploads.

use super::pairing::pair_remote_artifacts;
use crate::error::DiffError;
use crate::infra::FileSystem;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use url::{form_urlencoded, Url};

/// One uploaded stats file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteArtifact {
    /// Blob name, e.g. `builds/1234/app-stats.json`
    pub name: String,
    /// Download URL
    pub url: String,
}

impl RemoteArtifact {
    /// Create a descriptor
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }
}

/// A manifest given inline or as a JSON file on disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ManifestSource {
    /// Already-materialized descriptors
    Artifacts(Vec<RemoteArtifact>),
    /// Path to a JSON array of `{"name", "url"}` objects
    Path(PathBuf),
}

impl ManifestSource {
    /// Materialize the descriptor list
    pub fn resolve<FS: FileSystem>(&self, fs: &FS) -> Result<Vec<RemoteArtifact>, DiffError> {
        match self {
            Self::Artifacts(artifacts) => Ok(artifacts.clone()),
            Self::Path(path) => load_manifest(fs, path),
        }
    }
}

impl From<Vec<RemoteArtifact>> for ManifestSource {
    fn from(artifacts: Vec<RemoteArtifact>) -> Self {
        Self::Artifacts(artifacts)
    }
}

impl From<PathBuf> for ManifestSource {
    fn from(path: PathBuf) -> Self {
        Self::Path(path)
    }
}

/// Manifests for both builds plus the comparison tool's address
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteManifests {
    /// Baseline uploads
    pub baseline: ManifestSource,
    /// Candidate uploads
    pub candidate: ManifestSource,
    /// Base URL of the comparison tool
    pub host_url: String,
}

impl RemoteManifests {
    /// Bundle both manifests with a host URL
    pub fn new(
        baseline: impl Into<ManifestSource>,
        candidate: impl Into<ManifestSource>,
        host_url: impl Into<String>,
    ) -> Self {
        Self {
            baseline: baseline.into(),
            candidate: candidate.into(),
            host_url: host_url.into(),
        }
    }

    /// Comparison link per stats file name.
    ///
    /// Only files uploaded on both sides get a link.
    ///
    /// # Errors
    ///
    /// [`DiffError::ManifestIo`] or [`DiffError::ManifestParse`] when a
    /// manifest file cannot be loaded.
    pub fn comparison_links<FS: FileSystem>(
        &self,
        fs: &FS,
    ) -> Result<HashMap<String, String>, DiffError> {
        let baseline = self.baseline.resolve(fs)?;
        let candidate = self.candidate.resolve(fs)?;

        let links: HashMap<String, String> = pair_remote_artifacts(&baseline, &candidate)
            .into_iter()
            .filter_map(|pair| {
                let link =
                    comparison_address(pair.baseline()?, pair.candidate()?, &self.host_url)?;
                Some((pair.name, link))
            })
            .collect();

        debug!(
            "Resolved {} comparison links from {} baseline and {} candidate uploads",
            links.len(),
            baseline.len(),
            candidate.len()
        );
        Ok(links)
    }
}

/// Load a manifest file, parsing it straight from a buffered reader.
pub fn load_manifest<FS: FileSystem>(
    fs: &FS,
    path: &Path,
) -> Result<Vec<RemoteArtifact>, DiffError> {
    let file = fs.open(path).map_err(|source| DiffError::ManifestIo {
        path: path.to_path_buf(),
        source,
    })?;

    serde_json::from_reader(BufReader::new(file)).map_err(|source| {
        if source.is_io() {
            DiffError::ManifestIo {
                path: path.to_path_buf(),
                source: source.into(),
            }
        } else {
            DiffError::ManifestParse {
                path: path.to_path_buf(),
                source,
            }
        }
    })
}

/// Address of a visual comparison between two uploaded stats files.
///
/// Both URLs are percent-encoded into a single `urls` query parameter of the
/// host address. Returns `None` when any input is empty or the host is not a
/// valid absolute URL.
///
/// # Examples
///
/// ```
/// use bundle_stats_diff::diff::comparison_address;
///
/// let link = comparison_address("https://blob/a.json", "https://blob/b.json", "https://compare.example.com/")
///     .unwrap();
/// assert_eq!(
///     link,
///     "https://compare.example.com/?urls=https%3A%2F%2Fblob%2Fa.json,https%3A%2F%2Fblob%2Fb.json"
/// );
/// assert!(comparison_address("", "https://blob/b.json", "https://compare.example.com/").is_none());
/// ```
pub fn comparison_address(baseline_url: &str, candidate_url: &str, host_url: &str) -> Option<String> {
    if baseline_url.is_empty() || candidate_url.is_empty() || host_url.is_empty() {
        return None;
    }

    let mut address = match Url::parse(host_url) {
        Ok(url) => url,
        Err(e) => {
            warn!("Ignoring comparison host '{}': {}", host_url, e);
            return None;
        }
    };

    let encode = |s: &str| form_urlencoded::byte_serialize(s.as_bytes()).collect::<String>();
    address.set_query(Some(&format!(
        "urls={},{}",
        encode(baseline_url),
        encode(candidate_url)
    )));
    Some(address.into())
}
