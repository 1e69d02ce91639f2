//! Key-asset markers
//!
//! A bundle config flags an asset as "key" by giving one of its chunks a
//! name starting with `⭐ `. The marker may also carry a size budget:
//!
//! ```text
//! ⭐ main                 key asset, ordinary comparison
//! ⭐ main 250000 1024     key asset compared against 250000 bytes, ±1024
//! ```

/// Chunk-name prefix that marks a key asset
pub const KEY_ASSET_MARKER: &str = "⭐ ";

/// Explicit size budget carried by a key-asset marker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Budget {
    /// Size the candidate is compared against instead of the baseline
    pub target: u64,
    /// Significance threshold for this asset only
    pub threshold: u64,
}

/// Key-asset status of a candidate artifact
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum KeyAsset {
    /// No marker
    #[default]
    Regular,
    /// Marker found, with a budget when it carried well-formed tokens
    Key(Option<Budget>),
}

impl KeyAsset {
    /// Status from the first marker among `chunk_names`
    ///
    /// # Examples
    ///
    /// ```
    /// use bundle_stats_diff::diff::{Budget, KeyAsset};
    ///
    /// let status = KeyAsset::from_chunk_names(&["vendors", "⭐ main 5000 100"]);
    /// assert_eq!(status.budget(), Some(Budget { target: 5000, threshold: 100 }));
    /// ```
    pub fn from_chunk_names<S: AsRef<str>>(chunk_names: &[S]) -> Self {
        chunk_names
            .iter()
            .map(AsRef::as_ref)
            .find(|name| name.starts_with(KEY_ASSET_MARKER))
            .map_or(Self::Regular, |marker| Self::Key(parse_budget(marker)))
    }

    /// Whether a marker was found
    pub fn is_key(&self) -> bool {
        matches!(self, Self::Key(_))
    }

    /// Budget, when the marker carried one
    pub fn budget(&self) -> Option<Budget> {
        match self {
            Self::Key(budget) => *budget,
            Self::Regular => None,
        }
    }
}

/// `⭐ <name> <target> <threshold>`: exactly four space-separated tokens.
fn parse_budget(marker: &str) -> Option<Budget> {
    let tokens: Vec<&str> = marker.split(' ').collect();
    let [_, _, target, threshold] = tokens.as_slice() else {
        return None;
    };
    Some(Budget {
        target: target.parse().ok()?,
        threshold: threshold.parse().ok()?,
    })
}
