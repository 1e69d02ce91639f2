//! Stats file loading
//!
//! Stats files range from a few KB to hundreds of MB. Small files are read
//! whole and parsed from a slice; large or gzip-compressed files are parsed
//! incrementally from a buffered reader so the raw text is never resident in
//! full.

use super::types::{ExtraKeys, StatsDocument};
use crate::error::DiffError;
use crate::infra::{FileSystem, RealFileSystem};
use flate2::bufread::GzDecoder;
use log::debug;
use serde::de::DeserializeSeed;
use std::io::{self, BufRead, BufReader, Read};
use std::path::Path;

/// Files at or above this size are parsed incrementally
pub const STREAMING_THRESHOLD_BYTES: u64 = 10 * 1024 * 1024;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];
const READ_BUFFER_BYTES: usize = 256 * 1024;

/// Loads [`StatsDocument`]s from disk
///
/// # Examples
///
/// ```no_run
/// use bundle_stats_diff::stats::{ExtraKeys, StatsLoader};
/// use std::path::Path;
///
/// let loader = StatsLoader::new().extra_keys(ExtraKeys::Skip);
/// let doc = loader.load(Path::new("dist/bundle-stats.json"))?;
/// println!("{} assets", doc.assets.len());
/// # Ok::<(), bundle_stats_diff::error::DiffError>(())
/// ```
#[derive(Debug, Clone)]
pub struct StatsLoader<FS: FileSystem = RealFileSystem> {
    fs: FS,
    extra_keys: ExtraKeys,
    streaming_threshold: u64,
}

impl StatsLoader<RealFileSystem> {
    /// Loader reading from the real filesystem
    pub fn new() -> Self {
        Self::with_fs(RealFileSystem)
    }
}

impl Default for StatsLoader<RealFileSystem> {
    fn default() -> Self {
        Self::new()
    }
}

impl<FS: FileSystem> StatsLoader<FS> {
    /// Loader with a custom filesystem implementation
    pub fn with_fs(fs: FS) -> Self {
        Self {
            fs,
            extra_keys: ExtraKeys::Preserve,
            streaming_threshold: STREAMING_THRESHOLD_BYTES,
        }
    }

    /// Choose whether non-`assets` keys are kept
    pub fn extra_keys(mut self, extra_keys: ExtraKeys) -> Self {
        self.extra_keys = extra_keys;
        self
    }

    /// Override the size at which parsing switches to streaming
    pub fn streaming_threshold(mut self, bytes: u64) -> Self {
        self.streaming_threshold = bytes;
        self
    }

    /// Load and parse one stats file.
    ///
    /// # Errors
    ///
    /// [`DiffError::Io`] when the file cannot be read (including corrupt
    /// gzip data), [`DiffError::Parse`] when its content is not a stats
    /// object.
    pub fn load(&self, path: &Path) -> Result<StatsDocument, DiffError> {
        let len = self
            .fs
            .file_len(path)
            .map_err(|source| DiffError::io(path, source))?;

        if len < self.streaming_threshold {
            let bytes = self
                .fs
                .read(path)
                .map_err(|source| DiffError::io(path, source))?;
            if bytes.starts_with(&GZIP_MAGIC) {
                debug!("Decompressing {} ({} bytes)", path.display(), len);
                return self.parse_reader(path, GzDecoder::new(bytes.as_slice()));
            }
            return self.parse_slice(path, &bytes);
        }

        debug!("Streaming {} ({} bytes)", path.display(), len);
        let file = self
            .fs
            .open(path)
            .map_err(|source| DiffError::io(path, source))?;
        let mut reader = BufReader::with_capacity(READ_BUFFER_BYTES, file);
        let gzipped = reader
            .fill_buf()
            .map_err(|source| DiffError::io(path, source))?
            .starts_with(&GZIP_MAGIC);

        if gzipped {
            self.parse_reader(path, GzDecoder::new(reader))
        } else {
            self.parse_reader(path, reader)
        }
    }

    /// Load both sides of a pair concurrently
    pub fn load_pair(
        &self,
        baseline: &Path,
        candidate: &Path,
    ) -> (
        Result<StatsDocument, DiffError>,
        Result<StatsDocument, DiffError>,
    )
    where
        FS: Sync,
    {
        rayon::join(|| self.load(baseline), || self.load(candidate))
    }

    fn parse_slice(&self, path: &Path, bytes: &[u8]) -> Result<StatsDocument, DiffError> {
        let mut de = serde_json::Deserializer::from_slice(bytes);
        let doc = self
            .extra_keys
            .deserialize(&mut de)
            .and_then(|doc| de.end().map(|()| doc));
        doc.map_err(|e| classify_json_error(path, e))
    }

    fn parse_reader<R: Read>(&self, path: &Path, reader: R) -> Result<StatsDocument, DiffError> {
        let mut de =
            serde_json::Deserializer::from_reader(BufReader::with_capacity(READ_BUFFER_BYTES, reader));
        let doc = self
            .extra_keys
            .deserialize(&mut de)
            .and_then(|doc| de.end().map(|()| doc));
        doc.map_err(|e| classify_json_error(path, e))
    }
}

/// Reader failures surface through serde_json as I/O-category errors; keep
/// them apart from malformed content.
fn classify_json_error(path: &Path, e: serde_json::Error) -> DiffError {
    if e.is_io() {
        DiffError::io(path, io::Error::from(e))
    } else {
        DiffError::Parse {
            path: path.to_path_buf(),
            source: e,
        }
    }
}
