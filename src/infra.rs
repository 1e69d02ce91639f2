//! Infrastructure traits for abstracting I/O operations.
//!
//! Stats files and remote manifests are always read through [`FileSystem`],
//! so loaders can be exercised against in-memory fixtures in tests.

use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

/// Trait for abstracting read-only filesystem operations.
///
/// The diff engine never writes; implementations only need to hand out
/// readers and file sizes.
pub trait FileSystem {
    /// Open a file for streaming reads.
    fn open(&self, path: &Path) -> io::Result<Box<dyn Read + Send>>;

    /// Size of a file in bytes.
    fn file_len(&self, path: &Path) -> io::Result<u64>;

    /// Read the entire contents of a file into memory.
    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        let mut buf = Vec::new();
        self.open(path)?.read_to_end(&mut buf)?;
        Ok(buf)
    }

    /// Read the entire contents of a UTF-8 file.
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        String::from_utf8(self.read(path)?)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }
}

/// Real filesystem implementation that delegates to std::fs.
#[derive(Debug, Clone, Copy, Default)]
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn open(&self, path: &Path) -> io::Result<Box<dyn Read + Send>> {
        Ok(Box::new(File::open(path)?))
    }

    fn file_len(&self, path: &Path) -> io::Result<u64> {
        std::fs::metadata(path).map(|m| m.len())
    }

    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        std::fs::read(path)
    }
}
