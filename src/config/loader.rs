//! Configuration file loading

use super::file::{DiffOptions, CONFIG_FILE_NAME};
use crate::infra::{FileSystem, RealFileSystem};
use anyhow::{Context, Result};
use std::path::Path;

/// Loads `.bundle-diff.toml`
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load options from .bundle-diff.toml in the given directory
    ///
    /// Returns the defaults when the file does not exist.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use bundle_stats_diff::config::ConfigLoader;
    /// use std::path::Path;
    ///
    /// let options = ConfigLoader::load(Path::new("."))?;
    /// println!("Threshold: {} bytes", options.threshold);
    /// # Ok::<(), anyhow::Error>(())
    /// ```
    pub fn load(dir: &Path) -> Result<DiffOptions> {
        Self::load_with_fs(dir, &RealFileSystem)
    }

    /// Load options with a custom filesystem implementation
    pub fn load_with_fs<FS: FileSystem>(dir: &Path, fs: &FS) -> Result<DiffOptions> {
        let config_path = dir.join(CONFIG_FILE_NAME);

        let contents = match fs.read_to_string(&config_path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(DiffOptions::default());
            }
            Err(e) => {
                return Err(e).context("Failed to read .bundle-diff.toml");
            }
        };

        let options: DiffOptions =
            toml_edit::de::from_str(&contents).context("Failed to parse .bundle-diff.toml")?;

        options
            .validate()
            .context("Invalid .bundle-diff.toml settings")?;

        Ok(options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{self, Read};

    struct MockFileSystem {
        file_content: Option<String>,
        should_fail_read: bool,
    }

    impl MockFileSystem {
        fn with_content(content: &str) -> Self {
            Self {
                file_content: Some(content.to_string()),
                should_fail_read: false,
            }
        }

        fn content(&self) -> io::Result<String> {
            if self.should_fail_read {
                return Err(io::Error::new(
                    io::ErrorKind::PermissionDenied,
                    "permission denied",
                ));
            }
            self.file_content
                .clone()
                .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "file not found"))
        }
    }

    impl FileSystem for MockFileSystem {
        fn open(&self, _path: &Path) -> io::Result<Box<dyn Read + Send>> {
            Ok(Box::new(io::Cursor::new(self.content()?.into_bytes())))
        }

        fn file_len(&self, _path: &Path) -> io::Result<u64> {
            Ok(self.content()?.len() as u64)
        }
    }

    #[test]
    fn test_loader_loads_from_valid_toml() {
        let temp = tempfile::tempdir().unwrap();
        std::fs::write(
            temp.path().join(CONFIG_FILE_NAME),
            r#"
threshold = 100
file-glob = ["**/*-stats.json"]
parallel = false
host-url = "https://compare.example.com/"
"#,
        )
        .unwrap();

        let options = ConfigLoader::load(temp.path()).unwrap();

        assert_eq!(options.threshold, 100);
        assert_eq!(options.file_glob, vec!["**/*-stats.json"]);
        assert!(!options.parallel);
        assert_eq!(
            options.host_url.as_deref(),
            Some("https://compare.example.com/")
        );
    }

    #[test]
    fn test_loader_returns_default_when_file_missing() {
        let temp = tempfile::tempdir().unwrap();
        let options = ConfigLoader::load(temp.path()).unwrap();
        assert_eq!(options, DiffOptions::default());
    }

    #[test]
    fn test_loader_fails_on_invalid_toml() {
        let fs = MockFileSystem::with_content("threshold = [not toml");
        let result = ConfigLoader::load_with_fs(Path::new("/project"), &fs);

        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("Failed to parse"));
    }

    #[test]
    fn test_loader_fails_on_invalid_settings() {
        let fs = MockFileSystem::with_content("max-workers = 0");
        let result = ConfigLoader::load_with_fs(Path::new("/project"), &fs);

        assert!(result.unwrap_err().to_string().contains("Invalid"));
    }

    #[test]
    fn test_loader_propagates_read_errors() {
        let fs = MockFileSystem {
            file_content: None,
            should_fail_read: true,
        };
        let result = ConfigLoader::load_with_fs(Path::new("/project"), &fs);

        assert!(result.unwrap_err().to_string().contains("Failed to read"));
    }
}
