//! Error types for the diff engine
//!
//! Errors fall into three groups:
//! - per-pair input errors ([`DiffError::Io`], [`DiffError::Parse`]) that the
//!   orchestrator downgrades to a dropped pair so one bad file cannot sink a
//!   whole CI comparison;
//! - [`DiffError::DuplicateNames`], which rejects the pair it occurs in and
//!   is reported alongside the other pairs' results;
//! - run-level errors (manifests, patterns, discovery) that abort the run.
//!
//! # Examples
//!
//! ```no_run
//! use bundle_stats_diff::diff::{DiffOrchestrator, DiffRequest};
//!
//! let request = DiffRequest::new("baseline/", "candidate/");
//! match DiffOrchestrator::new().diff(&request) {
//!     Ok(results) => println!("{} changed files", results.with_differences.len()),
//!     Err(e) => {
//!         eprintln!("Diff failed: {}", e);
//!         std::process::exit(e.exit_code());
//!     }
//! }
//! ```

use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised while loading, pairing and diffing bundle stats
#[derive(Error, Debug)]
pub enum DiffError {
    /// Stats file could not be read
    #[error("Cannot read stats file {path}")]
    Io {
        /// File that failed
        path: PathBuf,
        #[source]
        /// IO error source
        source: io::Error,
    },

    /// Stats file content is not a stats object
    #[error("Cannot parse stats file {path}")]
    Parse {
        /// File that failed
        path: PathBuf,
        #[source]
        /// JSON error source
        source: serde_json::Error,
    },

    /// Friendly names collide within one side of a comparison
    #[error(
        "Duplicate asset names\n  baseline: {}\n  candidate: {}",
        .baseline.join(", "),
        .candidate.join(", ")
    )]
    DuplicateNames {
        /// Names duplicated in the baseline document
        baseline: Vec<String>,
        /// Names duplicated in the candidate document
        candidate: Vec<String>,
    },

    /// Remote artifact manifest could not be read
    #[error("Cannot read remote artifact manifest {path}")]
    ManifestIo {
        /// Manifest path
        path: PathBuf,
        #[source]
        /// IO error source
        source: io::Error,
    },

    /// Remote artifact manifest is not a list of `{name, url}` objects
    #[error("Cannot parse remote artifact manifest {path}")]
    ManifestParse {
        /// Manifest path
        path: PathBuf,
        #[source]
        /// JSON error source
        source: serde_json::Error,
    },

    /// A file or asset filter glob does not compile
    #[error("Invalid glob pattern: '{pattern}'")]
    InvalidPattern {
        /// Offending pattern, including any `!` prefix
        pattern: String,
        #[source]
        /// Glob error source
        source: globset::Error,
    },

    /// Stats directory could not be walked
    #[error("Cannot list stats directory {dir}")]
    Discovery {
        /// Directory being walked
        dir: PathBuf,
        #[source]
        /// Walk error source
        source: walkdir::Error,
    },

    /// Worker pool could not be started
    #[error("Cannot start diff workers")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),

    /// Some stats files were rejected; the rest of the run completed
    #[error("Rejected {} stats file(s): {}", .names.len(), .names.join(", "))]
    RejectedFiles {
        /// Base names of the rejected files
        names: Vec<String>,
    },
}

impl DiffError {
    /// Shorthand for [`DiffError::Io`]
    pub fn io(path: &Path, source: io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    /// Whether the pair being diffed can simply be dropped.
    ///
    /// Unreadable or malformed stats files are left out of the result;
    /// other errors raised while diffing a pair reject it visibly.
    pub fn is_pair_recoverable(&self) -> bool {
        matches!(self, Self::Io { .. } | Self::Parse { .. })
    }

    /// Error message including every cause in the chain
    pub fn full_message(&self) -> String {
        let mut message = self.to_string();
        let mut source = std::error::Error::source(self);
        while let Some(err) = source {
            message.push_str(": ");
            message.push_str(&err.to_string());
            source = err.source();
        }
        message
    }

    /// Actionable suggestion for resolving this error
    ///
    /// # Examples
    ///
    /// ```
    /// use bundle_stats_diff::error::DiffError;
    ///
    /// let error = DiffError::DuplicateNames {
    ///     baseline: vec!["app.js".to_string()],
    ///     candidate: vec![],
    /// };
    /// assert!(error.suggestion().unwrap().contains("asset filter"));
    /// ```
    pub fn suggestion(&self) -> Option<String> {
        match self {
            Self::Io { path, .. } => Some(format!(
                "Check that {} exists and is readable",
                path.display()
            )),
            Self::Parse { .. } => Some(
                "Stats files must be a JSON object with an `assets` array (optionally gzipped)"
                    .to_string(),
            ),
            Self::DuplicateNames { .. } => Some(
                "Several assets share a name once hashes are stripped. Narrow the asset filter \
                 (e.g. '!*.map') or give the chunks distinct names"
                    .to_string(),
            ),
            Self::ManifestIo { path, .. } => Some(format!(
                "Check that the manifest {} exists and is readable",
                path.display()
            )),
            Self::ManifestParse { .. } => Some(
                "Remote artifact manifests must be a JSON array of {\"name\", \"url\"} objects"
                    .to_string(),
            ),
            Self::InvalidPattern { .. } => Some(
                "Use glob syntax such as '*.json', '**/stats/*.json' or '!*.map'".to_string(),
            ),
            Self::Discovery { dir, .. } => Some(format!(
                "Check that {} is a readable directory",
                dir.display()
            )),
            Self::WorkerPool(_) => Some("Retry with --sequential".to_string()),
            Self::RejectedFiles { .. } => Some(
                "See `failedFiles` in the output for the colliding asset names".to_string(),
            ),
        }
    }

    /// Exit code following sysexits.h conventions
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Io { .. } | Self::ManifestIo { .. } | Self::Discovery { .. } => 74, // EX_IOERR
            Self::Parse { .. }
            | Self::ManifestParse { .. }
            | Self::DuplicateNames { .. }
            | Self::RejectedFiles { .. } => 65, // EX_DATAERR
            Self::InvalidPattern { .. } => 64, // EX_USAGE
            Self::WorkerPool(_) => 71,         // EX_OSERR
        }
    }
}

/// Error formatter with colors and structured output
pub struct ErrorFormatter;

impl ErrorFormatter {
    /// Format error with its cause chain and a suggestion
    pub fn format(error: &anyhow::Error) -> String {
        use console::style;

        let mut output = String::new();

        output.push_str(&format!("{} {}\n", style("error:").red().bold(), error));

        let mut source = error.source();
        let mut indent = 1;
        while let Some(err) = source {
            output.push_str(&format!(
                "{}{} {}\n",
                "  ".repeat(indent),
                style("caused by:").yellow(),
                err
            ));
            source = err.source();
            indent += 1;
        }

        if let Some(suggestion) = error
            .downcast_ref::<DiffError>()
            .and_then(DiffError::suggestion)
        {
            output.push_str(&format!(
                "\n{} {}\n",
                style("help:").cyan().bold(),
                suggestion
            ));
        }

        output
    }

    /// Get exit code from error
    pub fn exit_code(error: &anyhow::Error) -> i32 {
        error
            .downcast_ref::<DiffError>()
            .map_or(1, DiffError::exit_code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_error() -> serde_json::Error {
        serde_json::from_str::<serde_json::Value>("{").unwrap_err()
    }

    fn all_variants() -> Vec<DiffError> {
        vec![
            DiffError::io(
                Path::new("a.json"),
                io::Error::new(io::ErrorKind::NotFound, "missing"),
            ),
            DiffError::Parse {
                path: PathBuf::from("a.json"),
                source: parse_error(),
            },
            DiffError::DuplicateNames {
                baseline: vec!["app.js".to_string()],
                candidate: vec![],
            },
            DiffError::ManifestIo {
                path: PathBuf::from("m.json"),
                source: io::Error::other("denied"),
            },
            DiffError::ManifestParse {
                path: PathBuf::from("m.json"),
                source: parse_error(),
            },
            DiffError::InvalidPattern {
                pattern: "a[".to_string(),
                source: globset::Glob::new("a[").unwrap_err(),
            },
            DiffError::RejectedFiles {
                names: vec!["dup.json".to_string()],
            },
        ]
    }

    #[test]
    fn test_only_io_and_parse_are_pair_recoverable() {
        let recoverable: Vec<bool> = all_variants()
            .iter()
            .map(DiffError::is_pair_recoverable)
            .collect();
        assert_eq!(recoverable, vec![true, true, false, false, false, false, false]);
    }

    #[test]
    fn test_all_variants_have_suggestions_and_exit_codes() {
        for err in all_variants() {
            let suggestion = err.suggestion();
            assert!(suggestion.is_some(), "{:?} should have a suggestion", err);
            assert!(!suggestion.unwrap().is_empty());

            let code = err.exit_code();
            assert!(code > 0 && code < 256, "{:?} exit code {}", err, code);
        }
    }

    #[test]
    fn test_io_error_names_path_and_cause() {
        let err = DiffError::io(
            Path::new("dist/stats.json"),
            io::Error::new(io::ErrorKind::NotFound, "no such file"),
        );
        assert!(err.to_string().contains("dist/stats.json"));

        let full = err.full_message();
        assert!(full.contains("dist/stats.json"));
        assert!(full.contains("no such file"));
    }

    #[test]
    fn test_duplicate_names_lists_both_sides() {
        let err = DiffError::DuplicateNames {
            baseline: vec!["app.js".to_string(), "vendor.js".to_string()],
            candidate: vec!["main.css".to_string()],
        };
        let msg = err.to_string();
        assert!(msg.contains("baseline: app.js, vendor.js"));
        assert!(msg.contains("candidate: main.css"));
    }

    #[test]
    fn test_rejected_files_names_each_file() {
        let err = DiffError::RejectedFiles {
            names: vec!["a.json".to_string(), "b.json".to_string()],
        };
        assert_eq!(err.to_string(), "Rejected 2 stats file(s): a.json, b.json");
        assert_eq!(err.exit_code(), 65);
    }

    #[test]
    fn test_formatter_includes_cause_and_help() {
        let err = anyhow::Error::new(DiffError::ManifestParse {
            path: PathBuf::from("baseline-manifest.json"),
            source: parse_error(),
        });

        let formatted = ErrorFormatter::format(&err);
        assert!(formatted.contains("baseline-manifest.json"));
        assert!(formatted.contains("caused by"));
        assert!(formatted.contains("help"));
        assert_eq!(ErrorFormatter::exit_code(&err), 65);
    }

    #[test]
    fn test_formatter_generic_error_exit_code() {
        let err = anyhow::anyhow!("something else");
        assert_eq!(ErrorFormatter::exit_code(&err), 1);
        assert!(!ErrorFormatter::format(&err).contains("help"));
    }
}
