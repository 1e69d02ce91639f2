//! Include/exclude glob filters
//!
//! A filter is an ordered list of globs. A plain glob includes what it
//! matches, a `!`-prefixed glob excludes it again, and later globs win over
//! earlier ones:
//!
//! ```
//! use bundle_stats_diff::stats::PatternFilter;
//!
//! let filter = PatternFilter::for_names(["*", "!*.map", "!*.d.ts"])?;
//! assert!(filter.is_match("bar.js"));
//! assert!(!filter.is_match("bar.js.map"));
//! # Ok::<(), bundle_stats_diff::error::DiffError>(())
//! ```

use crate::error::DiffError;
use globset::{GlobBuilder, GlobMatcher};

#[derive(Debug, Clone)]
struct Rule {
    matcher: GlobMatcher,
    negated: bool,
}

/// Ordered include/exclude glob list
#[derive(Debug, Clone)]
pub struct PatternFilter {
    rules: Vec<Rule>,
}

impl PatternFilter {
    /// Filter for asset names. `*` also matches `/`, so `*.js` selects
    /// `js/app.js`.
    pub fn for_names<I, S>(patterns: I) -> Result<Self, DiffError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::compile(patterns, false)
    }

    /// Filter for relative file paths. `*` stays within one path segment;
    /// use `**` to cross directories.
    pub fn for_paths<I, S>(patterns: I) -> Result<Self, DiffError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::compile(patterns, true)
    }

    fn compile<I, S>(patterns: I, literal_separator: bool) -> Result<Self, DiffError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut rules = Vec::new();
        for pattern in patterns {
            let pattern = pattern.as_ref();
            let (glob, negated) = match pattern.strip_prefix('!') {
                Some(rest) => (rest, true),
                None => (pattern, false),
            };
            let matcher = GlobBuilder::new(glob)
                .literal_separator(literal_separator)
                .backslash_escape(true)
                .build()
                .map_err(|source| DiffError::InvalidPattern {
                    pattern: pattern.to_string(),
                    source,
                })?
                .compile_matcher();
            rules.push(Rule { matcher, negated });
        }
        Ok(Self { rules })
    }

    /// Whether the filter has no patterns at all
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Test a name or path against the filter.
    ///
    /// An empty filter matches everything. A filter that starts with an
    /// exclusion starts from "included", so `["!*.map"]` means "everything
    /// except source maps".
    pub fn is_match(&self, input: &str) -> bool {
        let Some(first) = self.rules.first() else {
            return true;
        };

        let mut matched = first.negated;
        for rule in &self.rules {
            if rule.negated == matched && rule.matcher.is_match(input) {
                matched = !rule.negated;
            }
        }
        matched
    }
}

/// Test `input` against an optional filter; no filter matches everything.
pub fn matches_pattern(filter: Option<&PatternFilter>, input: &str) -> bool {
    filter.is_none_or(|f| f.is_match(input))
}
