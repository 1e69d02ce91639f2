//! Asset-level comparison of two stats documents

use super::key_asset::KeyAsset;
use super::pairing::pair_by_name;
use super::types::{AssetStat, ChangedStats, DiffStats, SIGNIFICANT_CHANGE_THRESHOLD};
use crate::error::DiffError;
use crate::stats::names::friendly_asset_name;
use crate::stats::pattern::{matches_pattern, PatternFilter};
use crate::stats::types::{Artifact, StatsDocument};
use std::collections::{HashMap, HashSet};

/// Compares the assets of a baseline and a candidate stats document
///
/// # Examples
///
/// ```
/// use bundle_stats_diff::diff::AssetDiffer;
/// use bundle_stats_diff::stats::{Artifact, StatsDocument};
///
/// let baseline = StatsDocument::from_assets(vec![Artifact::new("app_aabbccddeeffgghhiijj.js", 1000)]);
/// let candidate = StatsDocument::from_assets(vec![Artifact::new("app_112233445566778899zz.js", 1050)]);
///
/// let stats = AssetDiffer::new().diff(&baseline, &candidate)?;
/// assert_eq!(stats.changed_stats.increased[0].asset_name, "app.js");
/// assert_eq!(stats.changed_stats.increased[0].size_diff, 50);
/// # Ok::<(), bundle_stats_diff::error::DiffError>(())
/// ```
#[derive(Debug, Clone)]
pub struct AssetDiffer {
    threshold: u64,
    filter: Option<PatternFilter>,
}

impl Default for AssetDiffer {
    fn default() -> Self {
        Self::new()
    }
}

impl AssetDiffer {
    /// Differ with the default significance threshold and no filter
    pub fn new() -> Self {
        Self {
            threshold: SIGNIFICANT_CHANGE_THRESHOLD,
            filter: None,
        }
    }

    /// Change the default significance threshold (bytes)
    pub fn with_threshold(mut self, threshold: u64) -> Self {
        self.threshold = threshold;
        self
    }

    /// Restrict the comparison to assets whose friendly name matches
    pub fn with_filter(mut self, filter: Option<PatternFilter>) -> Self {
        self.filter = filter;
        self
    }

    /// Default significance threshold in bytes
    pub fn threshold(&self) -> u64 {
        self.threshold
    }

    /// Diff two documents.
    ///
    /// # Errors
    ///
    /// [`DiffError::DuplicateNames`] when two in-scope assets on the same
    /// side share a friendly name.
    pub fn diff(
        &self,
        baseline: &StatsDocument,
        candidate: &StatsDocument,
    ) -> Result<DiffStats, DiffError> {
        let baseline = in_scope(&baseline.assets, self.filter.as_ref());
        let candidate = in_scope(&candidate.assets, self.filter.as_ref());

        let baseline_dups = duplicates(&baseline);
        let candidate_dups = duplicates(&candidate);
        if !baseline_dups.is_empty() || !candidate_dups.is_empty() {
            return Err(DiffError::DuplicateNames {
                baseline: baseline_dups,
                candidate: candidate_dups,
            });
        }

        let stats = pair_by_name(baseline, candidate)
            .into_iter()
            .map(|(name, a, b)| self.compare(name, a, b))
            .collect();
        Ok(partition(stats))
    }

    fn compare(
        &self,
        asset_name: String,
        baseline: Option<&Artifact>,
        candidate: Option<&Artifact>,
    ) -> AssetStat {
        let key = candidate.map_or(KeyAsset::Regular, |c| {
            KeyAsset::from_chunk_names(&c.chunk_names)
        });
        let (baseline_size, threshold) = match key.budget() {
            Some(budget) => (budget.target, budget.threshold),
            None => (baseline.map_or(0, |a| a.size), self.threshold),
        };
        let candidate_size = candidate.map_or(0, |b| b.size);

        let raw = i128::from(candidate_size) - i128::from(baseline_size);
        let size_diff = if raw.unsigned_abs() > u128::from(threshold) {
            raw.clamp(i128::from(i64::MIN), i128::from(i64::MAX)) as i64
        } else {
            0
        };
        let is_added = baseline_size == 0;

        AssetStat {
            asset_name,
            is_key_asset: key.is_key(),
            has_target: key.budget().is_some(),
            baseline_asset_size: baseline_size,
            candidate_asset_size: candidate_size,
            size_diff,
            is_size_increase: size_diff > 0,
            is_size_reduction: size_diff < 0,
            is_added,
            is_removed: candidate_size == 0 && !is_added,
        }
    }
}

/// Diff two documents with the default threshold.
///
/// Shorthand for `AssetDiffer::new().with_filter(..).diff(..)`.
pub fn diff_assets(
    baseline: &StatsDocument,
    candidate: &StatsDocument,
    filter: Option<&PatternFilter>,
) -> Result<DiffStats, DiffError> {
    AssetDiffer::new()
        .with_filter(filter.cloned())
        .diff(baseline, candidate)
}

fn in_scope<'a>(
    assets: &'a [Artifact],
    filter: Option<&PatternFilter>,
) -> Vec<(String, &'a Artifact)> {
    assets
        .iter()
        .map(|asset| (friendly_asset_name(asset), asset))
        .filter(|(name, _)| matches_pattern(filter, name))
        .collect()
}

/// Names occurring more than once, each listed once in first-seen order
fn duplicates(named: &[(String, &Artifact)]) -> Vec<String> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for (name, _) in named {
        *counts.entry(name.as_str()).or_default() += 1;
    }

    let mut reported = HashSet::new();
    named
        .iter()
        .map(|(name, _)| name.as_str())
        .filter(|name| counts[name] > 1 && reported.insert(*name))
        .map(str::to_string)
        .collect()
}

fn partition(stats: Vec<AssetStat>) -> DiffStats {
    let mut diff = DiffStats::default();
    for stat in stats {
        if stat.is_added {
            diff.new_assets.push(stat);
        } else if stat.is_removed {
            diff.removed_assets.push(stat);
        } else if stat.size_diff > 0 {
            diff.changed_stats.increased.push(stat);
        } else if stat.size_diff < 0 {
            diff.changed_stats.decreased.push(stat);
        } else {
            diff.unchanged_stats.push(stat);
        }
    }

    let ChangedStats {
        increased,
        decreased,
    } = &diff.changed_stats;
    diff.is_changed = !(diff.new_assets.is_empty()
        && diff.removed_assets.is_empty()
        && increased.is_empty()
        && decreased.is_empty());
    diff
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::types::ChunkId;
    use proptest::prelude::*;

    fn doc(assets: Vec<Artifact>) -> StatsDocument {
        StatsDocument::from_assets(assets)
    }

    #[test]
    fn test_significant_increase_across_hashes() {
        let baseline = doc(vec![Artifact::new("app_aabbccddeeffgghhiijj.js", 1000)]);
        let candidate = doc(vec![Artifact::new("app_112233445566778899zz.js", 1050)]);

        let stats = AssetDiffer::new().diff(&baseline, &candidate).unwrap();

        assert!(stats.is_changed);
        assert_eq!(stats.changed_stats.increased.len(), 1);
        let stat = &stats.changed_stats.increased[0];
        assert_eq!(stat.asset_name, "app.js");
        assert_eq!(stat.size_diff, 50);
        assert!(stat.is_size_increase);
        assert!(!stat.is_size_reduction);
        assert!(stats.unchanged_stats.is_empty());
    }

    #[test]
    fn test_insignificant_change_is_unchanged() {
        let baseline = doc(vec![Artifact::new("app_aabbccddeeffgghhiijj.js", 1000)]);
        let candidate = doc(vec![Artifact::new("app_112233445566778899zz.js", 1010)]);

        let stats = AssetDiffer::new().diff(&baseline, &candidate).unwrap();

        assert!(!stats.is_changed);
        assert_eq!(stats.unchanged_stats.len(), 1);
        let stat = &stats.unchanged_stats[0];
        assert_eq!(stat.size_diff, 0);
        assert!(!stat.is_size_increase);
        assert!(!stat.is_size_reduction);
        assert_eq!(stat.baseline_asset_size, 1000);
        assert_eq!(stat.candidate_asset_size, 1010);
    }

    #[test]
    fn test_decrease_and_threshold_boundary() {
        let baseline = doc(vec![Artifact::new("a.js", 1000), Artifact::new("b.js", 1000)]);
        let candidate = doc(vec![Artifact::new("a.js", 969), Artifact::new("b.js", 970)]);

        let stats = AssetDiffer::new().diff(&baseline, &candidate).unwrap();

        assert_eq!(stats.changed_stats.decreased.len(), 1);
        assert_eq!(stats.changed_stats.decreased[0].asset_name, "a.js");
        assert_eq!(stats.changed_stats.decreased[0].size_diff, -31);
        assert_eq!(stats.unchanged_stats[0].asset_name, "b.js");
    }

    #[test]
    fn test_added_and_removed_assets() {
        let baseline = doc(vec![Artifact::new("old.js", 500), Artifact::new("same.js", 10)]);
        let candidate = doc(vec![Artifact::new("same.js", 10), Artifact::new("new.js", 700)]);

        let stats = AssetDiffer::new().diff(&baseline, &candidate).unwrap();

        assert!(stats.is_changed);
        assert_eq!(stats.new_assets.len(), 1);
        assert_eq!(stats.new_assets[0].asset_name, "new.js");
        assert!(stats.new_assets[0].is_added);
        assert!(!stats.new_assets[0].is_removed);
        assert_eq!(stats.new_assets[0].size_diff, 700);

        assert_eq!(stats.removed_assets.len(), 1);
        assert_eq!(stats.removed_assets[0].asset_name, "old.js");
        assert!(stats.removed_assets[0].is_removed);
        assert_eq!(stats.removed_assets[0].size_diff, -500);

        assert_eq!(stats.unchanged_stats.len(), 1);
    }

    #[test]
    fn test_empty_baseline_marks_everything_added() {
        let candidate = doc(vec![Artifact::new("a.js", 10), Artifact::new("b.css", 0)]);

        let stats = AssetDiffer::new()
            .diff(&StatsDocument::default(), &candidate)
            .unwrap();

        assert_eq!(stats.new_assets.len(), 2);
        assert!(stats.new_assets.iter().all(|s| s.is_added && !s.is_removed));
    }

    #[test]
    fn test_key_asset_budget_replaces_baseline_and_threshold() {
        let baseline = doc(vec![Artifact::new("main_aabbccddeeffgghhiijj.js", 4000)]);
        let candidate = doc(vec![Artifact::new("main_112233445566778899zz.js", 5050)
            .with_chunk_names(["⭐ main 5000 100"])]);

        let stats = AssetDiffer::new().diff(&baseline, &candidate).unwrap();

        let stat = &stats.unchanged_stats[0];
        assert_eq!(stat.asset_name, "main.js");
        assert!(stat.is_key_asset);
        assert!(stat.has_target);
        assert_eq!(stat.baseline_asset_size, 5000);
        assert_eq!(stat.size_diff, 0);
    }

    #[test]
    fn test_key_asset_budget_exceeded() {
        let baseline = doc(vec![Artifact::new("main_aabbccddeeffgghhiijj.js", 5000)]);
        let candidate = doc(vec![Artifact::new("main_112233445566778899zz.js", 5200)
            .with_chunk_names(["⭐ main 5000 100"])]);

        let stats = AssetDiffer::new().diff(&baseline, &candidate).unwrap();

        let stat = &stats.changed_stats.increased[0];
        assert_eq!(stat.size_diff, 200);
        assert!(stat.is_size_increase);
    }

    #[test]
    fn test_key_asset_without_budget_uses_real_baseline() {
        let baseline = doc(vec![Artifact::new("main_aabbccddeeffgghhiijj.js", 1000)]);
        let candidate = doc(vec![
            Artifact::new("main_112233445566778899zz.js", 1100).with_chunk_names(["⭐ main"])
        ]);

        let stats = AssetDiffer::new().diff(&baseline, &candidate).unwrap();

        let stat = &stats.changed_stats.increased[0];
        assert!(stat.is_key_asset);
        assert!(!stat.has_target);
        assert_eq!(stat.baseline_asset_size, 1000);
        assert_eq!(stat.size_diff, 100);
    }

    #[test]
    fn test_duplicate_friendly_names_fail_with_both_sides() {
        let baseline = doc(vec![
            Artifact::new("app_aabbccddeeffgghhiijj.js", 1),
            Artifact::new("app_112233445566778899zz.js", 2),
        ]);
        let candidate = doc(vec![Artifact::new("vendor.js", 1)]);

        let err = AssetDiffer::new().diff(&baseline, &candidate).unwrap_err();
        match err {
            DiffError::DuplicateNames {
                baseline,
                candidate,
            } => {
                assert_eq!(baseline, vec!["app.js".to_string()]);
                assert!(candidate.is_empty());
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_filter_drops_assets_before_duplicate_check() {
        let filter = PatternFilter::for_names(["!*.map"]).unwrap();
        let baseline = doc(vec![
            Artifact::new("app.js", 100),
            Artifact::new("app.js.map", 1),
            Artifact::new("app.js.map", 2),
        ]);
        let candidate = doc(vec![Artifact::new("app.js", 100)]);

        let stats = diff_assets(&baseline, &candidate, Some(&filter)).unwrap();
        assert_eq!(stats.unchanged_stats.len(), 1);
        assert!(!stats.is_changed);
    }

    #[test]
    fn test_identical_documents_are_unchanged() {
        let assets = vec![
            Artifact::new("main_aabbccddeeffgghhiijj.js", 4000).with_chunk_names(["⭐ main"]),
            Artifact::new("vendor_0123456789abcdef.js", 90000),
            Artifact::new("styles.css", 120),
            Artifact::new("3f9a.js", 70).with_chunk_ids([ChunkId::Number(3)]),
        ];
        let baseline = doc(assets.clone());
        let candidate = doc(assets);

        let stats = AssetDiffer::new().diff(&baseline, &candidate).unwrap();

        assert!(!stats.is_changed);
        assert!(stats.new_assets.is_empty());
        assert!(stats.removed_assets.is_empty());
        assert!(stats.changed_stats.increased.is_empty());
        assert!(stats.changed_stats.decreased.is_empty());
        let names: Vec<&str> = stats
            .unchanged_stats
            .iter()
            .map(|s| s.asset_name.as_str())
            .collect();
        assert_eq!(names, vec!["main.js", "vendor.js", "styles.css", "3"]);
        assert!(stats.unchanged_stats.iter().all(|s| s.size_diff == 0));
    }

    #[test]
    fn test_custom_threshold() {
        let baseline = doc(vec![Artifact::new("a.js", 1000)]);
        let candidate = doc(vec![Artifact::new("a.js", 1050)]);

        let stats = AssetDiffer::new()
            .with_threshold(100)
            .diff(&baseline, &candidate)
            .unwrap();
        assert_eq!(stats.unchanged_stats.len(), 1);
    }

    #[test]
    fn test_duplicates_reported_once_in_order() {
        let a = Artifact::new("x", 1);
        let named = vec![
            ("b".to_string(), &a),
            ("a".to_string(), &a),
            ("b".to_string(), &a),
            ("a".to_string(), &a),
            ("b".to_string(), &a),
        ];
        assert_eq!(duplicates(&named), vec!["b".to_string(), "a".to_string()]);
    }

    proptest! {
        #[test]
        fn prop_small_deltas_report_zero(
            base in 1u64..1_000_000,
            delta in -30i64..=30,
        ) {
            let candidate_size = (base as i64 + delta).max(1) as u64;
            prop_assume!(candidate_size.abs_diff(base) <= SIGNIFICANT_CHANGE_THRESHOLD);

            let baseline = doc(vec![Artifact::new("app.js", base)]);
            let candidate = doc(vec![Artifact::new("app.js", candidate_size)]);
            let stats = AssetDiffer::new().diff(&baseline, &candidate).unwrap();

            prop_assert_eq!(stats.unchanged_stats.len(), 1);
            let stat = &stats.unchanged_stats[0];
            prop_assert_eq!(stat.size_diff, 0);
            prop_assert!(!stat.is_size_increase && !stat.is_size_reduction);
        }

        #[test]
        fn prop_every_asset_lands_in_exactly_one_bucket(
            sizes in prop::collection::vec((0u64..3000, 0u64..3000), 0..20),
        ) {
            let baseline = doc(sizes.iter().enumerate()
                .map(|(i, (a, _))| Artifact::new(format!("a{}.js", i), *a)).collect());
            let candidate = doc(sizes.iter().enumerate()
                .map(|(i, (_, b))| Artifact::new(format!("a{}.js", i), *b)).collect());

            let stats = AssetDiffer::new().diff(&baseline, &candidate).unwrap();
            let total = stats.new_assets.len()
                + stats.removed_assets.len()
                + stats.changed_stats.increased.len()
                + stats.changed_stats.decreased.len()
                + stats.unchanged_stats.len();
            prop_assert_eq!(total, sizes.len());
        }
    }
}
