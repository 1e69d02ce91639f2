//! Test assertion helpers
//!
//! Result buckets are logically sets, so tests look entries up by name
//! instead of relying on position.

#![allow(dead_code)]

use bundle_stats_diff::diff::{AssetStat, FileDiffResult};

/// Find the result for a stats file, failing the test with the names that
/// were present when it is missing
pub fn find_result<'a>(results: &'a [FileDiffResult], name: &str) -> &'a FileDiffResult {
    results.iter().find(|r| r.name == name).unwrap_or_else(|| {
        let names: Vec<&str> = results.iter().map(|r| r.name.as_str()).collect();
        panic!("No result named {} among {:?}", name, names)
    })
}

/// Assert that a bucket holds exactly these assets, in any order
pub fn assert_asset_names(bucket: &[AssetStat], expected: &[&str]) {
    let mut actual: Vec<&str> = bucket.iter().map(|s| s.asset_name.as_str()).collect();
    let mut expected = expected.to_vec();
    actual.sort_unstable();
    expected.sort_unstable();
    assert_eq!(actual, expected, "Asset bucket mismatch");
}
