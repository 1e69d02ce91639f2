//! Friendly asset names
//!
//! Bundlers embed a content hash in emitted file names
//! (`app_aabbccddeeffgghhiijj.js`), so the same logical asset gets a new name
//! in every build. Stripping the hash lets two builds be compared asset by
//! asset.

use super::types::Artifact;
use regex::Regex;
use std::sync::OnceLock;

/// Delimiter between the logical name and the hash segment
const HASH_DELIMITER: &str = "_";

/// Hash segment lengths emitted by the supported build configurations
const HASH_LENGTHS: [usize; 2] = [20, 16];

/// Hash embedded in a secondary dot part, e.g. `search_init.min_7ba0dc2ea2246e82e8a5.js`
static DOT_PART_HASH_RE: OnceLock<Regex> = OnceLock::new();

fn dot_part_hash_re() -> &'static Regex {
    DOT_PART_HASH_RE.get_or_init(|| {
        // SAFETY: constant pattern, validated by the tests below.
        Regex::new(r"_[a-z0-9]{20}").expect("dot part hash regex is valid")
    })
}

fn is_hash_segment(segment: &str) -> bool {
    HASH_LENGTHS.contains(&segment.len())
        && segment
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit())
}

/// Split a file name into `(stem, extension)` the way path parsers do:
/// the extension is the last dot part, a leading dot is part of the stem.
fn split_extension(base: &str) -> (&str, &str) {
    match base.rfind('.') {
        Some(idx) if idx > 0 => base.split_at(idx),
        _ => (base, ""),
    }
}

/// Remove a build hash from a file name and drop its directory.
///
/// Two heuristics are tried in order:
/// 1. the last `_`-separated segment of the first dot part is a hash
///    (`app_<hash>.js` becomes `app.js`);
/// 2. otherwise a `_<hash>` inside the second dot part is removed
///    (`init.min_<hash>.js` becomes `init.min.js`).
///
/// Names that match neither come back with only the directory stripped.
/// Stacked hashes (`app_<hash>_<hash>.js`) are removed one per pass until
/// nothing changes, so the result is stable under repeated calls.
///
/// # Examples
///
/// ```
/// use bundle_stats_diff::stats::remove_hash_from_name;
///
/// assert_eq!(remove_hash_from_name("js/app_aabbccddeeffgghhiijj.js"), "app.js");
/// assert_eq!(remove_hash_from_name("index.d.ts"), "index.d.ts");
/// ```
pub fn remove_hash_from_name(name: &str) -> String {
    let mut current = strip_hash_once(name);
    loop {
        // every pass that changes the name shortens it
        let next = strip_hash_once(&current);
        if next == current {
            return current;
        }
        current = next;
    }
}

fn strip_hash_once(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
    let (stem, ext) = split_extension(base);
    let (dot_prefix, stem) = match stem.strip_prefix('.') {
        Some(rest) => (".", rest),
        None => ("", stem),
    };

    let mut dot_parts = stem.split('.');
    let first = dot_parts.next().unwrap_or_default();
    let second = dot_parts.next();
    let rest: Vec<&str> = dot_parts.collect();

    let segments: Vec<&str> = first.split(HASH_DELIMITER).collect();
    let first_part = match segments.split_last() {
        Some((last, head)) if !head.is_empty() && is_hash_segment(last) => {
            head.join(HASH_DELIMITER)
        }
        _ => first.to_string(),
    };

    let second_part = match second {
        Some(part) if first_part == first => dot_part_hash_re().replace(part, "").into_owned(),
        Some(part) => part.to_string(),
        None => String::new(),
    };

    let mut parts: Vec<&str> = Vec::with_capacity(rest.len() + 2);
    parts.push(&first_part);
    parts.push(&second_part);
    parts.extend(rest);

    let joined = parts
        .into_iter()
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(".");
    format!("{}{}{}", dot_prefix, joined, ext)
}

/// Readable name of an artifact, stable across builds.
///
/// Falls back to the artifact's chunk names, then chunk ids (each joined
/// with `+`) when the file name carries no recognizable hash, and finally to
/// the raw name.
pub fn friendly_asset_name(artifact: &Artifact) -> String {
    let without_hash = remove_hash_from_name(&artifact.name);
    if without_hash != artifact.name {
        return without_hash;
    }

    if !artifact.chunk_names.is_empty() {
        return artifact.chunk_names.join("+");
    }

    if !artifact.chunk_ids.is_empty() {
        return artifact
            .chunk_ids
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("+");
    }

    artifact.name.clone()
}

/// Copy of the artifact renamed to its friendly name
pub fn friendly_asset(artifact: &Artifact) -> Artifact {
    Artifact {
        name: friendly_asset_name(artifact),
        ..artifact.clone()
    }
}
