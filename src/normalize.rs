//! Merging and normalization of raw subdomain candidates.
//!
//! This is the canonical dedupe point of the pipeline: every downstream
//! stage consumes the normalized host set, never raw enumerator output.

use std::collections::BTreeSet;

/// Normalize a single raw candidate line: trim whitespace, strip one
/// trailing dot, lowercase. Returns `None` for blank lines.
pub fn normalize_candidate(line: &str) -> Option<String> {
    let trimmed = line.trim();
    let trimmed = trimmed.strip_suffix('.').unwrap_or(trimmed);
    if trimmed.is_empty() {
        return None;
    }
    Some(trimmed.to_lowercase())
}

/// Merge the concatenated raw-candidate accumulator into the sorted,
/// deduplicated host set.
pub fn normalize_candidates(raw: &str) -> Vec<String> {
    let set: BTreeSet<String> = raw.lines().filter_map(normalize_candidate).collect();
    set.into_iter().collect()
}
