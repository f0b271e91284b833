//! Semver range parsing and best-tag selection.
//!
//! Narrowed from the teacher's `version::constraints` (which also models bare
//! Git refs as a constraint kind) to the two forms spec.md actually needs: a
//! semver range matched against a remote's tags, and an exact ref that the
//! Fetcher checks out without any matching logic at all.

use semver::{Version, VersionReq};

/// Parses a `version` range string (e.g. `~1.1.7`, `^2.0.0`, `>=1.0.0, <2.0.0`)
/// into a [`VersionReq`]. Tolerates a leading `v` the way tags commonly do,
/// even though ranges rarely carry one.
pub fn parse_range(range: &str) -> Result<VersionReq, semver::Error> {
    let trimmed = range.trim();
    VersionReq::parse(trimmed)
}

/// Strips an optional leading `v` from a tag and parses the remainder as a
/// [`Version`]. Tags that aren't valid semver (after stripping) are skipped
/// by callers, not treated as an error — a repository may have non-version
/// tags alongside release tags.
pub fn parse_tag(tag: &str) -> Option<Version> {
    let stripped = tag.strip_prefix('v').unwrap_or(tag);
    Version::parse(stripped).ok()
}

/// Finds the highest-semver tag among `tags` that satisfies `range`,
/// returning `(tag, version)`. This implements spec.md §4.3 step 2 for the
/// `version` case: "the Fetcher enumerates the remote's tags and picks the
/// highest semver match".
pub fn best_matching_tag<'a>(range: &VersionReq, tags: &'a [String]) -> Option<(&'a str, Version)> {
    tags.iter()
        .filter_map(|tag| parse_tag(tag).map(|v| (tag.as_str(), v)))
        .filter(|(_, v)| range.matches(v))
        .max_by(|(_, a), (_, b)| a.cmp(b))
}
