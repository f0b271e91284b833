//! Remote Spec Parser.
//!
//! Turns a dependency source string plus the enclosing manifest's `remotes`
//! alias table into a normalized [`RemoteDescriptor`] (spec.md §4.1). This is
//! a pure function of its two inputs — no filesystem or network access, no
//! process-wide alias table, unlike the teacher's stateful `SourceManager`,
//! because spec.md §3 scopes alias lookup to a single manifest.

use crate::core::GpkError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A manifest's `remotes` table: short alias name → base URL.
pub type RemoteAliasTable = BTreeMap<String, String>;

/// The normalized output of resolving a dependency source string.
///
/// `version` and `branch` are never both non-null (spec.md §3's invariant);
/// the parser enforces this by construction rather than validating it after
/// the fact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteDescriptor {
    /// Absolute git URL, or `None` when the source was a pure version
    /// constraint with no remote supplied.
    pub git: Option<String>,
    /// A semver range expression, or `None`.
    pub version: Option<String>,
    /// A branch name, tag, or full commit hash, or `None`.
    pub branch: Option<String>,
}

impl RemoteDescriptor {
    fn with_git_and_fragment(git: String, fragment: Option<&str>) -> Self {
        let (version, branch) = interpret_fragment(fragment);
        Self { git: Some(git), version, branch }
    }
}

/// Parses `source` against `remotes`, resolving a local `file:` alias with an
/// empty path using `dependency_name` (spec.md §9's documented quirk).
///
/// Precedence, matching spec.md §4.1 and the "explicit scheme always wins"
/// note in §9: `git+...`, then `git://...`, then `http(s)://...` are checked
/// before alias-prefix lookup, so an alias literally named `git` or `https`
/// can never shadow those schemes.
pub fn resolve_remote(
    source: &str,
    remotes: &RemoteAliasTable,
    dependency_name: &str,
) -> Result<RemoteDescriptor, GpkError> {
    let trimmed = source.trim();

    if let Some(rest) = trimmed.strip_prefix("git+") {
        let (url, fragment) = split_fragment(rest);
        return Ok(RemoteDescriptor::with_git_and_fragment(url.to_string(), fragment));
    }

    if trimmed.starts_with("git://") || trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        let (url, fragment) = split_fragment(trimmed);
        return Ok(RemoteDescriptor::with_git_and_fragment(url.to_string(), fragment));
    }

    if let Some(colon) = trimmed.find(':') {
        let alias = &trimmed[..colon];
        let remainder = &trimmed[colon + 1..];
        return match remotes.get(alias) {
            Some(base) => {
                let (path, fragment) = split_fragment(remainder);
                let git = build_alias_url(base, path, dependency_name);
                Ok(RemoteDescriptor::with_git_and_fragment(git, fragment))
            }
            None => Err(GpkError::UnknownAlias { alias: alias.to_string() }),
        };
    }

    if is_bare_version_constraint(trimmed) {
        return Ok(RemoteDescriptor { git: None, version: Some(trimmed.to_string()), branch: None });
    }

    Err(GpkError::MalformedSource { input: trimmed.to_string() })
}

/// Splits `s` at its first `#`, returning `(before, Some(after))`, or
/// `(s, None)` if there is no fragment.
fn split_fragment(s: &str) -> (&str, Option<&str>) {
    match s.split_once('#') {
        Some((before, after)) => (before, Some(after)),
        None => (s, None),
    }
}

/// `semver:<range>` sets `version`; any other fragment is carried as
/// `branch` regardless of whether it looks like a commit hash, a `v`-tag, or
/// a plain branch name — the Fetcher tells those apart, not the parser
/// (spec.md §4.1).
fn interpret_fragment(fragment: Option<&str>) -> (Option<String>, Option<String>) {
    match fragment {
        None => (None, None),
        Some(f) => match f.strip_prefix("semver:") {
            Some(range) => (Some(range.to_string()), None),
            None => (None, Some(f.to_string())),
        },
    }
}

/// Joins an alias's base URL with a path per spec.md §4.1 rule 1.
///
/// A `file:` base is a local alias: the result is `<base-path>/<path>/.git`,
/// a bare-repo subdirectory convention. An empty `path` borrows the
/// dependency's own name (the `local:#...` quirk documented in spec.md §9).
/// Any other base is joined as `<base-url>/<path>.git`.
fn build_alias_url(base: &str, path: &str, dependency_name: &str) -> String {
    if let Some(base_path) = base.strip_prefix("file:") {
        let effective_path = if path.is_empty() { dependency_name } else { path };
        format!("{}/{}/.git", base_path.trim_end_matches('/'), effective_path)
    } else {
        format!("{}/{}.git", base.trim_end_matches('/'), path)
    }
}

fn is_bare_version_constraint(s: &str) -> bool {
    s.starts_with('~')
        || s.starts_with('^')
        || s.starts_with(">=")
        || s.starts_with('*')
        || s.chars().next().is_some_and(|c| c.is_ascii_digit())
}
