//! Manifest discovery: walking up a directory tree to find `package.json`.
//!
//! Three entry points, the same shape as the teacher's
//! `manifest::helpers::{find_manifest, find_manifest_from,
//! find_manifest_with_optional}`.

use crate::core::GpkError;
use crate::manifest::MANIFEST_FILE_NAME;
use anyhow::{Context, Result};
use std::path::PathBuf;

/// Finds the manifest by searching up from the current working directory.
pub fn find_manifest() -> Result<PathBuf> {
    let current = std::env::current_dir().context(
        "cannot determine current working directory; this may indicate a permission issue",
    )?;
    find_manifest_from(current)
}

/// Searches up from `start` until a `package.json` is found, or fails with
/// [`GpkError::NoManifest`] once the filesystem root is reached (spec.md
/// §4.2: `fromDirectory(dir, walk: true, ...)`).
pub fn find_manifest_from(mut current: PathBuf) -> Result<PathBuf> {
    loop {
        let candidate = current.join(MANIFEST_FILE_NAME);
        if candidate.exists() {
            return Ok(candidate);
        }
        if !current.pop() {
            return Err(GpkError::NoManifest.into());
        }
    }
}

/// Uses `explicit_path` if given (requiring it to exist), otherwise searches
/// up from the current directory. Corresponds to spec.md §4.2's `walk: false`
/// mode when a caller already knows the directory.
pub fn find_manifest_with_optional(explicit_path: Option<PathBuf>) -> Result<PathBuf> {
    match explicit_path {
        Some(path) => {
            let candidate =
                if path.is_dir() { path.join(MANIFEST_FILE_NAME) } else { path };
            if candidate.exists() {
                Ok(candidate)
            } else {
                Err(GpkError::NoManifest.into())
            }
        }
        None => find_manifest(),
    }
}
