//! Shared helpers for resolving which package a command operates on.

use crate::config::Environment;
use crate::manifest::{Manifest, find_manifest_with_optional};
use crate::package::Package;
use anyhow::Result;
use std::path::PathBuf;
use std::sync::Arc;

/// Loads the package a command should act on.
///
/// `--global` targets the environment's own package at `<env.home>/package.json`
/// (created on first use) rather than a project; otherwise `manifest_path`
/// (if given) or an upward search from the current directory resolves the
/// project manifest (spec.md §4.2).
pub fn load_target(manifest_path: Option<PathBuf>, global: bool, env: Arc<Environment>) -> Result<Package> {
    if global {
        env.ensure()?;
        let dir = env.home.clone();
        let manifest_file = dir.join(crate::manifest::MANIFEST_FILE_NAME);
        if manifest_file.exists() {
            let info = Manifest::load(&manifest_file)?;
            return Ok(Package { dir, info, env, parent: None });
        }
        return Package::init(&dir, false, env);
    }

    let manifest_file = find_manifest_with_optional(manifest_path)?;
    let dir = manifest_file.parent().unwrap_or_else(|| std::path::Path::new(".")).to_path_buf();
    let info = Manifest::load(&manifest_file)?;
    Ok(Package { dir, info, env, parent: None })
}
