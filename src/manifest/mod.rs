//! Manifest (`package.json`) parsing and validation.
//!
//! Field set is the JSON shape from spec.md §6: `name` (required), `version`,
//! `main`, `remotes`, `dependencies`, `scripts`. Unknown top-level keys are a
//! warning, not a fatal error (spec.md §9 forward-compatibility note),
//! matching the teacher's own manifest-validation policy of rejecting only
//! what it actually understands incorrectly.

pub mod helpers;

pub use helpers::{find_manifest, find_manifest_from, find_manifest_with_optional};

use crate::core::GpkError;
use crate::source::RemoteAliasTable;
use crate::utils::fs::write_atomic;
use anyhow::{Context, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// The filename gpk looks for while walking up a directory tree.
pub const MANIFEST_FILE_NAME: &str = "package.json";

const KNOWN_TOP_LEVEL_KEYS: &[&str] =
    &["name", "version", "main", "remotes", "dependencies", "scripts"];

/// A parsed `package.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Manifest {
    /// Package name. The only required field.
    pub name: String,
    /// Package version, free-form (not required to be semver — this is the
    /// package's own identity, not a dependency constraint).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Relative path to the package's main entry point.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub main: Option<String>,
    /// Alias name → base URL, consulted only by [`crate::source::resolve_remote`]
    /// for this manifest's own dependency sources.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub remotes: RemoteAliasTable,
    /// Dependency name → dependency source string (spec.md §3).
    ///
    /// Kept order-preserving (`IndexMap`, backed by `serde_json`'s
    /// `preserve_order` feature) because spec.md §5 makes manifest
    /// declaration order semantically meaningful: it decides which sibling
    /// wins a hoist slot when two dependencies want the same ancestor
    /// placement for a shared grand-dependency.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub dependencies: IndexMap<String, String>,
    /// Script name → shell command string.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub scripts: IndexMap<String, String>,
}

impl Manifest {
    /// Builds a minimal manifest for `init`, with `name` derived from the
    /// containing directory's name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: Some("0.1.0".to_string()),
            main: None,
            remotes: RemoteAliasTable::new(),
            dependencies: IndexMap::new(),
            scripts: IndexMap::new(),
        }
    }

    /// Parses and validates manifest JSON text. Unknown top-level keys are
    /// logged as a warning (they may be understood by a newer gpk) rather
    /// than rejected.
    pub fn parse(path: &Path, text: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(text).map_err(|e| GpkError::ManifestInvalid {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

        if let Value::Object(map) = &value {
            for key in map.keys() {
                if !KNOWN_TOP_LEVEL_KEYS.contains(&key.as_str()) {
                    tracing::warn!(key, path = %path.display(), "unknown manifest key ignored");
                }
            }
        }

        let manifest: Self =
            serde_json::from_value(value).map_err(|e| GpkError::ManifestInvalid {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;

        if manifest.name.trim().is_empty() {
            return Err(GpkError::ManifestInvalid {
                path: path.display().to_string(),
                reason: "'name' must not be empty".to_string(),
            }
            .into());
        }

        Ok(manifest)
    }

    /// Reads and parses the manifest at `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading manifest at {}", path.display()))?;
        Self::parse(path, &text)
    }

    /// Serializes and atomically writes this manifest to `path`.
    pub fn save(&self, path: &Path) -> Result<()> {
        let text = serde_json::to_string_pretty(self).context("serializing manifest")?;
        write_atomic(path, &format!("{text}\n"))
    }
}

/// A materialized package on disk: its directory, parsed manifest, shared
/// environment, and owning package (if any). See [`crate::package::Package`]
/// for the operations exposed on this type.
#[derive(Debug, Clone)]
pub struct ManifestLocation {
    /// Directory containing `package.json` (not the manifest file itself).
    pub dir: PathBuf,
    /// Absolute path to `package.json`.
    pub manifest_path: PathBuf,
}

impl ManifestLocation {
    /// The canonical manifest path for a package directory.
    pub fn for_dir(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        let manifest_path = dir.join(MANIFEST_FILE_NAME);
        Self { dir, manifest_path }
    }
}
