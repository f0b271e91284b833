//! The Installer: recursive tree walker implementing the nested-with-hoist-
//! when-safe layout rule (spec.md §4.3).
//!
//! For each dependency declared in a manifest, in declaration order:
//! 1. Resolve its source string to a [`RemoteDescriptor`].
//! 2. Walk the ancestor chain (closest first) looking for an already
//!    materialized package of the same name. "Materialized" is read
//!    straight off the filesystem plus a small `.gpk-resolved.json` sidecar
//!    recording what was actually checked out there — not a tree-wide
//!    lockfile (spec.md's Non-goals exclude that), just enough local state
//!    to answer "does what's already here satisfy this constraint".
//! 3. Found + compatible ⇒ reuse, no work, no recursion (the existing
//!    subtree was already installed when it was first materialized).
//!    Found + incompatible ⇒ duplicate: fetch and nest under the requiring
//!    package. Not found anywhere ⇒ place under the requiring package too
//!    (see DESIGN.md's Open Question decision on what "highest ancestor"
//!    collapses to when nothing is already there to hoist toward).
//! 4. Fetch, stage into a tempdir, move atomically into place, recurse.
//!
//! Steps for siblings declared in one manifest run strictly in declaration
//! order, so a later dependency can observe an earlier one's placement
//! (this is what makes hoisting-via-reuse for shared grand-dependencies
//! deterministic). Once every direct dependency of a package has been
//! placed, the independent subtrees below each of them install
//! concurrently via a bounded [`tokio::task::JoinSet`] — mirroring the
//! teacher's own bounded-concurrency resolver — without perturbing the
//! layout outcome, since by that point every placement decision at this
//! level has already been committed to disk.

use crate::config::Environment;
use crate::core::GpkError;
use crate::core::error::DependencyPath;
use crate::git::{Fetcher, Revision};
use crate::manifest::{MANIFEST_FILE_NAME, Manifest};
use crate::source::{RemoteAliasTable, RemoteDescriptor, resolve_remote};
use crate::utils::fs::{copy_tree_excluding, move_dir};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

const INSTALLED_META_FILE: &str = ".gpk-resolved.json";
const DEFAULT_CONCURRENCY: usize = 8;

/// Per-package metadata recording what was actually checked out, written
/// alongside a materialized dependency's own `package.json`. Scoped to a
/// single directory — the way npm historically stamped `_resolved`/`_from`
/// onto each installed package's own manifest, not a tree-wide lockfile.
#[derive(Debug, Serialize, Deserialize)]
struct InstalledMeta {
    source: String,
    resolved: Option<String>,
    version: Option<String>,
}

/// What happened when placing one dependency.
enum Placed {
    /// An existing materialized package on the ancestor chain already
    /// satisfies this dependency; nothing more to do.
    Reused,
    /// A fresh working tree was fetched and moved into place; its own
    /// dependencies still need installing.
    Fresh { child_dir: PathBuf, child_manifest: Manifest, child_ancestors: Vec<PathBuf> },
}

/// The recursive tree walker.
pub struct Installer {
    env: Arc<Environment>,
    fetcher: Fetcher,
    concurrency: Arc<Semaphore>,
}

impl Installer {
    /// Builds an installer backed by `env`'s cache directory.
    pub fn new(env: Arc<Environment>) -> Arc<Self> {
        let fetcher = Fetcher::new(env.cache_dir());
        Arc::new(Self { env, fetcher, concurrency: Arc::new(Semaphore::new(DEFAULT_CONCURRENCY)) })
    }

    /// Installs `manifest`'s dependencies into `dir/node_modules`.
    pub async fn install(
        self: &Arc<Self>,
        dir: PathBuf,
        manifest: Manifest,
        ancestor_dirs: Vec<PathBuf>,
    ) -> Result<()> {
        self.install_dependencies(dir, manifest, ancestor_dirs, Vec::new()).await
    }

    fn effective_remotes(&self, manifest: &Manifest) -> RemoteAliasTable {
        let mut merged = self.env.global_remotes.clone();
        merged.extend(manifest.remotes.clone());
        merged
    }

    fn install_dependencies(
        self: &Arc<Self>,
        dir: PathBuf,
        manifest: Manifest,
        ancestor_dirs: Vec<PathBuf>,
        dep_path: Vec<String>,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + 'static>> {
        let this = Arc::clone(self);
        Box::pin(async move {
            let remotes = this.effective_remotes(&manifest);
            let mut to_recurse = Vec::new();

            for (name, source) in manifest.dependencies.iter() {
                let mut child_path = dep_path.clone();
                child_path.push(name.clone());

                let outcome = this
                    .place_one(name, source, &remotes, &dir, &ancestor_dirs)
                    .await
                    .map_err(|e| e.context(DependencyPath(child_path.join(" > "))))?;

                if let Placed::Fresh { child_dir, child_manifest, child_ancestors } = outcome {
                    to_recurse.push((child_dir, child_manifest, child_ancestors, child_path));
                }
            }

            let mut set = JoinSet::new();
            for (child_dir, child_manifest, child_ancestors, child_path) in to_recurse {
                let installer = Arc::clone(&this);
                let semaphore = Arc::clone(&this.concurrency);
                set.spawn(async move {
                    let _permit = semaphore.acquire_owned().await.expect("semaphore is never closed");
                    installer.install_dependencies(child_dir, child_manifest, child_ancestors, child_path).await
                });
            }
            while let Some(joined) = set.join_next().await {
                joined.context("install task panicked")??;
            }

            Ok(())
        })
    }

    async fn place_one(
        &self,
        name: &str,
        source: &str,
        remotes: &RemoteAliasTable,
        requiring_dir: &Path,
        ancestor_dirs: &[PathBuf],
    ) -> Result<Placed> {
        let descriptor = resolve_remote(source, remotes, name)?;

        if let Some(existing_dir) = find_existing(name, ancestor_dirs) {
            if satisfies(&descriptor, &existing_dir)? {
                return Ok(Placed::Reused);
            }
            // Found, but incompatible: duplicate, nested at the requiring package.
            return self.fetch_and_place(name, source, &descriptor, requiring_dir, ancestor_dirs).await;
        }

        if descriptor.git.is_none() {
            // A bare version constraint with no remote, and nothing already
            // materialized anywhere to satisfy it — there is no source to
            // fetch from. Distinct from `ConstraintUnsatisfiable`, which means
            // a remote *was* searched and had no matching tag.
            return Err(GpkError::NoRemoteForConstraint {
                name: name.to_string(),
                constraint: descriptor.version.unwrap_or_default(),
            }
            .into());
        }

        self.fetch_and_place(name, source, &descriptor, requiring_dir, ancestor_dirs).await
    }

    async fn fetch_and_place(
        &self,
        name: &str,
        source: &str,
        descriptor: &RemoteDescriptor,
        requiring_dir: &Path,
        ancestor_dirs: &[PathBuf],
    ) -> Result<Placed> {
        let url = descriptor.git.as_deref().expect("git checked by caller");
        let revision = match (&descriptor.version, &descriptor.branch) {
            (Some(range), None) => Revision::Range(range),
            (None, Some(reference)) => Revision::Exact(reference),
            (None, None) => Revision::Default,
            (Some(_), Some(_)) => {
                unreachable!("RemoteDescriptor invariant: version and branch are mutually exclusive")
            }
        };

        let fetched = self.fetcher.fetch(url, revision).await?;
        let manifest_path = fetched.path.join(MANIFEST_FILE_NAME);
        let child_manifest = Manifest::load(&manifest_path)
            .map_err(|_| GpkError::ManifestMissing { git: url.to_string() })?;

        let staging = tempfile::tempdir().context("creating install staging directory")?;
        copy_tree_excluding(&fetched.path, staging.path(), &[])?;

        let meta = InstalledMeta {
            source: source.to_string(),
            resolved: Some(fetched.resolved.clone()),
            version: child_manifest.version.clone(),
        };
        let meta_path = staging.path().join(INSTALLED_META_FILE);
        std::fs::write(&meta_path, serde_json::to_string_pretty(&meta)?)
            .with_context(|| format!("writing {}", meta_path.display()))?;

        let target_dir = requiring_dir.join("node_modules").join(name);
        if target_dir.exists() {
            std::fs::remove_dir_all(&target_dir)
                .with_context(|| format!("removing stale {}", target_dir.display()))?;
        }
        move_dir(staging.path(), &target_dir)?;

        tracing::info!(
            name,
            version = child_manifest.version.as_deref().unwrap_or(fetched.resolved.as_str()),
            "installed"
        );

        let mut child_ancestors = vec![target_dir.clone()];
        child_ancestors.extend(ancestor_dirs.iter().cloned());

        Ok(Placed::Fresh { child_dir: target_dir, child_manifest, child_ancestors })
    }
}

/// Walks `ancestor_dirs` closest-first looking for `<ancestor>/node_modules/<name>`
/// — the same resolution order Node's `require()` uses, per spec.md §4.3.
fn find_existing(name: &str, ancestor_dirs: &[PathBuf]) -> Option<PathBuf> {
    ancestor_dirs.iter().find_map(|ancestor| {
        let candidate = ancestor.join("node_modules").join(name);
        candidate.join(MANIFEST_FILE_NAME).exists().then_some(candidate)
    })
}

/// Whether the package already materialized at `existing_dir` satisfies
/// `descriptor`, per its recorded [`InstalledMeta`].
fn satisfies(descriptor: &RemoteDescriptor, existing_dir: &Path) -> Result<bool> {
    let meta_path = existing_dir.join(INSTALLED_META_FILE);
    let meta: InstalledMeta = match std::fs::read_to_string(&meta_path) {
        Ok(text) => serde_json::from_str(&text)
            .with_context(|| format!("parsing {}", meta_path.display()))?,
        Err(_) => return Ok(false),
    };

    match (&descriptor.version, &descriptor.branch) {
        (Some(range_str), None) => {
            let range = crate::version::parse_range(range_str)?;
            // `resolved` is the tag the Fetcher actually matched this range
            // against, so it's authoritative; the manifest's own `version` is
            // informational and only consulted if `resolved` isn't parseable
            // as semver (e.g. a meta file from an older install).
            let parsed = meta
                .resolved
                .as_deref()
                .and_then(crate::version::parse_tag)
                .or_else(|| meta.version.as_deref().and_then(crate::version::parse_tag));
            Ok(parsed.is_some_and(|v| range.matches(&v)))
        }
        (None, Some(branch)) => Ok(meta.resolved.as_deref() == Some(branch.as_str())),
        (None, None) => Ok(true),
        (Some(_), Some(_)) => {
            unreachable!("RemoteDescriptor invariant: version and branch are mutually exclusive")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Environment;

    fn test_env(cache_root: &Path) -> Arc<Environment> {
        Arc::new(Environment {
            home: cache_root.to_path_buf(),
            global: cache_root.to_path_buf(),
            global_remotes: Default::default(),
        })
    }

    fn write_manifest(dir: &Path, manifest: &Manifest) {
        std::fs::create_dir_all(dir).unwrap();
        manifest.save(&dir.join(MANIFEST_FILE_NAME)).unwrap();
    }

    fn write_meta(dir: &Path, meta: &InstalledMeta) {
        std::fs::write(dir.join(INSTALLED_META_FILE), serde_json::to_string(meta).unwrap()).unwrap();
    }

    #[test]
    fn find_existing_checks_ancestors_closest_first() {
        let temp = tempfile::tempdir().unwrap();
        let root = temp.path().join("root");
        let mid = root.join("node_modules").join("mid");
        write_manifest(&root.join("node_modules").join("shared"), &Manifest::new("shared"));
        write_manifest(&mid.join("node_modules").join("shared"), &Manifest::new("shared"));

        let ancestors = vec![mid.clone(), root.clone()];
        let found = find_existing("shared", &ancestors).unwrap();
        assert_eq!(found, mid.join("node_modules").join("shared"));
    }

    #[test]
    fn satisfies_checks_recorded_version_against_range() {
        let temp = tempfile::tempdir().unwrap();
        let dir = temp.path().join("dep");
        write_manifest(&dir, &Manifest::new("dep"));
        write_meta(
            &dir,
            &InstalledMeta { source: "x".into(), resolved: None, version: Some("1.2.0".into()) },
        );

        let compatible =
            RemoteDescriptor { git: Some("x".into()), version: Some("^1.0.0".into()), branch: None };
        assert!(satisfies(&compatible, &dir).unwrap());

        let incompatible =
            RemoteDescriptor { git: Some("x".into()), version: Some("^2.0.0".into()), branch: None };
        assert!(!satisfies(&incompatible, &dir).unwrap());
    }

    #[test]
    fn satisfies_falls_back_to_resolved_tag_when_manifest_omits_version() {
        let temp = tempfile::tempdir().unwrap();
        let dir = temp.path().join("dep");
        write_manifest(&dir, &Manifest::new("dep"));
        write_meta(
            &dir,
            &InstalledMeta { source: "x".into(), resolved: Some("v1.2.0".into()), version: None },
        );

        let compatible =
            RemoteDescriptor { git: Some("x".into()), version: Some("^1.0.0".into()), branch: None };
        assert!(satisfies(&compatible, &dir).unwrap());

        let incompatible =
            RemoteDescriptor { git: Some("x".into()), version: Some("^2.0.0".into()), branch: None };
        assert!(!satisfies(&incompatible, &dir).unwrap());
    }

    #[test]
    fn satisfies_is_false_with_no_recorded_metadata() {
        let temp = tempfile::tempdir().unwrap();
        let dir = temp.path().join("dep");
        write_manifest(&dir, &Manifest::new("dep"));
        let descriptor =
            RemoteDescriptor { git: Some("x".into()), version: Some("^1.0.0".into()), branch: None };
        assert!(!satisfies(&descriptor, &dir).unwrap());
    }

    #[tokio::test]
    async fn install_of_empty_manifest_is_a_no_op() {
        let temp = tempfile::tempdir().unwrap();
        let env = test_env(&temp.path().join("cache-home"));
        let dir = temp.path().join("project");
        std::fs::create_dir_all(&dir).unwrap();
        let installer = Installer::new(env);
        installer.install(dir.clone(), Manifest::new("project"), vec![dir.clone()]).await.unwrap();
        assert!(!dir.join("node_modules").exists());
    }
}
