//! The Package abstraction (spec.md §4.4): a manifest bound to the directory
//! it lives in, the shared process [`Environment`], and — when discovered
//! while walking an install tree — its parent package.
//!
//! Packages form a tree via `parent`, walked leaf-to-root only (ancestor
//! lookups), never root-to-leaf-and-back, so there is no reference cycle to
//! worry about; `Arc` sharing is enough, the same reasoning the teacher
//! applies to its own `Package`-shaped command state in `src/cli/*`.

use crate::config::Environment;
use crate::core::GpkError;
use crate::installer::Installer;
use crate::manifest::{MANIFEST_FILE_NAME, Manifest, ManifestLocation};
use crate::source::{RemoteAliasTable, RemoteDescriptor, resolve_remote};
use anyhow::{Context, Result};
use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::Arc;

/// A package directory bound to its parsed manifest.
#[derive(Debug, Clone)]
pub struct Package {
    /// Directory containing this package's `package.json`.
    pub dir: PathBuf,
    /// The parsed manifest.
    pub info: Manifest,
    /// The process-wide environment, shared (not owned) by every package.
    pub env: Arc<Environment>,
    /// The package that required this one, if any — `None` for the root
    /// package an invocation starts from.
    pub parent: Option<Arc<Package>>,
}

impl Package {
    /// Loads the package rooted at `dir` (spec.md §4.2's `fromDirectory`).
    /// `walk = true` ascends toward the filesystem root looking for
    /// `package.json`; `walk = false` requires it to exist at `dir` exactly.
    pub fn from_directory(
        dir: &Path,
        walk: bool,
        env: Arc<Environment>,
        parent: Option<Arc<Package>>,
    ) -> Result<Self> {
        let manifest_path = if walk {
            crate::manifest::find_manifest_from(dir.to_path_buf())?
        } else {
            let location = ManifestLocation::for_dir(dir);
            if !location.manifest_path.exists() {
                return Err(GpkError::NoManifest.into());
            }
            location.manifest_path
        };
        let info = Manifest::load(&manifest_path)?;
        let package_dir = manifest_path.parent().unwrap_or(dir).to_path_buf();
        Ok(Self { dir: package_dir, info, env, parent })
    }

    /// Creates a fresh `package.json` in `dir`. Fails with
    /// [`GpkError::AlreadyInitialized`] unless `force`.
    pub fn init(dir: &Path, force: bool, env: Arc<Environment>) -> Result<Self> {
        let location = ManifestLocation::for_dir(dir);
        if location.manifest_path.exists() && !force {
            return Err(GpkError::AlreadyInitialized { path: dir.display().to_string() }.into());
        }
        let name = dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "package".to_string());
        let info = Manifest::new(name);
        info.save(&location.manifest_path)?;
        Ok(Self { dir: dir.to_path_buf(), info, env, parent: None })
    }

    /// This package's `remotes` table merged under the environment's global
    /// aliases at lowest precedence — a manifest-declared alias of the same
    /// name always wins (SPEC_FULL.md Environment ambient addition).
    pub fn effective_remotes(&self) -> RemoteAliasTable {
        let mut merged = self.env.global_remotes.clone();
        merged.extend(self.info.remotes.clone());
        merged
    }

    /// Resolves one dependency's source string against this package's
    /// effective alias table.
    pub fn resolve_remote(&self, dependency_name: &str, source: &str) -> Result<RemoteDescriptor> {
        resolve_remote(source, &self.effective_remotes(), dependency_name).map_err(Into::into)
    }

    /// The ancestor chain consulted by the Installer's layout lookup rule:
    /// this package's own directory first, then each parent, closest first.
    pub fn ancestor_dirs(&self) -> Vec<PathBuf> {
        let mut dirs = vec![self.dir.clone()];
        let mut current = self.parent.as_deref();
        while let Some(p) = current {
            dirs.push(p.dir.clone());
            current = p.parent.as_deref();
        }
        dirs
    }

    /// Installs this package's declared dependencies into `node_modules`
    /// (spec.md §4.3).
    pub async fn install(&self) -> Result<()> {
        self.env.ensure()?;
        let installer = Installer::new(self.env.clone());
        installer.install(self.dir.clone(), self.info.clone(), self.ancestor_dirs()).await
    }

    /// Removes the named dependencies' subtrees from `<dir>/node_modules`.
    pub fn uninstall(&self, names: &[String]) -> Result<()> {
        let node_modules = self.dir.join("node_modules");
        for name in names {
            if name.is_empty() || name == "." || name == ".." || name.contains(['/', '\\']) {
                return Err(GpkError::Other {
                    message: format!("refusing to remove '{name}': not a single path component"),
                }
                .into());
            }
            let target = node_modules.join(name);
            if target.exists() {
                std::fs::remove_dir_all(&target)
                    .with_context(|| format!("removing {}", target.display()))?;
            }
        }
        Ok(())
    }

    /// Re-runs `scripts.postinstall` for every already-materialized
    /// dependency under `node_modules`, without re-fetching anything.
    pub async fn rebuild(&self) -> Result<()> {
        rebuild_tree(&self.dir).await
    }

    /// Runs a declared script by name, passing `args` through as extra shell
    /// words. [`GpkError::NoSuchScript`] if `script_name` is absent.
    pub async fn run(&self, script_name: &str, args: &[String]) -> Result<i32> {
        let command = self
            .info
            .scripts
            .get(script_name)
            .ok_or_else(|| GpkError::NoSuchScript { name: script_name.to_string() })?;
        run_script(command, &self.dir, args).await
    }
}

fn rebuild_tree(dir: &Path) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
    Box::pin(async move {
        let node_modules = dir.join("node_modules");
        if !node_modules.is_dir() {
            return Ok(());
        }
        let mut entries = std::fs::read_dir(&node_modules)
            .with_context(|| format!("reading {}", node_modules.display()))?
            .collect::<std::result::Result<Vec<_>, _>>()
            .with_context(|| format!("reading {}", node_modules.display()))?;
        entries.sort_by_key(std::fs::DirEntry::file_name);

        for entry in entries {
            let pkg_dir = entry.path();
            let manifest_path = pkg_dir.join(MANIFEST_FILE_NAME);
            if !manifest_path.exists() {
                continue;
            }
            let manifest = Manifest::load(&manifest_path)?;
            if let Some(postinstall) = manifest.scripts.get("postinstall") {
                run_script(postinstall, &pkg_dir, &[]).await?;
            }
            rebuild_tree(&pkg_dir).await?;
        }
        Ok(())
    })
}

/// Runs `command` through the platform-default shell in `cwd` (Open
/// Question decision, DESIGN.md: `sh -c` on Unix, `cmd /C` on Windows).
async fn run_script(command: &str, cwd: &Path, args: &[String]) -> Result<i32> {
    let full_command =
        if args.is_empty() { command.to_string() } else { format!("{command} {}", args.join(" ")) };

    let mut cmd = if cfg!(target_os = "windows") {
        let mut c = tokio::process::Command::new("cmd");
        c.args(["/C", &full_command]);
        c
    } else {
        let mut c = tokio::process::Command::new("sh");
        c.args(["-c", &full_command]);
        c
    };
    let status =
        cmd.current_dir(cwd).status().await.with_context(|| format!("running script '{command}'"))?;
    Ok(status.code().unwrap_or(1))
}
