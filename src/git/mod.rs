//! Git operations wrapper and the Fetcher capability (spec.md §6).
//!
//! Uses the system `git` binary rather than a Git library, the same
//! tradeoff the teacher makes for maximal compatibility with existing
//! authentication and configuration. [`GitRepo`] wraps a single working
//! directory; [`Fetcher`] layers a content-addressed cache on top, keyed by
//! `(url, resolved-commit)` per spec.md §6.

use crate::core::GpkError;
use crate::utils::fs::{copy_tree_excluding, ensure_dir};
use anyhow::{Context, Result};
use fs4::fs_std::FileExt;
use sha2::{Digest, Sha256};
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;

/// A handle to a single Git working directory, operated on via the system
/// `git` CLI.
#[derive(Debug, Clone)]
pub struct GitRepo {
    path: PathBuf,
}

impl GitRepo {
    /// Wraps an existing directory (not necessarily yet a git repository).
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path to the working directory this handle operates on.
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn run(&self, args: &[&str]) -> Result<std::process::Output> {
        Command::new("git")
            .args(args)
            .current_dir(&self.path)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    anyhow::anyhow!("git is not installed or not found in PATH")
                } else {
                    anyhow::anyhow!("failed to spawn git: {e}")
                }
            })
    }

    async fn run_ok(&self, args: &[&str], op: &str) -> Result<String> {
        let output = self.run(args).await?;
        if !output.status.success() {
            return Err(GpkError::FetchFailed {
                git: self.path.display().to_string(),
                reason: format!("git {op} failed: {}", String::from_utf8_lossy(&output.stderr)),
            }
            .into());
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    /// `git clone <url> <target>`.
    pub async fn clone(url: &str, target: impl AsRef<Path>) -> Result<Self> {
        let target = target.as_ref();
        if let Some(parent) = target.parent() {
            ensure_dir(parent)?;
        }
        let output = Command::new("git")
            .args(["clone", "--quiet", url, &target.to_string_lossy()])
            .stdin(Stdio::null())
            .output()
            .await
            .with_context(|| format!("spawning git clone for {url}"))?;
        if !output.status.success() {
            return Err(GpkError::FetchFailed {
                git: url.to_string(),
                reason: String::from_utf8_lossy(&output.stderr).to_string(),
            }
            .into());
        }
        Ok(Self::new(target.to_path_buf()))
    }

    /// `git fetch --tags` — refreshes remote refs without touching the
    /// working tree.
    pub async fn fetch(&self) -> Result<()> {
        self.run_ok(&["fetch", "--quiet", "--tags", "origin"], "fetch").await?;
        Ok(())
    }

    /// Lists all tags in the repository.
    pub async fn list_tags(&self) -> Result<Vec<String>> {
        let stdout = self.run_ok(&["tag", "-l"], "tag -l").await?;
        Ok(stdout.lines().filter(|l| !l.is_empty()).map(str::to_string).collect())
    }

    /// Checks out `reference` (branch, tag, or commit hash).
    pub async fn checkout(&self, reference: &str) -> Result<()> {
        self.run_ok(&["checkout", "--quiet", "--force", reference], "checkout")
            .await
            .map(|_| ())
            .map_err(|_| {
                GpkError::FetchFailed {
                    git: self.path.display().to_string(),
                    reason: format!("no such ref '{reference}'"),
                }
                .into()
            })
    }

    /// `git rev-parse HEAD` — the commit the working tree is currently at.
    pub async fn current_commit(&self) -> Result<String> {
        self.run_ok(&["rev-parse", "HEAD"], "rev-parse").await
    }
}

/// Produces a local working tree at a resolved revision for a given remote.
pub struct Fetcher {
    cache_dir: PathBuf,
}

/// The result of [`Fetcher::fetch`]: a working tree plus the ref it actually
/// landed on. For [`Revision::Range`] this is the matched tag — the value the
/// Installer must record to satisfy the same range again without re-fetching.
/// For [`Revision::Exact`] it is the given ref; for [`Revision::Default`] it
/// is the commit the remote's default branch resolved to.
pub struct FetchedTree {
    /// Local working tree directory; the caller owns moving/copying it into
    /// place.
    pub path: PathBuf,
    /// The tag, ref, or commit this checkout was resolved to.
    pub resolved: String,
}

/// Either side of spec.md's mutually-exclusive `(version, branch)` pair, as
/// consumed by the Fetcher.
pub enum Revision<'a> {
    /// A semver range; the Fetcher picks the highest matching tag.
    Range(&'a str),
    /// An exact branch, tag, or commit hash to check out directly.
    Exact(&'a str),
    /// Neither was given: use whatever the remote's default branch is.
    Default,
}

impl Fetcher {
    /// Builds a fetcher rooted at `<environment.global>/cache`.
    pub fn new(cache_dir: impl Into<PathBuf>) -> Self {
        Self { cache_dir: cache_dir.into() }
    }

    fn url_hash(url: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(url.as_bytes());
        hex::encode(hasher.finalize())[..16].to_string()
    }

    fn mirror_dir(&self, url: &str) -> PathBuf {
        self.cache_dir.join("sources").join(Self::url_hash(url))
    }

    fn checkout_dir(&self, url: &str, commit: &str) -> PathBuf {
        self.cache_dir.join("checkouts").join(Self::url_hash(url)).join(commit)
    }

    async fn lock(&self, url: &str) -> Result<std::fs::File> {
        let lock_dir = self.cache_dir.join("locks");
        ensure_dir(&lock_dir)?;
        let lock_path = lock_dir.join(format!("{}.lock", Self::url_hash(url)));
        let file = OpenOptions::new().create(true).write(true).open(&lock_path)?;
        let owned = file.try_clone()?;
        tokio::task::spawn_blocking(move || owned.lock_exclusive())
            .await
            .context("lock task panicked")??;
        Ok(file)
    }

    /// Produces a local working tree directory containing `url` checked out
    /// at the revision satisfying `revision`, along with the ref it actually
    /// resolved to.
    pub async fn fetch(&self, url: &str, revision: Revision<'_>) -> Result<FetchedTree> {
        let _guard = self.lock(url).await?;

        let mirror = self.mirror_dir(url);
        let repo = if mirror.join(".git").exists() {
            let repo = GitRepo::new(&mirror);
            repo.fetch().await?;
            repo
        } else {
            GitRepo::clone(url, &mirror).await?
        };

        let reference = match revision {
            Revision::Range(range_str) => {
                let range = crate::version::parse_range(range_str).map_err(|e| {
                    GpkError::ConstraintUnsatisfiable {
                        git: url.to_string(),
                        constraint: format!("{range_str} ({e})"),
                    }
                })?;
                let tags = repo.list_tags().await?;
                let (tag, _) = crate::version::best_matching_tag(&range, &tags).ok_or_else(|| {
                    GpkError::ConstraintUnsatisfiable {
                        git: url.to_string(),
                        constraint: range_str.to_string(),
                    }
                })?;
                Some(tag.to_string())
            }
            Revision::Exact(reference) => Some(reference.to_string()),
            Revision::Default => None,
        };

        if let Some(reference) = &reference {
            repo.checkout(reference).await?;
        }
        let commit = repo.current_commit().await?;

        let destination = self.checkout_dir(url, &commit);
        if !destination.exists() {
            copy_tree_excluding(&mirror, &destination, &[".git"])?;
        }
        let resolved = reference.unwrap_or(commit);
        Ok(FetchedTree { path: destination, resolved })
    }
}
