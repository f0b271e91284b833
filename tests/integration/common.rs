//! Shared fixtures: real local git repositories standing in for remotes, and
//! small manifest-writing helpers. Same shape as the teacher's own
//! `tests/common::TestGit`.
#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::Arc;
use tempfile::TempDir;

use gpk::config::Environment;

/// A git repository built for a test, with helpers for producing the
/// `git+file://...#...` source strings a dependent manifest would use to
/// reach it.
pub struct TestGit {
    dir: PathBuf,
}

impl TestGit {
    pub fn init(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        std::fs::create_dir_all(&dir).unwrap();
        run(&dir, &["init", "--quiet"]);
        run(&dir, &["config", "user.email", "test@gpk.example"]);
        run(&dir, &["config", "user.name", "gpk tests"]);
        Self { dir }
    }

    pub fn add_all(&self) {
        run(&self.dir, &["add", "."]);
    }

    pub fn commit(&self, message: &str) {
        run(&self.dir, &["commit", "--quiet", "-m", message]);
    }

    pub fn tag(&self, name: &str) {
        run(&self.dir, &["tag", name]);
    }

    pub fn path(&self) -> &Path {
        &self.dir
    }

    /// A `git+file://<repo>#<fragment>` source string, e.g.
    /// `git.source("semver:~1.0.0")`.
    pub fn source(&self, fragment: &str) -> String {
        format!("git+file://{}#{}", self.dir.display(), fragment)
    }
}

fn run(dir: &Path, args: &[&str]) {
    let output = Command::new("git").args(args).current_dir(dir).output().expect("spawning git");
    assert!(
        output.status.success(),
        "git {args:?} failed in {}: {}",
        dir.display(),
        String::from_utf8_lossy(&output.stderr)
    );
}

/// Builds a fixture git repository at `dir` containing `manifest_json`,
/// committed and tagged `tag`.
pub fn git_package(dir: &Path, manifest_json: &str, tag: &str) -> TestGit {
    std::fs::create_dir_all(dir).unwrap();
    std::fs::write(dir.join("package.json"), manifest_json).unwrap();
    let git = TestGit::init(dir);
    git.add_all();
    git.commit("initial");
    git.tag(tag);
    git
}

/// A throwaway [`Environment`] rooted under `temp`, so tests never touch the
/// real `~/.gpk`.
pub fn test_env(temp: &TempDir) -> Arc<Environment> {
    let home = temp.path().join("gpk-home");
    Arc::new(Environment { home: home.clone(), global: home, global_remotes: Default::default() })
}
