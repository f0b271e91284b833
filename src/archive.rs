//! The Unpack capability (spec.md §6): `unpack(tar_path, destination_dir)`.
//!
//! gpk's normal install path never produces tarballs — the Fetcher hands the
//! Installer a working tree directly from the cache (see [`crate::git`]).
//! This function exists to satisfy the external interface spec.md documents
//! and backs the `--from-tarball` test fixture path used to seed the layout
//! tests in spec.md §8.3 (`unflat.tar.gz`). Grounded on the teacher's own
//! `tar xf` shell-out in its self-update archive extraction.

use crate::utils::fs::ensure_dir;
use anyhow::{Context, Result};
use std::path::Path;
use tokio::process::Command;

/// Extracts the tarball at `tar_path` into `destination`, creating it if
/// necessary.
pub async fn unpack(tar_path: &Path, destination: &Path) -> Result<()> {
    ensure_dir(destination)?;
    let output = Command::new("tar")
        .args(["xf", &tar_path.to_string_lossy(), "-C", &destination.to_string_lossy()])
        .output()
        .await
        .with_context(|| format!("spawning tar to extract {}", tar_path.display()))?;
    if !output.status.success() {
        anyhow::bail!(
            "failed to extract {}: {}",
            tar_path.display(),
            String::from_utf8_lossy(&output.stderr)
        );
    }
    Ok(())
}
