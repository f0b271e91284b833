//! Small cross-platform filesystem helpers shared by the manifest store and
//! installer.

use anyhow::{Context, Result};
use std::path::Path;

/// Creates a directory and all its parents if missing. A thin wrapper so
/// call sites read the same way the teacher's `ensure_dir` does.
pub fn ensure_dir(path: &Path) -> Result<()> {
    std::fs::create_dir_all(path).with_context(|| format!("creating directory {}", path.display()))
}

/// Writes `contents` to `path` atomically: write to a sibling temp file,
/// then rename over the destination. Prevents a crash mid-write (e.g. during
/// `init` or `add`) from leaving a half-written manifest.
pub fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    ensure_dir(dir)?;

    let mut tmp = tempfile::NamedTempFile::new_in(dir)
        .with_context(|| format!("creating temp file in {}", dir.display()))?;
    use std::io::Write;
    tmp.write_all(contents.as_bytes())
        .with_context(|| format!("writing temp file for {}", path.display()))?;
    tmp.flush()?;
    tmp.persist(path)
        .map_err(|e| anyhow::anyhow!("renaming temp file into place at {}: {}", path.display(), e.error))?;
    Ok(())
}

/// Moves `src` to `dst`, falling back to a recursive copy-then-remove when
/// the two paths are on different filesystems (cross-device rename fails on
/// all platforms with `EXDEV`). Used by the installer to move a staged
/// fetch from a tempdir into `node_modules`.
pub fn move_dir(src: &Path, dst: &Path) -> Result<()> {
    if let Some(parent) = dst.parent() {
        ensure_dir(parent)?;
    }
    match std::fs::rename(src, dst) {
        Ok(()) => Ok(()),
        Err(_) => {
            copy_dir_recursive(src, dst)?;
            std::fs::remove_dir_all(src)
                .with_context(|| format!("removing staged directory {}", src.display()))?;
            Ok(())
        }
    }
}

fn copy_dir_recursive(src: &Path, dst: &Path) -> Result<()> {
    copy_tree_excluding(src, dst, &[])
}

/// Recursively copies `src` into `dst`, skipping any entry whose top-level
/// path component (relative to `src`) matches a name in `exclude` — used to
/// materialize a working tree from a cached mirror without its `.git`
/// directory.
pub fn copy_tree_excluding(src: &Path, dst: &Path, exclude: &[&str]) -> Result<()> {
    ensure_dir(dst)?;
    for entry in walkdir::WalkDir::new(src).min_depth(1) {
        let entry = entry?;
        let rel = entry.path().strip_prefix(src).unwrap();
        if let Some(first) = rel.components().next()
            && exclude.contains(&first.as_os_str().to_string_lossy().as_ref())
        {
            continue;
        }
        let target = dst.join(rel);
        if entry.file_type().is_dir() {
            ensure_dir(&target)?;
        } else {
            if let Some(parent) = target.parent() {
                ensure_dir(parent)?;
            }
            std::fs::copy(entry.path(), &target).with_context(|| {
                format!("copying {} to {}", entry.path().display(), target.display())
            })?;
        }
    }
    Ok(())
}
