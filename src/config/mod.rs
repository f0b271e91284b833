//! Process-wide configuration: home/global directories and IO streams.
//!
//! [`Environment`] is initialized once per process invocation (spec.md §4.5)
//! and shared read-mostly across every [`crate::package::Package`] in that
//! invocation. It is the one place that knows about platform directory
//! conventions and the optional `~/.gpk/config.toml` that may supplement a
//! manifest's own `remotes` table.

use crate::core::GpkError;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};

/// An optional `~/.gpk/config.toml`-equivalent file, kept as JSON for
/// consistency with the manifest format. Only carries remote aliases that
/// should be available to every project on this machine, at lower
/// precedence than a manifest's own `remotes` table (spec.md §3).
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct GlobalConfig {
    /// Aliases merged under a manifest's `remotes` table at lowest
    /// precedence: a manifest-declared alias of the same name always wins.
    #[serde(default)]
    pub remotes: BTreeMap<String, String>,
}

impl GlobalConfig {
    fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading global config at {}", path.display()))?;
        let config: Self = serde_json::from_str(&text)
            .with_context(|| format!("parsing global config at {}", path.display()))?;
        Ok(config)
    }
}

/// Process-wide ambient state: where gpk keeps its cache and global config,
/// and where diagnostics get written.
#[derive(Debug, Clone)]
pub struct Environment {
    /// Per-user state directory, `~/.gpk` by default or `$GPK_HOME`.
    pub home: PathBuf,
    /// Machine-wide cache/global-config directory, defaults to the same as
    /// `home` unless `$GPK_GLOBAL` is set — most installs don't separate
    /// the two, but spec.md §2 lists them as distinct concerns.
    pub global: PathBuf,
    /// Aliases loaded from `<global>/config.toml`-equivalent, merged into
    /// dependency resolution at lowest precedence.
    pub global_remotes: BTreeMap<String, String>,
}

impl Environment {
    /// Builds an `Environment` from platform conventions and environment
    /// variable overrides. Does not touch the filesystem; call [`Self::ensure`]
    /// before relying on `home`/`global` existing.
    pub fn new() -> Result<Self> {
        let home = match std::env::var_os("GPK_HOME") {
            Some(value) => PathBuf::from(value),
            None => dirs::home_dir()
                .ok_or_else(|| GpkError::Other { message: "cannot determine home directory".into() })?
                .join(".gpk"),
        };
        let global = match std::env::var_os("GPK_GLOBAL") {
            Some(value) => PathBuf::from(value),
            None => home.clone(),
        };
        let global_config_path = global.join("config.json");
        let global_remotes = GlobalConfig::load_from(&global_config_path)?.remotes;

        Ok(Self { home, global, global_remotes })
    }

    /// Creates `home` and `global` if missing. Partial failure (e.g. `home`
    /// created but `global` creation fails) is left as-is; there is no
    /// rollback, matching how the rest of gpk's filesystem operations work
    /// (spec.md §4.5, §9).
    pub fn ensure(&self) -> Result<()> {
        std::fs::create_dir_all(&self.home)
            .with_context(|| format!("creating {}", self.home.display()))?;
        std::fs::create_dir_all(&self.global)
            .with_context(|| format!("creating {}", self.global.display()))?;
        Ok(())
    }

    /// The content-addressed git cache directory, `<global>/cache`.
    pub fn cache_dir(&self) -> PathBuf {
        self.global.join("cache")
    }

    /// Writes a diagnostic line to stderr. Kept as a method (rather than a
    /// bare `eprintln!`) so tests can eventually substitute a captured
    /// stream without touching call sites.
    pub fn error(&self, stack: impl std::fmt::Display) {
        let mut stderr = std::io::stderr();
        let _ = writeln!(stderr, "{stack}");
    }
}
