//! `gpk install [pkg…]` — materialize declared dependencies into `node_modules`.

use crate::cli::common::load_target;
use crate::config::Environment;
use crate::core::user_friendly_error;
use clap::Args;
use std::path::PathBuf;
use std::sync::Arc;

/// Installs all (or, if named, a subset of) the manifest's dependencies.
#[derive(Args, Debug)]
pub struct InstallCommand {
    /// Install only these already-declared dependencies and their subtrees,
    /// instead of the whole manifest.
    packages: Vec<String>,

    /// Accepted for interface compatibility; this manifest format has no
    /// separate development-dependency section to exclude, so it has no
    /// effect on which dependencies are installed.
    #[arg(long)]
    production: bool,

    /// Install into the environment's global package instead of the
    /// current project.
    #[arg(short, long)]
    global: bool,
}

impl InstallCommand {
    pub async fn execute(self, manifest_path: Option<PathBuf>, env: Arc<Environment>) -> i32 {
        if self.production {
            tracing::debug!("--production has no effect: gpk manifests have no dev-dependency section");
        }

        let mut target = match load_target(manifest_path, self.global, env) {
            Ok(p) => p,
            Err(e) => {
                user_friendly_error(e).display();
                return 1;
            }
        };

        if !self.packages.is_empty() {
            target.info.dependencies.retain(|name, _| self.packages.contains(name));
        }

        match target.install().await {
            Ok(()) => {
                println!("installed dependencies for '{}'", target.info.name);
                0
            }
            Err(e) => {
                user_friendly_error(e).display();
                1
            }
        }
    }
}
