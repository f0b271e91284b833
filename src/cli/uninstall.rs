//! `gpk uninstall <pkg…>` — remove installed dependency subtrees.

use crate::cli::common::load_target;
use crate::config::Environment;
use crate::core::user_friendly_error;
use clap::Args;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug)]
pub struct UninstallCommand {
    /// Dependency names to remove from `node_modules`.
    #[arg(required = true)]
    packages: Vec<String>,

    /// Act on the environment's global package instead of the current project.
    #[arg(short, long)]
    global: bool,
}

impl UninstallCommand {
    pub fn execute(self, manifest_path: Option<PathBuf>, env: Arc<Environment>) -> i32 {
        let target = match load_target(manifest_path, self.global, env) {
            Ok(p) => p,
            Err(e) => {
                user_friendly_error(e).display();
                return 1;
            }
        };

        match target.uninstall(&self.packages) {
            Ok(()) => {
                println!("removed {}", self.packages.join(", "));
                0
            }
            Err(e) => {
                user_friendly_error(e).display();
                1
            }
        }
    }
}
