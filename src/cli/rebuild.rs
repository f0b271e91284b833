//! `gpk rebuild` (aliases `build`, `rb`) — re-run `postinstall` scripts
//! across the already-materialized tree without re-fetching anything.

use crate::cli::common::load_target;
use crate::config::Environment;
use crate::core::user_friendly_error;
use clap::Args;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug)]
pub struct RebuildCommand {
    /// Act on the environment's global package instead of the current project.
    #[arg(short, long)]
    global: bool,
}

impl RebuildCommand {
    pub async fn execute(self, manifest_path: Option<PathBuf>, env: Arc<Environment>) -> i32 {
        let target = match load_target(manifest_path, self.global, env) {
            Ok(p) => p,
            Err(e) => {
                user_friendly_error(e).display();
                return 1;
            }
        };

        match target.rebuild().await {
            Ok(()) => 0,
            Err(e) => {
                user_friendly_error(e).display();
                1
            }
        }
    }
}
