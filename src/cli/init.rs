//! `gpk init` — create a new `package.json` in the current directory.

use crate::config::Environment;
use crate::core::user_friendly_error;
use clap::Args;
use std::path::PathBuf;
use std::sync::Arc;

/// Creates a minimal `package.json` at `--path` (or the current directory).
#[derive(Args, Debug)]
pub struct InitCommand {
    /// Directory to create the manifest in (defaults to the current directory).
    #[arg(short, long)]
    path: Option<PathBuf>,

    /// Overwrite an existing manifest.
    #[arg(short, long)]
    force: bool,
}

impl InitCommand {
    pub fn execute(self, env: Arc<Environment>) -> i32 {
        let dir = self.path.unwrap_or_else(|| PathBuf::from("."));
        if let Err(e) = std::fs::create_dir_all(&dir) {
            eprintln!("error: creating {}: {e}", dir.display());
            return 1;
        }
        match crate::package::Package::init(&dir, self.force, env) {
            Ok(package) => {
                println!("created package.json for '{}'", package.info.name);
                0
            }
            Err(e) => {
                user_friendly_error(e).display();
                1
            }
        }
    }
}
