//! `gpk run <script> [args…]`, and `gpk test`/`t`/`tst` as a fixed alias for
//! `run test`.

use crate::cli::common::load_target;
use crate::config::Environment;
use crate::core::user_friendly_error;
use clap::Args;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug)]
pub struct RunCommand {
    /// The script name to run, from the manifest's `scripts` table.
    script: String,

    /// Extra arguments appended to the script's command line.
    #[arg(trailing_var_arg = true)]
    args: Vec<String>,
}

impl RunCommand {
    pub async fn execute(self, manifest_path: Option<PathBuf>, env: Arc<Environment>) -> i32 {
        run_named_script(&self.script, self.args, manifest_path, env).await
    }
}

/// `test`/`t`/`tst` always run the `test` script; see spec.md §6.
#[derive(Args, Debug)]
pub struct TestCommand {
    #[arg(trailing_var_arg = true)]
    args: Vec<String>,
}

impl TestCommand {
    pub async fn execute(self, manifest_path: Option<PathBuf>, env: Arc<Environment>) -> i32 {
        run_named_script("test", self.args, manifest_path, env).await
    }
}

async fn run_named_script(
    script: &str,
    args: Vec<String>,
    manifest_path: Option<PathBuf>,
    env: Arc<Environment>,
) -> i32 {
    let target = match load_target(manifest_path, false, env) {
        Ok(p) => p,
        Err(e) => {
            user_friendly_error(e).display();
            return 1;
        }
    };

    match target.run(script, &args).await {
        Ok(code) => code,
        Err(e) => {
            user_friendly_error(e).display();
            1
        }
    }
}
