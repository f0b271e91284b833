//! Command-line interface for gpk.
//!
//! One module per subcommand, the same shape as the teacher's `src/cli/*`:
//! a `clap::Args` struct carrying that command's own flags, and an
//! `execute` method that resolves the target [`crate::package::Package`]
//! and calls the matching operation on it.

pub mod common;
mod init;
mod install;
mod rebuild;
mod run;
mod uninstall;

use crate::config::Environment;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;

/// gpk — a git-native package manager for source-distributed dependencies.
#[derive(Parser, Debug)]
#[command(name = "gpk", about = "a git-native package manager", version)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug-level logging (equivalent to `RUST_LOG=debug`).
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to the manifest file, bypassing the usual upward search.
    #[arg(long, global = true)]
    manifest_path: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create a new `package.json`.
    Init(init::InitCommand),
    /// Install declared dependencies into `node_modules`.
    Install(install::InstallCommand),
    /// Remove installed dependency subtrees.
    Uninstall(uninstall::UninstallCommand),
    /// Re-run `postinstall` scripts without re-fetching.
    #[command(visible_aliases = ["build", "rb"])]
    Rebuild(rebuild::RebuildCommand),
    /// Run a script from the manifest's `scripts` table.
    Run(run::RunCommand),
    /// Shorthand for `run test`.
    #[command(visible_aliases = ["t", "tst"])]
    Test(run::TestCommand),
}

impl Cli {
    /// Dispatches to the selected subcommand, returning the process exit code.
    pub async fn execute(self) -> i32 {
        let env = match Environment::new() {
            Ok(env) => Arc::new(env),
            Err(e) => {
                crate::core::user_friendly_error(e).display();
                return 1;
            }
        };

        match self.command {
            Commands::Init(cmd) => cmd.execute(env),
            Commands::Install(cmd) => cmd.execute(self.manifest_path, env).await,
            Commands::Uninstall(cmd) => cmd.execute(self.manifest_path, env),
            Commands::Rebuild(cmd) => cmd.execute(self.manifest_path, env).await,
            Commands::Run(cmd) => cmd.execute(self.manifest_path, env).await,
            Commands::Test(cmd) => cmd.execute(self.manifest_path, env).await,
        }
    }
}
