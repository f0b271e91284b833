//! gpk CLI entry point.

use clap::Parser;
use gpk::cli::Cli;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Logging precedence: RUST_LOG always wins; otherwise --verbose implies
    // debug; otherwise TEST_LOG routes output to the inherited streams
    // instead of being suppressed (useful when debugging a failing
    // integration test); otherwise logging is off.
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("error"))
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else if std::env::var("TEST_LOG").is_ok_and(|v| v != "0" && !v.is_empty()) {
        EnvFilter::new("info")
    } else {
        EnvFilter::new("off")
    };

    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).with_thread_ids(false).init();

    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    std::process::exit(cli.execute().await);
}
