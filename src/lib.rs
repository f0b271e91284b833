//! gpk — a git-native package manager for source-distributed dependencies.
//!
//! Dependencies are declared in a `package.json` by a source string (a git
//! URL, an alias shorthand, or a bare version range) rather than a registry
//! name, and installed into a `node_modules`-style tree with the same
//! hoist-when-safe, duplicate-when-not layout Node's own resolvers use.
//! There is no central registry and no tree-wide lockfile: every install is
//! a fresh, local, greedy resolution per manifest.

pub mod archive;
pub mod config;
pub mod core;
pub mod git;
pub mod installer;
pub mod manifest;
pub mod package;
pub mod source;
pub mod version;

pub mod cli;
pub mod utils;

pub use core::{ErrorContext, GpkError, user_friendly_error};
pub use package::Package;
