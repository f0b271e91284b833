//! Error handling for gpk.
//!
//! The error system has two parts:
//! - [`GpkError`] — the strongly-typed error enum used throughout the crate.
//! - [`ErrorContext`] — a wrapper that adds a user-facing suggestion/details
//!   pair before the error reaches the terminal.
//!
//! Every error kind named in spec.md §7 has a variant here: `UnknownAlias`,
//! `MalformedSource`, `NoManifest`, `ManifestInvalid`, `FetchFailed`,
//! `ConstraintUnsatisfiable`, `LayoutConflict`, `NoSuchScript`,
//! `AlreadyInitialized`, `IoError`, plus the installer-internal
//! `ManifestMissing` and `NoRemoteForConstraint`.

use colored::Colorize;
use std::fmt;
use thiserror::Error;

/// All failure modes produced by gpk's core.
#[derive(Error, Debug)]
pub enum GpkError {
    /// A `<alias>:` prefix was used that does not appear in the enclosing
    /// manifest's `remotes` table.
    #[error("unknown remote alias '{alias}'")]
    UnknownAlias {
        /// The alias that had no matching entry.
        alias: String,
    },

    /// A dependency source string matched none of the recognized forms.
    #[error("malformed dependency source '{input}'")]
    MalformedSource {
        /// The offending source string.
        input: String,
    },

    /// No `package.json` was found walking up from the starting directory.
    #[error("no package.json found in this directory or any parent directory")]
    NoManifest,

    /// A `package.json` was found but failed to parse or validate.
    #[error("invalid manifest at {path}: {reason}")]
    ManifestInvalid {
        /// Path to the offending manifest.
        path: String,
        /// Why validation failed.
        reason: String,
    },

    /// The Fetcher could not produce a working tree for a remote.
    #[error("failed to fetch '{git}': {reason}")]
    FetchFailed {
        /// The git URL that could not be fetched.
        git: String,
        /// The underlying reason.
        reason: String,
    },

    /// A `version` range matched no tag in the remote.
    #[error("no tag in '{git}' satisfies constraint '{constraint}'")]
    ConstraintUnsatisfiable {
        /// The remote that was searched.
        git: String,
        /// The constraint that matched nothing.
        constraint: String,
    },

    /// A fetched tree had no manifest at all.
    #[error("fetched tree for '{git}' has no package.json")]
    ManifestMissing {
        /// The remote that produced an unusable tree.
        git: String,
    },

    /// A bare version constraint (no `git` remote) for a dependency that
    /// isn't already materialized anywhere — there is no remote to search,
    /// unlike `ConstraintUnsatisfiable` where one was searched and came up
    /// empty.
    #[error("dependency '{name}' has constraint '{constraint}' but no git remote to resolve it against")]
    NoRemoteForConstraint {
        /// The dependency name.
        name: String,
        /// The unresolved version constraint.
        constraint: String,
    },

    /// Two sibling dependencies require mutually incompatible versions of a
    /// third dependency that cannot be placed even by duplication.
    #[error("cannot place '{name}': {reason}")]
    LayoutConflict {
        /// The dependency name that could not be placed.
        name: String,
        /// Why placement failed.
        reason: String,
    },

    /// `run <script>` was called for a script not present in `scripts`.
    #[error("no script named '{name}'")]
    NoSuchScript {
        /// The script name that was requested.
        name: String,
    },

    /// `init` was called in a directory that already has a manifest.
    #[error("package.json already exists at {path}")]
    AlreadyInitialized {
        /// Path to the existing manifest.
        path: String,
    },

    /// Any filesystem error not covered by a more specific variant.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// A catch-all for contexts that don't warrant a dedicated variant.
    #[error("{message}")]
    Other {
        /// Free-form error description.
        message: String,
    },
}

/// Context the Installer attaches to an `anyhow::Error` as it unwinds out of
/// a dependency subtree, e.g. `a > c > d` (spec.md §7's propagation policy).
/// Looked up from the error chain by [`user_friendly_error`], not displayed
/// by anyhow's own `Display` impl.
#[derive(Debug)]
pub struct DependencyPath(pub String);

impl fmt::Display for DependencyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "in dependency path: {}", self.0)
    }
}

impl std::error::Error for DependencyPath {}

/// Wraps an [`anyhow::Error`] with an optional suggestion, extra detail, and
/// (for installer errors) the dependency path that produced it. The wrapped
/// error keeps its full `.context()` chain; [`user_friendly_error`] searches
/// it for a [`GpkError`] (to pick a suggestion) and a [`DependencyPath`]
/// without requiring either to be the outermost layer.
pub struct ErrorContext {
    error: anyhow::Error,
    suggestion: Option<String>,
    details: Option<String>,
    dependency_path: Option<String>,
}

impl ErrorContext {
    /// Wraps a bare error with no additional context.
    pub fn new(error: anyhow::Error) -> Self {
        Self { error, suggestion: None, details: None, dependency_path: None }
    }

    /// Attaches an actionable suggestion shown under the error.
    #[must_use]
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Attaches free-form extra detail shown under the error.
    #[must_use]
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Attaches the `a > c > d` dependency path that led to this error.
    #[must_use]
    pub fn with_dependency_path(mut self, path: impl Into<String>) -> Self {
        self.dependency_path = Some(path.into());
        self
    }

    /// Prints the error, its path, details, and suggestion to stderr in
    /// color.
    pub fn display(&self) {
        eprintln!("{} {}", "error:".red().bold(), self.error);
        if let Some(path) = &self.dependency_path {
            eprintln!("  {} {}", "in:".dimmed(), path);
        }
        if let Some(details) = &self.details {
            eprintln!("  {details}");
        }
        if let Some(suggestion) = &self.suggestion {
            eprintln!("  {} {}", "help:".cyan().bold(), suggestion);
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)?;
        if let Some(suggestion) = &self.suggestion {
            write!(f, "\n  help: {suggestion}")?;
        }
        Ok(())
    }
}

/// Converts an [`anyhow::Error`] into a displayable [`ErrorContext`],
/// attaching a suggestion for the well-known [`GpkError`] kinds and the
/// dependency path, if any, a [`DependencyPath`] context recorded along the
/// way. Both are found anywhere in the chain, not just the outermost layer,
/// so a `.context(...)`-wrapped `GpkError` still gets its suggestion.
pub fn user_friendly_error(err: anyhow::Error) -> ErrorContext {
    let suggestion = err.chain().find_map(|c| c.downcast_ref::<GpkError>()).and_then(|gpk_err| {
        match gpk_err {
            GpkError::NoManifest => Some("run 'gpk init' to create a package.json".to_string()),
            GpkError::UnknownAlias { .. } => {
                Some("add this alias to the 'remotes' table in package.json".to_string())
            }
            GpkError::AlreadyInitialized { .. } => {
                Some("pass --force to overwrite the existing manifest".to_string())
            }
            GpkError::NoSuchScript { .. } => {
                Some("check the 'scripts' table in package.json".to_string())
            }
            GpkError::NoRemoteForConstraint { .. } => Some(
                "give this dependency a git remote, or declare it elsewhere in the tree first"
                    .to_string(),
            ),
            _ => None,
        }
    });
    let dependency_path =
        err.chain().find_map(|c| c.downcast_ref::<DependencyPath>()).map(|d| d.0.clone());

    let mut ctx = ErrorContext::new(err);
    if let Some(s) = suggestion {
        ctx = ctx.with_suggestion(s);
    }
    if let Some(p) = dependency_path {
        ctx = ctx.with_dependency_path(p);
    }
    ctx
}
