//! Unified error types for create-stellar-app.

use std::path::PathBuf;
use thiserror::Error;

use crate::install::PackageManager;

/// All errors that can occur while scaffolding a project.
#[derive(Error, Debug)]
pub enum ScaffoldError {
    // --- Request ---

    /// The application name cannot be used as a directory and package name.
    #[error("invalid application name '{name}': {reason}")]
    InvalidAppName { name: String, reason: String },

    /// A typed template was requested while scaffolding a JavaScript project.
    #[error(
        "template '{template}' is not available for JavaScript projects; \
         use the default template '{default}' or switch to TypeScript"
    )]
    UnsupportedTemplate { template: String, default: String },

    // --- Target directory ---

    /// The target application directory is already present.
    #[error("directory '{0}' already exists; choose another name or remove it first")]
    DirectoryExists(PathBuf),

    /// Copying a template entry into the target failed.
    #[error("failed to copy {from} to {to}")]
    Copy {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // --- Generated files ---

    /// The generated `package.json` is not valid JSON.
    #[error("failed to parse manifest at {path}")]
    ManifestParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The generated `package.json` parses, but its root is not an object.
    #[error("manifest at {0} is not a JSON object")]
    ManifestNotObject(PathBuf),

    /// Rewriting a generated file in place failed.
    #[error("failed to write {path}")]
    WriteFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // --- Install ---

    /// The install delegate reported failure and installation was not skipped.
    #[error(
        "failed to install dependencies; run `{package_manager} install` \
         inside '{directory}' to finish setup"
    )]
    InstallFailed {
        package_manager: PackageManager,
        directory: PathBuf,
    },

    // --- General ---

    /// A filesystem I/O error.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// A catch-all for errors from dependencies.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Alias for `Result<T, ScaffoldError>`.
pub type Result<T> = std::result::Result<T, ScaffoldError>;
