//! Terminal build conditions.
//!
//! Everything else flows through `anyhow` with context; these are the cases
//! callers (and tests) need to tell apart.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BuildError {
    #[error("Substitute package {package} for QML module {module} does not contain said module")]
    MissingSubstitute { module: String, package: PathBuf },

    #[error("QML module {0} has a force-plugin marker but declares no plugin")]
    ForcePluginWithoutPlugin(String),

    #[error("Unexpected file type at {0}")]
    UnexpectedFileType(PathBuf),

    #[error("Expected {0} to exist after copying")]
    MissingAfterCopy(PathBuf),

    #[error("missing {0} required native Qt plugins; erroring out")]
    MissingPlugins(usize),

    #[error("Output root {0} ended up empty")]
    EmptyOutput(PathBuf),
}
