//! theme-env library exports.
//!
//! Builds a minimized SDDM theme environment: only the QML modules, QML files
//! and native plugins a theme actually uses are copied into the output tree.

pub mod build;
pub mod commands;
pub mod config;
pub mod error;
pub mod preflight;
pub mod process;
pub mod qml;
pub mod timing;
pub mod tree;

pub use build::{build_theme_env, BuildSummary};
pub use error::BuildError;
