//! QML module dependency resolution.
//!
//! Entry-point QML files are scanned for capitalized identifiers and `import`
//! lines. Each identifier is attributed to the module that declares it, which
//! materializes the declaring file and recursively scans it. Once every entry
//! point has been scanned, [`Session::finalize`] prunes each module's
//! `qmldir` down to what was used.

mod module;
mod plugins;
pub mod qmldir;
mod rewrite;
pub mod scan;
mod session;

pub use module::{Includer, IncluderChain, ModuleId, QmlModule};
pub use plugins::MissingPlugin;
pub use session::{plugin_artifact, Session};
