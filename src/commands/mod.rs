//! CLI command handlers.
//!
//! - `build` - Assemble the minimized theme environment
//! - `preflight` - Validate inputs before building
//! - `show` - Display information

pub mod build;
mod preflight;
pub mod show;

pub use build::cmd_build;
pub use preflight::cmd_preflight;
pub use show::cmd_show;
