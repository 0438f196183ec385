//! Build command - assembles the theme environment.

use anyhow::Result;
use std::time::Instant;

use crate::build::{build_theme_env, BuildSummary};
use crate::config::Config;

/// Execute the build command.
pub fn cmd_build(config: &Config) -> Result<BuildSummary> {
    println!("=== Theme Environment Build ===\n");
    let start = Instant::now();

    let summary = build_theme_env(config)?;

    println!(
        "Finished {} theme entry point(s) in {:.1}s",
        summary.entry_points,
        start.elapsed().as_secs_f64()
    );
    Ok(summary)
}
