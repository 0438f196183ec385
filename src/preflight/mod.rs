//! Preflight checks for a theme environment build.
//!
//! Validates the orchestrator inputs before anything is copied.
//! Run with `theme-env preflight`.

mod checks;
mod types;

use anyhow::{bail, Result};

use crate::config::Config;

pub use types::{CheckResult, CheckStatus, PreflightReport};

/// Run all preflight checks.
pub fn run_preflight(config: &Config) -> PreflightReport {
    let mut checks = Vec::new();

    println!("Running preflight checks...\n");

    println!("Checking sources...");
    checks.extend(checks::check_sources(config));

    println!("Checking module substitutions...");
    checks.extend(checks::check_substitutions(config));

    println!("Checking host tools...");
    checks.extend(checks::check_host_tools(config));

    println!("Checking output root...");
    checks.push(checks::check_output(&config.out));

    println!();

    PreflightReport { checks }
}

/// Run preflight and bail if any checks fail.
pub fn run_preflight_or_fail(config: &Config) -> Result<()> {
    let report = run_preflight(config);
    report.print();

    if !report.all_passed() {
        bail!(
            "Preflight failed: {} check(s) failed. Fix the issues above before building.",
            report.fail_count()
        );
    }

    println!("All preflight checks passed!\n");
    Ok(())
}
