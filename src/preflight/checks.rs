//! Input checks run before a build.

use std::fs;
use std::path::Path;

use crate::config::Config;
use crate::qml::qmldir::QMLDIR;

use super::types::CheckResult;

/// Raw environment and theme sources.
pub fn check_sources(config: &Config) -> Vec<CheckResult> {
    let mut results = Vec::new();

    if config.raw_env.is_dir() {
        results.push(CheckResult::pass_with(
            "Raw environment",
            &config.raw_env.display().to_string(),
        ));
    } else {
        results.push(CheckResult::fail(
            "Raw environment",
            &format!("{} is not a directory", config.raw_env.display()),
        ));
    }

    let themes = config.themes_dir();
    let theme_count = fs::read_dir(&themes)
        .map(|entries| entries.filter_map(|e| e.ok()).count())
        .unwrap_or(0);
    if theme_count > 0 {
        results.push(CheckResult::pass_with(
            "SDDM themes",
            &format!("{} theme(s)", theme_count),
        ));
    } else {
        results.push(CheckResult::warn(
            "SDDM themes",
            &format!("None found in {} - output will be empty", themes.display()),
        ));
    }

    results
}

/// Every substitute package must actually contain the module it replaces.
pub fn check_substitutions(config: &Config) -> Vec<CheckResult> {
    config
        .substitutions
        .iter()
        .map(|(name, package)| {
            let check = format!("Substitute {}", name);
            let dir = config.module_dir(package, name);
            if dir.join(QMLDIR).is_file() {
                CheckResult::pass(&check)
            } else {
                CheckResult::fail(
                    &check,
                    &format!("{} does not contain {}", package.display(), dir.display()),
                )
            }
        })
        .collect()
}

/// Fixups run through `sh`.
pub fn check_host_tools(config: &Config) -> Vec<CheckResult> {
    if config.fixups.is_empty() {
        return vec![CheckResult::pass_with("sh", "not needed (no fixups)")];
    }

    match which::which("sh") {
        Ok(path) => vec![CheckResult::pass_with("sh", &path.display().to_string())],
        Err(_) => vec![CheckResult::fail(
            "sh",
            &format!("Required to run {} fixup(s)", config.fixups.len()),
        )],
    }
}

/// The output root must be absent or empty.
pub fn check_output(out: &Path) -> CheckResult {
    match fs::read_dir(out) {
        Err(_) => CheckResult::pass_with("Output root", "will be created"),
        Ok(mut entries) => {
            if entries.next().is_none() {
                CheckResult::pass("Output root")
            } else {
                CheckResult::fail(
                    "Output root",
                    &format!("{} is not empty", out.display()),
                )
            }
        }
    }
}
