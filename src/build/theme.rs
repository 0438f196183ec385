//! Theme sources and auxiliary data.

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use walkdir::WalkDir;

use crate::config::{Config, DATA_DIRS};
use crate::qml::qmldir::QML_SUFFIX;
use crate::qml::Session;
use crate::tree::OutputTree;

/// Name prefix of theme configuration files.
const THEME_CONF_PREFIX: &str = "theme.conf";

/// Walk every theme file: QML files become entry points, theme configs are
/// rewritten, everything else is copied as is.
pub fn include_themes(config: &Config, tree: &OutputTree, session: &mut Session) -> Result<usize> {
    let themes = config.themes_dir();
    if !themes.is_dir() {
        eprintln!("  [WARN] No SDDM themes found at {}", themes.display());
        return Ok(0);
    }

    let mut entry_points = 0;
    for entry in WalkDir::new(&themes).follow_links(true).sort_by_file_name() {
        let entry = entry.with_context(|| format!("Failed to walk {}", themes.display()))?;
        if entry.file_type().is_dir() {
            continue;
        }

        let path = entry.path();
        let file_name = entry.file_name().to_string_lossy();
        if file_name.ends_with(QML_SUFFIX) {
            session.scan_file(path, None, &[])?;
            entry_points += 1;
        } else if file_name.starts_with(THEME_CONF_PREFIX) {
            include_theme_conf(tree, path)?;
        } else {
            tree.include(path)?;
        }
    }

    Ok(entry_points)
}

/// Copy a theme config, materializing every file it references by absolute
/// path and pointing the key at the output copy instead.
pub fn include_theme_conf(tree: &OutputTree, conf: &Path) -> Result<()> {
    let content = fs::read_to_string(conf)
        .with_context(|| format!("Failed to read theme config {}", conf.display()))?;

    let mut rewritten = String::with_capacity(content.len());
    for line in content.lines() {
        match referenced_path(line) {
            Some((key, value)) => {
                let out = tree.include(Path::new(value))?;
                rewritten.push_str(&format!("{}={}\n", key, out.display()));
            }
            None => {
                rewritten.push_str(line);
                rewritten.push('\n');
            }
        }
    }

    tree.write(conf, &rewritten)?;
    Ok(())
}

/// `key=value` lines whose value is an existing absolute path.
fn referenced_path(line: &str) -> Option<(&str, &str)> {
    let (key, value) = line.trim().split_once('=')?;
    let value = value.trim();
    let path = Path::new(value);
    if path.is_absolute() && path.exists() {
        Some((key.trim(), value))
    } else {
        None
    }
}

/// Copy locale and icon data wholesale.
pub fn include_data(config: &Config, tree: &OutputTree) -> Result<()> {
    for dir in DATA_DIRS {
        let path = config.raw_env.join(dir);
        if path.exists() {
            println!("Including {}", dir);
            tree.include(&path)?;
        }
    }
    Ok(())
}
