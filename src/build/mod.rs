//! Theme environment assembly.
//!
//! Phases, in order:
//! 1. Theme files are copied and every QML file is scanned (module usage
//!    reaches its fixed point here)
//! 2. Locale and icon data are copied
//! 3. Required-but-forbidden native plugins abort the build
//! 4. Module manifests are pruned, unused modules dropped
//! 5. Empty directories are removed

pub mod theme;

use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

use crate::config::Config;
use crate::error::BuildError;
use crate::qml::Session;
use crate::timing::timed;
use crate::tree::OutputTree;

/// What a successful build produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildSummary {
    pub out: PathBuf,
    pub entry_points: usize,
    pub modules: usize,
    pub plugins: usize,
}

impl BuildSummary {
    pub fn print(&self) {
        println!(
            "Built theme environment in {} containing {} QML modules ({} native plugins)",
            self.out.display(),
            self.modules,
            self.plugins
        );
    }
}

/// Build the minimized theme environment described by `config`.
pub fn build_theme_env(config: &Config) -> Result<BuildSummary> {
    fs::create_dir_all(&config.out)
        .with_context(|| format!("Failed to create output root {}", config.out.display()))?;

    let tree = OutputTree::from_config(config);
    let mut session = Session::new(config, &tree);

    let entry_points = timed("Theme sources", || {
        theme::include_themes(config, &tree, &mut session)
    })?;
    timed("Locale and icon data", || theme::include_data(config, &tree))?;

    if session.has_missing_plugins() {
        println!();
        print!("{}", session.missing_plugin_report());
        return Err(BuildError::MissingPlugins(session.missing_plugins().len()).into());
    }

    timed("Module manifests", || session.finalize())?;
    timed("Empty directories", || tree.remove_empty_dirs())?;

    let summary = BuildSummary {
        out: config.out.clone(),
        entry_points,
        modules: session.modules().filter(|m| m.is_used()).count(),
        plugins: session.modules().filter(|m| m.plugin_required()).count(),
    };

    println!();
    summary.print();
    Ok(summary)
}
