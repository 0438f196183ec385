//! Native plugins that are needed but may not ship.
//!
//! Missing plugins are collected over the whole run and reported together,
//! so a single build surfaces every offending module.

use std::fmt::Write;

use super::module::ModuleId;
use super::session::Session;

/// A required plugin whose module is not allowed to carry native code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingPlugin {
    pub module: ModuleId,
    /// Shared object name, e.g. `libfooplugin.so`.
    pub artifact: String,
}

impl Session<'_> {
    pub fn missing_plugins(&self) -> &[MissingPlugin] {
        &self.missing_plugins
    }

    pub fn has_missing_plugins(&self) -> bool {
        !self.missing_plugins.is_empty()
    }

    /// Human-readable report: every missing plugin, each used plugin type of
    /// its module and the chain of files that pulled that type in.
    pub fn missing_plugin_report(&self) -> String {
        let mut report = String::new();

        for missing in &self.missing_plugins {
            let module = self.get(missing.module);
            let _ = writeln!(
                report,
                "ERROR: missing native Qt plugin {} for QML module {}, required by:",
                missing.artifact,
                module.name()
            );
            for (ty, chain) in module.used_plugin_types() {
                let _ = writeln!(report, " - QML type {}", ty);
                for includer in chain {
                    let _ = writeln!(report, "   - used by {}", includer);
                }
            }
            report.push('\n');
        }

        report
    }
}
