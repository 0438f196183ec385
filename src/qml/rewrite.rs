//! Manifest finalization.
//!
//! Runs once per module after every entry point has been scanned. Unused
//! modules lose their manifest; used ones keep only the lines describing what
//! was actually included.

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

use super::module::{ModuleId, QmlModule};
use super::qmldir::{self, Directive, QMLDIR, QML_SUFFIX};
use super::session::{plugin_artifact, Session};
use crate::error::BuildError;
use crate::tree::ensure_parent_exists;

impl Session<'_> {
    /// Rewrite or delete every module's manifest, in discovery order.
    pub fn finalize(&self) -> Result<()> {
        for index in 0..self.modules.len() {
            self.finalize_module(ModuleId(index))?;
        }
        Ok(())
    }

    fn finalize_module(&self, id: ModuleId) -> Result<()> {
        let module = self.get(id);
        let qmldir_out = self.tree.map(&module.dir().join(QMLDIR))?;
        if !qmldir_out.is_file() {
            return Err(BuildError::MissingAfterCopy(qmldir_out).into());
        }

        if !module.is_used() {
            tracing::debug!(module = module.name(), "removing unused module");
            fs::remove_file(&qmldir_out)
                .with_context(|| format!("Failed to remove {}", qmldir_out.display()))?;
            return Ok(());
        }

        let content = fs::read_to_string(&qmldir_out)
            .with_context(|| format!("Failed to read {}", qmldir_out.display()))?;

        let mut kept = String::new();
        for line in content.lines() {
            if let Some(line) = self.rewrite_line(id, line)? {
                kept.push_str(line.trim());
                kept.push('\n');
            }
        }

        fs::write(&qmldir_out, kept)
            .with_context(|| format!("Failed to write {}", qmldir_out.display()))?;
        Ok(())
    }

    /// The replacement for one manifest line, or `None` to drop it.
    fn rewrite_line(&self, id: ModuleId, line: &str) -> Result<Option<String>> {
        let module = self.get(id);

        let Some(directive) = qmldir::parse_line(line) else {
            return Ok(None);
        };

        let rewritten = match directive {
            Directive::Type { name, file } => {
                if !module.is_included(name) {
                    return Ok(None);
                }
                Some(self.rewrite_type_line(module, line, name, file)?)
            }
            Directive::Plugin { name } => self.rewrite_plugin_line(module, name)?,
            Directive::TypeInfo(_) | Directive::Prefer => None,
            Directive::Import(dep) | Directive::Depends(dep) => {
                if self.dependency_kept(dep, id)? {
                    Some(line.to_string())
                } else {
                    None
                }
            }
            Directive::Other => Some(line.to_string()),
        };

        Ok(rewritten)
    }

    /// Keep a used type's declaration, pulling absolute file references
    /// (inserted by fixups) into the module directory.
    fn rewrite_type_line(
        &self,
        module: &QmlModule,
        line: &str,
        ty: &str,
        file: &str,
    ) -> Result<String> {
        let mut line = line.to_string();
        let mut file = file.to_string();

        let referenced = Path::new(&file);
        if referenced.is_absolute() && referenced.is_file() {
            let local = format!("{}{}", ty, QML_SUFFIX);
            let dest = self.tree.map(&module.dir().join(&local))?;
            ensure_parent_exists(&dest)?;
            fs::copy(referenced, &dest).with_context(|| {
                format!("Failed to copy {} to {}", referenced.display(), dest.display())
            })?;
            line = qmldir::with_type_file(&line, &local);
            file = local;
        }

        let out_file = self.tree.map(&module.dir().join(&file))?;
        if !out_file.is_file() {
            return Err(BuildError::MissingAfterCopy(out_file).into());
        }
        Ok(line)
    }

    fn rewrite_plugin_line(&self, module: &QmlModule, plugin: &str) -> Result<Option<String>> {
        if !module.plugin_required() || !module.plugin_allowed() {
            return Ok(None);
        }

        let artifact = plugin_artifact(plugin);
        println!(
            "Including native Qt plugin {} for QML module {}",
            artifact,
            module.name()
        );
        self.tree.include(&module.dir().join(&artifact))?;
        Ok(Some(format!("plugin {}", plugin)))
    }

    /// Dependencies survive only if the module they name is used. Names that
    /// do not resolve to a module (base Qt, absent) are left alone.
    fn dependency_kept(&self, name: &str, from: ModuleId) -> Result<bool> {
        if let Some(module) = self.module(name) {
            return Ok(module.is_used());
        }
        Ok(self.locate(name, Some(from))?.is_none())
    }
}
