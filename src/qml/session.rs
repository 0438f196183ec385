//! Resolution session: module registry, manifest loading and type usage.
//!
//! A session owns every piece of state one build needs (the module arena,
//! scanned files, missing plugins) so independent builds never share anything.
//! Modules are registered before their manifest is parsed, which makes
//! cyclic `import` lines terminate. Type inclusion is bounded by the
//! `visited` set of (module, type) pairs.

use anyhow::{Context, Result};
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use super::module::{Includer, ModuleId, QmlModule};
use super::plugins::MissingPlugin;
use super::qmldir::{self, Directive, FORCE_PLUGIN_MARKER, QMLDIR};
use super::scan;
use crate::config::{Config, BASE_NAMESPACE_PREFIX};
use crate::error::BuildError;
use crate::tree::OutputTree;

/// Where a module name resolves to, before it is registered.
#[derive(Debug, Clone)]
pub(crate) struct ModuleLocation {
    pub dir: PathBuf,
    pub env: PathBuf,
    pub plugin_allowed: bool,
    pub substitute: Option<PathBuf>,
}

pub struct Session<'a> {
    pub(super) config: &'a Config,
    pub(super) tree: &'a OutputTree,
    pub(super) modules: Vec<QmlModule>,
    pub(super) by_name: HashMap<String, ModuleId>,
    pub(super) processed: HashSet<PathBuf>,
    pub(super) visited: HashSet<(ModuleId, String)>,
    pub(super) missing_plugins: Vec<MissingPlugin>,
}

impl<'a> Session<'a> {
    pub fn new(config: &'a Config, tree: &'a OutputTree) -> Self {
        Self {
            config,
            tree,
            modules: Vec::new(),
            by_name: HashMap::new(),
            processed: HashSet::new(),
            visited: HashSet::new(),
            missing_plugins: Vec::new(),
        }
    }

    /// Modules in discovery order.
    pub fn modules(&self) -> impl Iterator<Item = &QmlModule> {
        self.modules.iter()
    }

    pub fn module(&self, name: &str) -> Option<&QmlModule> {
        self.by_name.get(name).map(|id| &self.modules[id.0])
    }

    pub fn get(&self, id: ModuleId) -> &QmlModule {
        &self.modules[id.0]
    }

    /// Distinct source files scanned so far. Lets tests observe that
    /// repeated inclusion does not rescan.
    pub fn processed_count(&self) -> usize {
        self.processed.len()
    }

    // =========================================================================
    // Module registry
    // =========================================================================

    /// Resolve a module name, loading and caching it on first reference.
    ///
    /// `requester` is the module whose file or manifest mentions `name`; its
    /// environment and plugin permission are inherited. Base Qt modules and
    /// modules that cannot be found resolve to `None`.
    pub fn resolve(&mut self, name: &str, requester: Option<ModuleId>) -> Result<Option<ModuleId>> {
        if let Some(&id) = self.by_name.get(name) {
            return Ok(Some(id));
        }

        let Some(location) = self.locate(name, requester)? else {
            tracing::debug!(module = name, "module not found, ignoring");
            return Ok(None);
        };

        if let Some(package) = &location.substitute {
            println!("Substituting QML module {} from package {}", name, package.display());
        }

        let id = ModuleId(self.modules.len());
        self.modules.push(QmlModule::new(
            name,
            location.dir,
            location.env,
            location.plugin_allowed,
        ));
        self.by_name.insert(name.to_string(), id);
        tracing::debug!(module = name, plugin_allowed = location.plugin_allowed, "registered module");

        self.load_manifest(id)?;
        Ok(Some(id))
    }

    /// Find where `name` lives without registering anything.
    pub(crate) fn locate(
        &self,
        name: &str,
        requester: Option<ModuleId>,
    ) -> Result<Option<ModuleLocation>> {
        if name.starts_with(BASE_NAMESPACE_PREFIX) {
            return Ok(None);
        }

        if let Some(package) = self.config.substitutions.get(name) {
            let dir = self.config.module_dir(package, name);
            if !(dir.is_dir() && dir.join(QMLDIR).is_file()) {
                return Err(BuildError::MissingSubstitute {
                    module: name.to_string(),
                    package: package.clone(),
                }
                .into());
            }
            return Ok(Some(ModuleLocation {
                dir,
                env: package.clone(),
                plugin_allowed: true,
                substitute: Some(package.clone()),
            }));
        }

        let (env, plugin_allowed) = match requester {
            Some(id) => {
                let m = &self.modules[id.0];
                (m.env().to_path_buf(), m.plugin_allowed())
            }
            None => (self.config.raw_env.clone(), self.config.root_plugins_allowed),
        };

        let dir = self.config.module_dir(&env, name);
        if dir.is_dir() && dir.join(QMLDIR).is_file() {
            Ok(Some(ModuleLocation {
                dir,
                env,
                plugin_allowed,
                substitute: None,
            }))
        } else {
            Ok(None)
        }
    }

    // =========================================================================
    // Manifest parsing
    // =========================================================================

    /// Copy the module's manifest into the output tree and parse the copy.
    fn load_manifest(&mut self, id: ModuleId) -> Result<()> {
        let (name, dir) = {
            let m = &self.modules[id.0];
            (m.name().to_string(), m.dir().to_path_buf())
        };

        let qmldir_out = self.tree.include(&dir.join(QMLDIR))?;
        let content = fs::read_to_string(&qmldir_out)
            .with_context(|| format!("Failed to read {}", qmldir_out.display()))?;

        let mut has_typeinfo = false;
        for line in content.lines() {
            match qmldir::parse_line(line) {
                Some(Directive::Type { name: ty, file }) => {
                    self.modules[id.0].declare_type(ty, dir.join(file));
                }
                Some(Directive::Plugin { name: plugin }) => {
                    self.modules[id.0].plugins.push(plugin.to_string());
                }
                Some(Directive::TypeInfo(file)) => {
                    has_typeinfo = true;
                    let path = dir.join(file);
                    let text = fs::read_to_string(&path).with_context(|| {
                        format!("Failed to read typeinfo {} of QML module {}", path.display(), name)
                    })?;
                    let exports = scan::plugin_exports(&text, &name);
                    self.modules[id.0].plugin_types.extend(exports);
                }
                Some(Directive::Import(dep)) => {
                    if let Some(dep_id) = self.resolve(dep, Some(id))? {
                        self.modules[id.0].imports.push(dep_id);
                    }
                }
                _ => {}
            }
        }

        let has_plugin = self.modules[id.0].has_plugin();
        if dir.join(FORCE_PLUGIN_MARKER).is_file() {
            if !has_plugin {
                return Err(BuildError::ForcePluginWithoutPlugin(name).into());
            }
            self.require_plugin(id);
        } else if has_plugin && !has_typeinfo {
            eprintln!(
                "  [WARN] QML module {} has a native Qt plugin but no typeinfo file; unable to assess plugin usage",
                name
            );
            self.require_plugin(id);
        }

        Ok(())
    }

    // =========================================================================
    // Type usage
    // =========================================================================

    /// Scan a QML file and include every type it uses.
    ///
    /// `path` is the source location; the materialized copy is what gets read,
    /// so fixups are visible to the scan.
    pub fn scan_file(
        &mut self,
        path: &Path,
        owner: Option<ModuleId>,
        includers: &[Includer],
    ) -> Result<()> {
        if !self.processed.insert(path.to_path_buf()) {
            return Ok(());
        }

        let out_path = self.tree.include(path)?;
        let includer = match owner {
            Some(id) => Includer::Module {
                module: self.modules[id.0].name().to_string(),
                file: path
                    .file_name()
                    .map(|f| f.to_string_lossy().into_owned())
                    .unwrap_or_default(),
            },
            None => Includer::Theme(PathBuf::from(self.tree.display_relative(&out_path))),
        };
        let mut chain = Vec::with_capacity(includers.len() + 1);
        chain.push(includer);
        chain.extend_from_slice(includers);
        tracing::debug!(file = %path.display(), "scanning");

        let code = fs::read_to_string(&out_path)
            .with_context(|| format!("Failed to read {}", out_path.display()))?;
        let code = scan::strip_comments(&code);

        let mut candidates: Vec<ModuleId> = owner.into_iter().collect();
        for name in scan::import_names(&code) {
            if let Some(id) = self.resolve(name, owner)? {
                if !candidates.contains(&id) {
                    candidates.push(id);
                }
            }
        }

        for ty in scan::type_identifiers(&code) {
            let target = candidates.iter().copied().find(|&id| self.provides(id, ty));
            if let Some(id) = target {
                self.include_type(id, ty, &chain)?;
            }
        }

        Ok(())
    }

    /// Whether `id`, directly or through its imports, can supply `ty`.
    pub fn provides(&self, id: ModuleId, ty: &str) -> bool {
        let mut seen = HashSet::new();
        let mut stack = vec![id];
        while let Some(id) = stack.pop() {
            if !seen.insert(id) {
                continue;
            }
            let m = &self.modules[id.0];
            if m.declares(ty) || m.exports(ty) {
                return true;
            }
            stack.extend(m.imports.iter().rev().copied());
        }
        false
    }

    /// Mark `ty` as used in module `id`.
    ///
    /// QML types get their files materialized and scanned, plugin types make
    /// the plugin required, and anything else is forwarded to every import.
    pub fn include_type(&mut self, id: ModuleId, ty: &str, includers: &[Includer]) -> Result<()> {
        if !self.visited.insert((id, ty.to_string())) {
            return Ok(());
        }

        let m = &mut self.modules[id.0];
        if m.is_included(ty) {
            return Ok(());
        }

        if let Some(files) = m.qml_types.get(ty).cloned() {
            m.record_include(ty, includers);
            tracing::debug!(module = m.name(), ty, "including QML type");
            for file in files {
                self.scan_file(&file, Some(id), includers)?;
            }
        } else if m.exports(ty) {
            m.record_include(ty, includers);
            tracing::debug!(module = m.name(), ty, "including plugin type");
            self.require_plugin(id);
        } else {
            let imports = m.imports.clone();
            for dep in imports {
                self.include_type(dep, ty, includers)?;
            }
        }

        Ok(())
    }

    /// Flip the module's plugin requirement, recording it as missing when the
    /// module may not ship native code.
    fn require_plugin(&mut self, id: ModuleId) {
        let m = &mut self.modules[id.0];
        if !m.require_plugin() {
            return;
        }
        if m.plugin_allowed() {
            return;
        }
        for plugin in &m.plugins {
            self.missing_plugins.push(MissingPlugin {
                module: id,
                artifact: plugin_artifact(plugin),
            });
        }
    }
}

/// Shared object file for a `plugin <name>` line.
pub fn plugin_artifact(plugin: &str) -> String {
    format!("lib{}.so", plugin)
}
