//! Per-module resolution state.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::{Path, PathBuf};

/// Index of a module inside its session's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModuleId(pub(crate) usize);

/// Why a type was pulled into the output. Only used for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Includer {
    /// A theme entry point, relative to the output root.
    Theme(PathBuf),
    /// A QML file belonging to a module.
    Module { module: String, file: String },
}

impl fmt::Display for Includer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Includer::Theme(path) => write!(f, "theme file {}", path.display()),
            Includer::Module { module, file } => write!(f, "module {} file {}", module, file),
        }
    }
}

/// Includers, most recent first.
pub type IncluderChain = Vec<Includer>;

/// A resolved QML module.
///
/// All usage state is monotonic: included types only accumulate and the
/// plugin requirement never flips back to false.
#[derive(Debug, Clone)]
pub struct QmlModule {
    name: String,
    dir: PathBuf,
    env: PathBuf,
    plugin_allowed: bool,
    plugin_required: bool,
    pub(crate) plugins: Vec<String>,
    pub(crate) qml_types: BTreeMap<String, Vec<PathBuf>>,
    pub(crate) plugin_types: BTreeSet<String>,
    pub(crate) imports: Vec<ModuleId>,
    included: BTreeMap<String, IncluderChain>,
}

impl QmlModule {
    pub(crate) fn new(name: &str, dir: PathBuf, env: PathBuf, plugin_allowed: bool) -> Self {
        Self {
            name: name.to_string(),
            dir,
            env,
            plugin_allowed,
            plugin_required: false,
            plugins: Vec::new(),
            qml_types: BTreeMap::new(),
            plugin_types: BTreeSet::new(),
            imports: Vec::new(),
            included: BTreeMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Source directory of the module.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Environment the module was found in; its own imports resolve there too.
    pub fn env(&self) -> &Path {
        &self.env
    }

    pub fn plugin_allowed(&self) -> bool {
        self.plugin_allowed
    }

    pub fn plugin_required(&self) -> bool {
        self.plugin_required
    }

    pub fn has_plugin(&self) -> bool {
        !self.plugins.is_empty()
    }

    pub fn is_used(&self) -> bool {
        self.plugin_required || !self.included.is_empty()
    }

    pub fn declares(&self, ty: &str) -> bool {
        self.qml_types.contains_key(ty)
    }

    pub fn exports(&self, ty: &str) -> bool {
        self.plugin_types.contains(ty)
    }

    pub fn is_included(&self, ty: &str) -> bool {
        self.included.contains_key(ty)
    }

    pub fn includers(&self, ty: &str) -> Option<&IncluderChain> {
        self.included.get(ty)
    }

    /// Plugin-provided types that ended up used, with their chains.
    pub fn used_plugin_types(&self) -> impl Iterator<Item = (&str, &IncluderChain)> {
        self.plugin_types
            .iter()
            .filter_map(|ty| self.included.get(ty).map(|chain| (ty.as_str(), chain)))
    }

    pub(crate) fn declare_type(&mut self, ty: &str, file: PathBuf) {
        let files = self.qml_types.entry(ty.to_string()).or_default();
        if !files.contains(&file) {
            files.push(file);
        }
    }

    /// Record `ty` as used. The first chain recorded wins.
    pub(crate) fn record_include(&mut self, ty: &str, chain: &[Includer]) -> bool {
        if self.included.contains_key(ty) {
            return false;
        }
        self.included.insert(ty.to_string(), chain.to_vec());
        true
    }

    /// Mark the plugin as required. Returns true on the first transition only.
    pub(crate) fn require_plugin(&mut self) -> bool {
        if self.plugin_required {
            return false;
        }
        self.plugin_required = true;
        true
    }
}

impl fmt::Display for QmlModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "QmlModule({})", self.name)
    }
}
