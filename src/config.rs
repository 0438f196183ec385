//! Configuration management for theme-env.
//!
//! The build orchestrator hands us a JSON attribute file describing the raw
//! environment, module substitutions and fixups. The output root comes from
//! the `out` environment variable. A `.env` file in the working directory is
//! loaded first; real environment variables take precedence over it.

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::tree::FixupSet;

/// Environment variable naming the attribute file.
pub const ATTRS_ENV_VAR: &str = "NIX_ATTRS_JSON_FILE";

/// Environment variable naming the output root.
pub const OUT_ENV_VAR: &str = "out";

/// Default location of QML modules inside an environment.
pub const DEFAULT_QML_MODULE_DIR: &str = "lib/qt-6/qml";

/// Module names with this prefix belong to the base Qt installation.
pub const BASE_NAMESPACE_PREFIX: &str = "Qt";

/// Theme sources inside the raw environment.
pub const THEMES_DIR: &str = "share/sddm/themes";

/// Extra data trees copied wholesale when present.
pub const DATA_DIRS: &[&str] = &["share/locale", "share/icons"];

/// Raw attribute file as written by the build orchestrator.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attrs {
    pub raw_env: PathBuf,
    #[serde(default)]
    pub qml_modules: BTreeMap<String, PathBuf>,
    #[serde(default)]
    pub fixups: BTreeMap<String, String>,
    #[serde(default)]
    pub qml_module_dir: Option<PathBuf>,
    #[serde(default)]
    pub root_plugins_allowed: Option<bool>,
}

impl Attrs {
    /// Parse an attribute file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read attribute file {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Malformed attribute file {}", path.display()))
    }
}

/// Theme-env configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Full (unminimized) environment containing the theme and its modules
    pub raw_env: PathBuf,
    /// Output root the minimized environment is written to
    pub out: PathBuf,
    /// QML module name -> package providing a replacement for it
    pub substitutions: BTreeMap<String, PathBuf>,
    /// Post-copy fixup directives
    pub fixups: FixupSet,
    /// Module directory relative to an environment root
    pub qml_module_dir: PathBuf,
    /// Whether modules imported directly by the theme may ship native plugins
    pub root_plugins_allowed: bool,
}

impl Config {
    /// Build a configuration from an already parsed attribute file.
    pub fn from_attrs(attrs: Attrs, out: PathBuf) -> Result<Self> {
        if !attrs.raw_env.is_absolute() {
            bail!("rawEnv must be an absolute path, got {}", attrs.raw_env.display());
        }
        if !out.is_absolute() {
            bail!("Output root must be an absolute path, got {}", out.display());
        }
        for (name, package) in &attrs.qml_modules {
            if !package.is_absolute() {
                bail!(
                    "Substitute package for QML module {} must be an absolute path, got {}",
                    name,
                    package.display()
                );
            }
        }

        Ok(Self {
            raw_env: attrs.raw_env,
            out,
            substitutions: attrs.qml_modules,
            fixups: FixupSet::parse(&attrs.fixups)?,
            qml_module_dir: attrs
                .qml_module_dir
                .unwrap_or_else(|| PathBuf::from(DEFAULT_QML_MODULE_DIR)),
            root_plugins_allowed: attrs.root_plugins_allowed.unwrap_or(true),
        })
    }

    /// Load configuration from the attribute file and the environment.
    ///
    /// Explicit paths (from the command line) win over `NIX_ATTRS_JSON_FILE`
    /// and `out`.
    pub fn load(attrs_path: Option<PathBuf>, out: Option<PathBuf>) -> Result<Self> {
        let attrs_path = match attrs_path {
            Some(p) => p,
            None => std::env::var_os(ATTRS_ENV_VAR)
                .map(PathBuf::from)
                .with_context(|| {
                    format!("No attribute file given (use --attrs or set {})", ATTRS_ENV_VAR)
                })?,
        };
        let out = match out {
            Some(p) => p,
            None => std::env::var_os(OUT_ENV_VAR)
                .map(PathBuf::from)
                .with_context(|| {
                    format!("No output root given (use --out or set {})", OUT_ENV_VAR)
                })?,
        };

        let attrs = Attrs::load(&attrs_path)?;
        Self::from_attrs(attrs, out)
    }

    /// Directory holding theme sources.
    pub fn themes_dir(&self) -> PathBuf {
        self.raw_env.join(THEMES_DIR)
    }

    /// Directory of a dotted module name inside an environment.
    pub fn module_dir(&self, env: &Path, name: &str) -> PathBuf {
        let mut path = env.join(&self.qml_module_dir);
        for part in name.split('.') {
            path.push(part);
        }
        path
    }

    /// Print configuration for debugging.
    pub fn print(&self) {
        println!("Configuration:");
        println!("  RAW_ENV: {}", self.raw_env.display());
        println!("  OUT: {}", self.out.display());
        println!("  QML_MODULE_DIR: {}", self.qml_module_dir.display());
        println!("  ROOT_PLUGINS_ALLOWED: {}", self.root_plugins_allowed);
        if self.substitutions.is_empty() {
            println!("  Substitutions: none");
        } else {
            println!("  Substitutions:");
            for (name, package) in &self.substitutions {
                println!("    {} -> {}", name, package.display());
            }
        }
        println!("  Fixups: {} directive(s)", self.fixups.len());
        if self.themes_dir().is_dir() {
            println!("  Themes: FOUND");
        } else {
            println!("  Themes: NOT FOUND ({})", self.themes_dir().display());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn attrs_json() -> &'static str {
        r#"{
            "rawEnv": "/nix/store/aaaa-raw-env",
            "qmlModules": { "org.kde.kirigami": "/nix/store/bbbb-kirigami" },
            "fixups": { "share/sddm/themes/breeze/Main.qml": "sed -i s/a/b/ \"$target\"" }
        }"#
    }

    #[test]
    fn test_attrs_parse_defaults() {
        let attrs: Attrs = serde_json::from_str(attrs_json()).unwrap();
        let config = Config::from_attrs(attrs, PathBuf::from("/nix/store/cccc-out")).unwrap();

        assert_eq!(config.raw_env, PathBuf::from("/nix/store/aaaa-raw-env"));
        assert_eq!(config.qml_module_dir, PathBuf::from(DEFAULT_QML_MODULE_DIR));
        assert!(config.root_plugins_allowed);
        assert_eq!(config.fixups.len(), 1);
        assert_eq!(
            config.substitutions.get("org.kde.kirigami"),
            Some(&PathBuf::from("/nix/store/bbbb-kirigami"))
        );
    }

    #[test]
    fn test_module_dir_splits_dotted_name() {
        let attrs: Attrs = serde_json::from_str(attrs_json()).unwrap();
        let config = Config::from_attrs(attrs, PathBuf::from("/nix/store/cccc-out")).unwrap();

        assert_eq!(
            config.module_dir(Path::new("/env"), "org.kde.plasma.core"),
            PathBuf::from("/env/lib/qt-6/qml/org/kde/plasma/core")
        );
    }

    #[test]
    fn test_relative_raw_env_rejected() {
        let attrs: Attrs = serde_json::from_str(r#"{ "rawEnv": "relative/env" }"#).unwrap();
        assert!(Config::from_attrs(attrs, PathBuf::from("/out")).is_err());
    }

    #[test]
    fn test_missing_raw_env_is_malformed() {
        assert!(serde_json::from_str::<Attrs>(r#"{ "qmlModules": {} }"#).is_err());
    }

    #[test]
    #[serial]
    fn test_load_from_environment() {
        let dir = tempfile::TempDir::new().unwrap();
        let attrs_path = dir.path().join("attrs.json");
        fs::write(&attrs_path, attrs_json()).unwrap();

        std::env::set_var(ATTRS_ENV_VAR, &attrs_path);
        std::env::set_var(OUT_ENV_VAR, "/nix/store/dddd-out");
        let config = Config::load(None, None);
        std::env::remove_var(ATTRS_ENV_VAR);
        std::env::remove_var(OUT_ENV_VAR);

        let config = config.unwrap();
        assert_eq!(config.out, PathBuf::from("/nix/store/dddd-out"));
    }

    #[test]
    #[serial]
    fn test_load_without_attrs_fails() {
        std::env::remove_var(ATTRS_ENV_VAR);
        let err = Config::load(None, Some(PathBuf::from("/out"))).unwrap_err();
        assert!(err.to_string().contains(ATTRS_ENV_VAR));
    }
}
