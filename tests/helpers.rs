//! Shared test utilities for theme-env tests.

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use theme_env::config::{Attrs, Config, DEFAULT_QML_MODULE_DIR, THEMES_DIR};

/// Name of the theme every test writes its entry points into.
pub const THEME: &str = "test";

/// Test environment with a raw environment and an output root.
pub struct TestEnv {
    /// Temporary directory (kept alive for lifetime of TestEnv)
    pub _temp_dir: TempDir,
    /// Scratch space next to the environments
    pub root: PathBuf,
    /// Full environment the theme is built from
    pub raw_env: PathBuf,
    /// Output root
    pub out: PathBuf,
    pub substitutions: BTreeMap<String, PathBuf>,
    pub fixups: BTreeMap<String, String>,
    pub root_plugins_allowed: bool,
}

impl TestEnv {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let root = temp_dir.path().to_path_buf();
        let raw_env = root.join("raw-env");
        let out = root.join("out");
        fs::create_dir_all(&raw_env).expect("Failed to create raw env");

        Self {
            _temp_dir: temp_dir,
            root,
            raw_env,
            out,
            substitutions: BTreeMap::new(),
            fixups: BTreeMap::new(),
            root_plugins_allowed: true,
        }
    }

    /// Configuration for the current state of the environment.
    pub fn config(&self) -> Config {
        let attrs = Attrs {
            raw_env: self.raw_env.clone(),
            qml_modules: self.substitutions.clone(),
            fixups: self.fixups.clone(),
            qml_module_dir: None,
            root_plugins_allowed: Some(self.root_plugins_allowed),
        };
        Config::from_attrs(attrs, self.out.clone()).expect("Failed to build config")
    }

    /// Write a theme file (relative to the test theme directory).
    pub fn theme_file(&self, rel: &str, content: &str) -> PathBuf {
        let path = self.raw_env.join(THEMES_DIR).join(THEME).join(rel);
        write(&path, content);
        path
    }

    /// Write a module into the raw environment.
    pub fn module(&self, name: &str, qmldir: &str, files: &[(&str, &str)]) -> PathBuf {
        write_module(&self.raw_env, name, qmldir, files)
    }

    /// Write a module into a separate substitute package and register it.
    pub fn substitute(&mut self, name: &str, qmldir: &str, files: &[(&str, &str)]) -> PathBuf {
        let package = self.root.join(format!("subst-{}", name));
        let dir = write_module(&package, name, qmldir, files);
        self.substitutions.insert(name.to_string(), package);
        dir
    }

    /// Module directory inside the output tree.
    pub fn out_module(&self, name: &str) -> PathBuf {
        module_dir(&self.out, name)
    }

    /// Theme directory inside the raw environment.
    pub fn theme_source(&self) -> PathBuf {
        self.raw_env.join(THEMES_DIR).join(THEME)
    }

    /// Theme directory inside the output tree.
    pub fn out_theme(&self) -> PathBuf {
        self.out.join(THEMES_DIR).join(THEME)
    }
}

pub fn module_dir(env: &Path, name: &str) -> PathBuf {
    let mut dir = env.join(DEFAULT_QML_MODULE_DIR);
    for part in name.split('.') {
        dir.push(part);
    }
    dir
}

pub fn write_module(env: &Path, name: &str, qmldir: &str, files: &[(&str, &str)]) -> PathBuf {
    let dir = module_dir(env, name);
    write(&dir.join("qmldir"), qmldir);
    for (file, content) in files {
        write(&dir.join(file), content);
    }
    dir
}

pub fn write(path: &Path, content: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("Failed to create parent dir");
    }
    fs::write(path, content).expect("Failed to write file");
}

/// Typeinfo file exporting `types` on behalf of `module`.
pub fn qmltypes(module: &str, types: &[&str]) -> String {
    let mut out = String::from("import QtQuick.tooling 1.2\nModule {\n");
    for ty in types {
        out.push_str(&format!(
            "    Component {{\n        name: \"{ty}Impl\"\n        exports: [\"{module}/{ty} 1.0\"]\n    }}\n"
        ));
    }
    out.push_str("}\n");
    out
}

/// Assert that a file contains expected content.
pub fn assert_file_contains(path: &Path, expected: &str) {
    let content = fs::read_to_string(path)
        .unwrap_or_else(|e| panic!("Failed to read file {}: {}", path.display(), e));
    assert!(
        content.contains(expected),
        "File {} does not contain expected content.\nExpected to find: {}\nActual content: {}",
        path.display(),
        expected,
        content
    );
}

/// Assert that a file exists.
pub fn assert_file_exists(path: &Path) {
    assert!(path.exists(), "Expected file to exist: {}", path.display());
}

/// Assert that nothing exists at a path.
pub fn assert_absent(path: &Path) {
    assert!(
        path.symlink_metadata().is_err(),
        "Expected nothing at {}",
        path.display()
    );
}

/// Non-empty lines of a file.
pub fn lines(path: &Path) -> Vec<String> {
    fs::read_to_string(path)
        .unwrap_or_else(|e| panic!("Failed to read file {}: {}", path.display(), e))
        .lines()
        .filter(|l| !l.trim().is_empty())
        .map(str::to_string)
        .collect()
}
