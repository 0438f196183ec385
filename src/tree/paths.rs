//! Mapping of source-environment paths into the output tree.

use anyhow::{bail, Result};
use std::fs;
use std::path::{Component, Path, PathBuf};

/// Translates absolute source paths into their location under the output root.
///
/// Known roots (the raw environment and every substitute package) have their
/// prefix swapped for the output root. Anything else, typically a symlink
/// target resolved into a sibling store path, loses as many leading
/// components as the raw environment has.
#[derive(Debug, Clone)]
pub struct PathMapper {
    out: PathBuf,
    roots: Vec<PathBuf>,
    depth: usize,
}

impl PathMapper {
    pub fn new(raw_env: &Path, out: &Path, extra_roots: impl IntoIterator<Item = PathBuf>) -> Self {
        let mut roots = vec![raw_env.to_path_buf()];
        roots.extend(extra_roots);
        Self {
            out: out.to_path_buf(),
            roots,
            depth: raw_env.components().count(),
        }
    }

    pub fn out(&self) -> &Path {
        &self.out
    }

    /// Output-tree path for `path`.
    ///
    /// Paths already inside the output tree map to themselves. Foreign paths
    /// too shallow to carry a package prefix have no place in the tree.
    pub fn map(&self, path: &Path) -> Result<PathBuf> {
        if !path.is_absolute() {
            bail!("Cannot map relative path {} into the output tree", path.display());
        }

        if path.starts_with(&self.out) {
            return Ok(path.to_path_buf());
        }

        for root in &self.roots {
            if let Ok(rel) = path.strip_prefix(root) {
                return Ok(self.out.join(rel));
            }
        }

        if path.components().count() <= self.depth {
            bail!(
                "Cannot map {} into the output tree: it lies outside every known environment",
                path.display()
            );
        }

        let rel: PathBuf = path
            .components()
            .skip(self.depth)
            .filter(|c| matches!(c, Component::Normal(_)))
            .collect();
        Ok(self.out.join(rel))
    }

    /// Path relative to the output root, if `out_path` lies inside it.
    pub fn relative<'a>(&self, out_path: &'a Path) -> Option<&'a Path> {
        out_path.strip_prefix(&self.out).ok()
    }
}

/// Ensure all parent directories of a file exist.
pub fn ensure_parent_exists(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    Ok(())
}
