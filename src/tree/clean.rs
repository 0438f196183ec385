//! Removal of directories left empty after pruning.

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

/// Remove every directory below (and including) `path` that has no
/// non-directory descendants. Returns true if `path` itself was removed.
///
/// Symlinks count as content, even when they point at directories.
pub fn remove_empty_dirs(path: &Path) -> Result<bool> {
    let mut is_empty = true;

    let entries =
        fs::read_dir(path).with_context(|| format!("Failed to read {}", path.display()))?;
    for entry in entries {
        let entry = entry?;
        let file_type = entry.file_type()?;
        if file_type.is_dir() && remove_empty_dirs(&entry.path())? {
            continue;
        }
        is_empty = false;
    }

    if is_empty {
        fs::remove_dir(path).with_context(|| format!("Failed to remove {}", path.display()))?;
    }

    Ok(is_empty)
}
