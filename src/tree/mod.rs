//! The output tree: path mapping, idempotent file inclusion and fixups.
//!
//! Every file that ends up in the minimized environment goes through
//! [`OutputTree::include`], which copies it on first reference and runs the
//! fixups configured for it.

mod clean;
mod fixups;
mod paths;

pub use clean::remove_empty_dirs;
pub use fixups::{FixupDirective, FixupSet, Selector};
pub use paths::{ensure_parent_exists, PathMapper};

use anyhow::{Context, Result};
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::error::BuildError;
use crate::process;

/// Output tree being populated during a build.
pub struct OutputTree {
    mapper: PathMapper,
    fixups: FixupSet,
}

impl OutputTree {
    pub fn new(mapper: PathMapper, fixups: FixupSet) -> Self {
        Self { mapper, fixups }
    }

    pub fn from_config(config: &Config) -> Self {
        let mapper = PathMapper::new(
            &config.raw_env,
            &config.out,
            config.substitutions.values().cloned(),
        );
        Self::new(mapper, config.fixups.clone())
    }

    pub fn out(&self) -> &Path {
        self.mapper.out()
    }

    pub fn map(&self, path: &Path) -> Result<PathBuf> {
        self.mapper.map(path)
    }

    /// Output-relative form of `out_path`, for messages.
    pub fn display_relative(&self, out_path: &Path) -> String {
        self.mapper
            .relative(out_path)
            .unwrap_or(out_path)
            .display()
            .to_string()
    }

    /// Copy `path` into the output tree, returning its output location.
    ///
    /// Directories are walked, symlinks have their target included and are
    /// recreated pointing at the included target, and regular files are copied
    /// only if nothing exists at the destination yet.
    pub fn include(&self, path: &Path) -> Result<PathBuf> {
        let out_path = self.mapper.map(path)?;
        let meta = fs::symlink_metadata(path)
            .with_context(|| format!("Failed to stat {}", path.display()))?;
        let file_type = meta.file_type();

        if file_type.is_symlink() {
            let link = fs::read_link(path)?;
            let target = path.parent().unwrap_or(Path::new("/")).join(link);
            let target = fs::canonicalize(&target).with_context(|| {
                format!("Dangling symlink {} -> {}", path.display(), target.display())
            })?;
            let out_target = self.include(&target)?;

            if fs::symlink_metadata(&out_path).is_err() {
                ensure_parent_exists(&out_path)?;
                std::os::unix::fs::symlink(&out_target, &out_path).with_context(|| {
                    format!("Failed to create symlink {}", out_path.display())
                })?;
            }
        } else if file_type.is_dir() {
            let mut entries = fs::read_dir(path)
                .with_context(|| format!("Failed to read directory {}", path.display()))?
                .map(|e| e.map(|e| e.path()))
                .collect::<io::Result<Vec<_>>>()?;
            entries.sort();
            for entry in entries {
                self.include(&entry)?;
            }
        } else if file_type.is_file() {
            if fs::symlink_metadata(&out_path).is_err() {
                copy_contents(path, &out_path)?;
                self.apply_fixups(&out_path)?;
            }
        } else {
            return Err(BuildError::UnexpectedFileType(path.to_path_buf()).into());
        }

        Ok(out_path)
    }

    /// Write generated content for `source` into the output tree and run its fixups.
    pub fn write(&self, source: &Path, content: &str) -> Result<PathBuf> {
        let out_path = self.mapper.map(source)?;
        ensure_parent_exists(&out_path)?;
        fs::write(&out_path, content)
            .with_context(|| format!("Failed to write {}", out_path.display()))?;
        self.apply_fixups(&out_path)?;
        Ok(out_path)
    }

    /// Run every fixup selecting `out_path`.
    pub fn apply_fixups(&self, out_path: &Path) -> Result<()> {
        if !out_path.is_file() {
            return Err(BuildError::MissingAfterCopy(out_path.to_path_buf()).into());
        }

        let rel = match self.mapper.relative(out_path) {
            Some(rel) if !rel.as_os_str().is_empty() => rel,
            _ => return Ok(()),
        };

        let fixups = self.fixups.matching(rel);
        if fixups.is_empty() {
            return Ok(());
        }

        println!("Applying fixups to {}", rel.display());
        for fixup in fixups {
            println!(" - {}", fixup.command);
            process::shell_on_target(&fixup.command, out_path)?;
        }
        Ok(())
    }

    /// Drop empty directories; an output tree with nothing left is an error.
    pub fn remove_empty_dirs(&self) -> Result<()> {
        if remove_empty_dirs(self.out())? {
            return Err(BuildError::EmptyOutput(self.out().to_path_buf()).into());
        }
        Ok(())
    }
}

/// Copy file contents only; the copy is always writable by us.
fn copy_contents(src: &Path, dst: &Path) -> Result<()> {
    ensure_parent_exists(dst)?;
    let mut reader =
        File::open(src).with_context(|| format!("Failed to open {}", src.display()))?;
    let mut writer =
        File::create(dst).with_context(|| format!("Failed to create {}", dst.display()))?;
    io::copy(&mut reader, &mut writer)
        .with_context(|| format!("Failed to copy {} to {}", src.display(), dst.display()))?;
    Ok(())
}
