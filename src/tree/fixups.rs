//! Post-copy fixup directives.
//!
//! The orchestrator supplies a map of selector -> newline separated shell
//! commands. A selector is either an exact output-relative file path or a
//! directory prefix ending in `/` (`./` selects the whole tree).

use anyhow::{bail, Result};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

/// What a fixup applies to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    /// Exactly this output-relative file.
    File(PathBuf),
    /// Every file below this output-relative directory (empty = whole tree).
    Dir(PathBuf),
}

impl Selector {
    pub fn parse(raw: &str) -> Result<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            bail!("Empty fixup selector");
        }
        if raw.starts_with('/') {
            bail!("Fixup selector {:?} must be relative to the output root", raw);
        }

        let stripped = raw.strip_prefix("./").unwrap_or(raw);
        if raw.ends_with('/') {
            Ok(Selector::Dir(PathBuf::from(stripped.trim_end_matches('/'))))
        } else {
            Ok(Selector::File(PathBuf::from(stripped)))
        }
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selector::File(path) => write!(f, "{}", path.display()),
            Selector::Dir(path) if path.as_os_str().is_empty() => write!(f, "./"),
            Selector::Dir(path) => write!(f, "{}/", path.display()),
        }
    }
}

/// A single command bound to a selector. The command sees `$target`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixupDirective {
    pub selector: Selector,
    pub command: String,
}

/// All configured fixups, in declaration order.
#[derive(Debug, Clone, Default)]
pub struct FixupSet {
    directives: Vec<FixupDirective>,
}

impl FixupSet {
    pub fn parse(raw: &BTreeMap<String, String>) -> Result<Self> {
        let mut directives = Vec::new();
        for (selector, commands) in raw {
            let selector = Selector::parse(selector)?;
            for command in commands.lines().map(str::trim).filter(|c| !c.is_empty()) {
                directives.push(FixupDirective {
                    selector: selector.clone(),
                    command: command.to_string(),
                });
            }
        }
        Ok(Self { directives })
    }

    pub fn len(&self) -> usize {
        self.directives.len()
    }

    pub fn is_empty(&self) -> bool {
        self.directives.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FixupDirective> {
        self.directives.iter()
    }

    /// Directives applying to `rel`: exact file matches first, then each
    /// ancestor directory from nearest to farthest.
    pub fn matching(&self, rel: &Path) -> Vec<&FixupDirective> {
        let mut found: Vec<&FixupDirective> = self
            .directives
            .iter()
            .filter(|d| matches!(&d.selector, Selector::File(p) if p == rel))
            .collect();

        for ancestor in rel.ancestors().skip(1) {
            found.extend(
                self.directives
                    .iter()
                    .filter(|d| matches!(&d.selector, Selector::Dir(p) if p == ancestor)),
            );
        }

        found
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(entries: &[(&str, &str)]) -> FixupSet {
        let raw = entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        FixupSet::parse(&raw).unwrap()
    }

    #[test]
    fn test_selector_forms() {
        assert_eq!(
            Selector::parse("share/a.qml").unwrap(),
            Selector::File(PathBuf::from("share/a.qml"))
        );
        assert_eq!(
            Selector::parse("lib/qt-6/").unwrap(),
            Selector::Dir(PathBuf::from("lib/qt-6"))
        );
        assert_eq!(Selector::parse("./").unwrap(), Selector::Dir(PathBuf::new()));
        assert_eq!(Selector::parse("./").unwrap().to_string(), "./");
        assert_eq!(Selector::parse("lib/qt-6/").unwrap().to_string(), "lib/qt-6/");
        assert!(Selector::parse("/abs/path").is_err());
    }

    #[test]
    fn test_multiline_commands_split() {
        let fixups = set(&[("a/b.qml", "one\n\ntwo\n")]);
        assert_eq!(fixups.len(), 2);
    }

    #[test]
    fn test_matching_order_file_then_nearest_dir() {
        let fixups = set(&[
            ("./", "root"),
            ("lib/", "lib"),
            ("lib/qt-6/", "qt"),
            ("lib/qt-6/Foo/qmldir", "exact"),
            ("share/", "unrelated"),
        ]);

        let commands: Vec<&str> = fixups
            .matching(Path::new("lib/qt-6/Foo/qmldir"))
            .iter()
            .map(|d| d.command.as_str())
            .collect();
        assert_eq!(commands, vec!["exact", "qt", "lib", "root"]);
    }

    #[test]
    fn test_dir_selector_does_not_match_sibling_prefix() {
        let fixups = set(&[("lib/qt/", "x")]);
        assert!(fixups.matching(Path::new("lib/qt-6/Foo/qmldir")).is_empty());
    }
}
