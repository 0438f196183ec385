//! Lexical scanning of QML sources and `.qmltypes` files.
//!
//! No real parsing happens here. Type identifiers are over-approximated by
//! anything that looks like a capitalized identifier; names no module can
//! resolve are dropped by the caller.

use regex::Regex;
use std::collections::{BTreeSet, HashSet};
use std::sync::LazyLock;

static COMMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)//[^\n]*|/\*.*?\*/").expect("valid comment regex"));

static TYPE_IDENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[A-Z][A-Za-z0-9_]+").expect("valid type regex"));

static TYPEINFO_EXPORT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#""([a-zA-Z0-9.]+)/([A-Z][a-zA-Z0-9_]+) [^ ]+""#).expect("valid export regex")
});

/// Remove `//` line comments and non-nesting `/* */` block comments.
///
/// Both forms are matched in one left-to-right pass, so a `//` inside a block
/// comment (or the reverse) is handled by whichever opener comes first.
pub fn strip_comments(code: &str) -> String {
    COMMENT.replace_all(code, "").into_owned()
}

/// Module names from `import` lines, in declaration order.
///
/// Directory and script imports (`import "dir"`) are not modules and skipped.
pub fn import_names(code: &str) -> Vec<&str> {
    code.lines()
        .filter_map(|line| {
            let mut tokens = line.split_whitespace();
            match (tokens.next(), tokens.next()) {
                (Some("import"), Some(name)) if !name.starts_with('"') => {
                    Some(name.trim_end_matches(';'))
                }
                _ => None,
            }
        })
        .collect()
}

/// Candidate type identifiers, deduplicated, in order of first appearance.
pub fn type_identifiers(code: &str) -> Vec<&str> {
    let mut seen = HashSet::new();
    TYPE_IDENT
        .find_iter(code)
        .map(|m| m.as_str())
        .filter(|ty| seen.insert(*ty))
        .collect()
}

/// Types a `.qmltypes` file exports on behalf of `module`.
pub fn plugin_exports(typeinfo: &str, module: &str) -> BTreeSet<String> {
    TYPEINFO_EXPORT
        .captures_iter(typeinfo)
        .filter(|c| &c[1] == module)
        .map(|c| c[2].to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_line_and_block_comments() {
        let code = "import Foo // Hidden\nItem {\n/* Gone\n   AlsoGone */ Visible {}\n}\n";
        let stripped = strip_comments(code);
        assert!(!stripped.contains("Hidden"));
        assert!(!stripped.contains("Gone"));
        assert!(stripped.contains("Visible"));
        assert!(stripped.contains("Item"));
    }

    #[test]
    fn test_line_comment_inside_block_comment() {
        let stripped = strip_comments("/* a // b */ Kept");
        assert_eq!(stripped.trim(), "Kept");
    }

    #[test]
    fn test_block_comments_do_not_nest() {
        let stripped = strip_comments("/* outer /* inner */ Leaked */");
        assert!(stripped.contains("Leaked"));
    }

    #[test]
    fn test_import_names() {
        let code = "import QtQuick 2.15\nimport org.kde.plasma.core 2.0 as PlasmaCore\nimport \"components\"\n  import Foo.Bar\nItem {}\n";
        assert_eq!(
            import_names(code),
            vec!["QtQuick", "org.kde.plasma.core", "Foo.Bar"]
        );
    }

    #[test]
    fn test_type_identifiers_dedup_in_order() {
        let code = "Rectangle { Widget { id: w } Widget {} color: Theme.accent; x: 1 }";
        assert_eq!(type_identifiers(code), vec!["Rectangle", "Widget", "Theme"]);
    }

    #[test]
    fn test_single_letter_is_not_a_type() {
        assert!(type_identifiers("property int X: 3").is_empty());
    }

    #[test]
    fn test_plugin_exports_filter_by_module() {
        let qmltypes = r#"
            Component {
                name: "FooItem"
                exports: ["Foo.Plugin/FooItem 1.0", "Foo.Plugin/FooItem 2.0"]
            }
            Component {
                exports: ["Other.Module/Stranger 1.0"]
            }
            Component {
                exports: ["Foo.Plugin/BarItem 1.1"]
            }
        "#;
        let exports = plugin_exports(qmltypes, "Foo.Plugin");
        assert_eq!(
            exports.into_iter().collect::<Vec<_>>(),
            vec!["BarItem".to_string(), "FooItem".to_string()]
        );
    }
}
