//! `qmldir` manifest grammar.
//!
//! Each non-blank line is split on whitespace and classified. Lines we do not
//! understand are kept as [`Directive::Other`] so the rewriter can pass them
//! through untouched.

/// Manifest file name inside every module directory.
pub const QMLDIR: &str = "qmldir";

/// Marker file forcing a module's plugin into the output.
pub const FORCE_PLUGIN_MARKER: &str = "force-plugin";

/// Suffix of QML source files.
pub const QML_SUFFIX: &str = ".qml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive<'a> {
    /// `[internal] <Type> <version> <file>.qml` or `singleton <Type> <version> <file>.qml`
    Type { name: &'a str, file: &'a str },
    /// `[optional] plugin <name> [path]`
    Plugin { name: &'a str },
    /// `typeinfo <file>.qmltypes`
    TypeInfo(&'a str),
    /// `import <module> [version]`
    Import(&'a str),
    /// `depends <module> [version]`
    Depends(&'a str),
    /// `prefer <path>` (compiled-cache hint)
    Prefer,
    Other,
}

/// Classify one manifest line. Blank lines yield `None`.
pub fn parse_line(line: &str) -> Option<Directive<'_>> {
    let tokens: Vec<&str> = line.split_whitespace().collect();

    let directive = match tokens.as_slice() {
        &[] => return None,
        &[first, second, file] if file.ends_with(QML_SUFFIX) => Directive::Type {
            name: if first == "internal" { second } else { first },
            file,
        },
        &["singleton", name, _, file] if file.ends_with(QML_SUFFIX) => {
            Directive::Type { name, file }
        }
        &["plugin", name, ..] => Directive::Plugin { name },
        &["optional", "plugin", name, ..] => Directive::Plugin { name },
        &["typeinfo", file, ..] => Directive::TypeInfo(file),
        &["import", module, ..] => Directive::Import(module),
        &["depends", module, ..] => Directive::Depends(module),
        &["prefer", ..] => Directive::Prefer,
        _ => Directive::Other,
    };

    Some(directive)
}

/// Replace the file token (always the last one) of a type declaration line.
pub fn with_type_file(line: &str, file: &str) -> String {
    let mut tokens: Vec<&str> = line.split_whitespace().collect();
    if let Some(last) = tokens.last_mut() {
        *last = file;
    }
    tokens.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_declarations() {
        assert_eq!(
            parse_line("Widget 1.0 Widget.qml"),
            Some(Directive::Type { name: "Widget", file: "Widget.qml" })
        );
        assert_eq!(
            parse_line("  internal Helper private/Helper.qml  "),
            Some(Directive::Type { name: "Helper", file: "private/Helper.qml" })
        );
        assert_eq!(
            parse_line("singleton Theme 2.0 Theme.qml"),
            Some(Directive::Type { name: "Theme", file: "Theme.qml" })
        );
    }

    #[test]
    fn test_three_tokens_without_qml_suffix_is_other() {
        assert_eq!(parse_line("classname Foo Bar"), Some(Directive::Other));
    }

    #[test]
    fn test_plugin_forms() {
        assert_eq!(
            parse_line("plugin kirigamiplugin"),
            Some(Directive::Plugin { name: "kirigamiplugin" })
        );
        assert_eq!(
            parse_line("optional plugin corebindingsplugin ../lib"),
            Some(Directive::Plugin { name: "corebindingsplugin" })
        );
    }

    #[test]
    fn test_module_level_directives() {
        assert_eq!(parse_line("typeinfo plugins.qmltypes"), Some(Directive::TypeInfo("plugins.qmltypes")));
        assert_eq!(parse_line("import org.kde.kirigami auto"), Some(Directive::Import("org.kde.kirigami")));
        assert_eq!(parse_line("depends QtQuick 2.0"), Some(Directive::Depends("QtQuick")));
        assert_eq!(parse_line("prefer :/qt/qml/Foo/"), Some(Directive::Prefer));
        assert_eq!(parse_line("module org.kde.foo"), Some(Directive::Other));
        assert_eq!(parse_line("plugin"), Some(Directive::Other));
    }

    #[test]
    fn test_blank_lines_skipped() {
        assert_eq!(parse_line(""), None);
        assert_eq!(parse_line("   \t "), None);
    }

    #[test]
    fn test_with_type_file_rewrites_last_token() {
        assert_eq!(
            with_type_file("internal Helper 1.0 /nix/store/x/Helper.qml", "Helper.qml"),
            "internal Helper 1.0 Helper.qml"
        );
    }
}
