//! Language detection and tree-sitter grammar registry.

use std::path::Path;

use serde::{Deserialize, Serialize};

/// Source language the chunker can parse structurally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Lang {
    Python,
    JavaScript,
    TypeScript,
    Rust,
    Go,
}

impl Lang {
    #[must_use]
    pub fn id(self) -> &'static str {
        match self {
            Self::Python => "python",
            Self::JavaScript => "javascript",
            Self::TypeScript => "typescript",
            Self::Rust => "rust",
            Self::Go => "go",
        }
    }

    /// Get the tree-sitter grammar. Returns `None` if the
    /// corresponding feature is not enabled.
    #[must_use]
    pub fn grammar(self) -> Option<tree_sitter::Language> {
        match self {
            #[cfg(feature = "lang-python")]
            Self::Python => Some(tree_sitter_python::LANGUAGE.into()),
            #[cfg(feature = "lang-js")]
            Self::JavaScript => Some(tree_sitter_javascript::LANGUAGE.into()),
            #[cfg(feature = "lang-js")]
            Self::TypeScript => Some(tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into()),
            #[cfg(feature = "lang-rust")]
            Self::Rust => Some(tree_sitter_rust::LANGUAGE.into()),
            #[cfg(feature = "lang-go")]
            Self::Go => Some(tree_sitter_go::LANGUAGE.into()),
            #[allow(unreachable_patterns)]
            _ => None,
        }
    }

    /// Top-level node kinds chunked as free functions.
    #[must_use]
    pub fn function_kinds(self) -> &'static [&'static str] {
        match self {
            Self::Python => &["function_definition"],
            Self::JavaScript | Self::TypeScript => {
                &["function_declaration", "generator_function_declaration"]
            }
            Self::Rust => &["function_item"],
            Self::Go => &["function_declaration"],
        }
    }

    /// Top-level node kinds treated as classes.
    #[must_use]
    pub fn class_kinds(self) -> &'static [&'static str] {
        match self {
            Self::Python => &["class_definition"],
            Self::JavaScript => &["class_declaration"],
            Self::TypeScript => &["class_declaration", "abstract_class_declaration"],
            Self::Rust => &["impl_item", "trait_item", "struct_item", "enum_item"],
            Self::Go => &["type_declaration"],
        }
    }

    /// Node kinds inside a class body that become method chunks.
    #[must_use]
    pub fn method_kinds(self) -> &'static [&'static str] {
        match self {
            Self::Python => &["function_definition"],
            Self::JavaScript | Self::TypeScript => &["method_definition"],
            Self::Rust => &["function_item"],
            Self::Go => &[],
        }
    }

    /// Top-level method kinds declared outside their type (Go receivers).
    #[must_use]
    pub fn receiver_method_kinds(self) -> &'static [&'static str] {
        match self {
            Self::Go => &["method_declaration"],
            _ => &[],
        }
    }

    /// Wrapper node kind and the field holding the wrapped definition.
    #[must_use]
    pub fn wrapper(self) -> Option<(&'static str, &'static str)> {
        match self {
            Self::Python => Some(("decorated_definition", "definition")),
            Self::JavaScript | Self::TypeScript => Some(("export_statement", "declaration")),
            Self::Rust | Self::Go => None,
        }
    }

    /// Line comment marker used for synthetic method headers.
    #[must_use]
    pub fn line_comment(self) -> &'static str {
        match self {
            Self::Python => "#",
            _ => "//",
        }
    }
}

impl std::fmt::Display for Lang {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.id())
    }
}

/// Detect language from file extension.
#[must_use]
pub fn detect_language(path: &Path) -> Option<Lang> {
    let ext = path.extension()?.to_str()?;
    match ext {
        "py" | "pyi" => Some(Lang::Python),
        "js" | "jsx" | "mjs" | "cjs" => Some(Lang::JavaScript),
        "ts" | "tsx" | "mts" | "cts" => Some(Lang::TypeScript),
        "rs" => Some(Lang::Rust),
        "go" => Some(Lang::Go),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detect_language_py() {
        assert_eq!(detect_language(Path::new("app/main.py")), Some(Lang::Python));
    }

    #[test]
    fn detect_language_js_variants() {
        for ext in &["js", "jsx", "mjs", "cjs"] {
            let path = format!("file.{ext}");
            assert_eq!(
                detect_language(Path::new(&path)),
                Some(Lang::JavaScript),
                "failed for .{ext}"
            );
        }
    }

    #[test]
    fn detect_language_ts_variants() {
        for ext in &["ts", "tsx", "mts", "cts"] {
            let path = format!("file.{ext}");
            assert_eq!(
                detect_language(Path::new(&path)),
                Some(Lang::TypeScript),
                "failed for .{ext}"
            );
        }
    }

    #[test]
    fn detect_language_documentation_is_none() {
        assert_eq!(detect_language(Path::new("README.md")), None);
        assert_eq!(detect_language(Path::new("config.yaml")), None);
        assert_eq!(detect_language(Path::new("Dockerfile")), None);
    }

    #[test]
    fn grammar_returns_some_for_enabled_features() {
        #[cfg(feature = "lang-python")]
        assert!(Lang::Python.grammar().is_some());
        #[cfg(feature = "lang-js")]
        {
            assert!(Lang::JavaScript.grammar().is_some());
            assert!(Lang::TypeScript.grammar().is_some());
        }
        #[cfg(feature = "lang-rust")]
        assert!(Lang::Rust.grammar().is_some());
        #[cfg(feature = "lang-go")]
        assert!(Lang::Go.grammar().is_some());
    }

    #[test]
    fn only_go_has_receiver_methods() {
        assert_eq!(Lang::Go.receiver_method_kinds(), &["method_declaration"]);
        assert!(Lang::Rust.receiver_method_kinds().is_empty());
        assert!(Lang::Go.method_kinds().is_empty());
    }

    #[test]
    fn lang_id_matches_display() {
        for lang in [
            Lang::Python,
            Lang::JavaScript,
            Lang::TypeScript,
            Lang::Rust,
            Lang::Go,
        ] {
            assert_eq!(lang.to_string(), lang.id());
        }
    }
}
