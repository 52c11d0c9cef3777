/// Line prefixes that carry structure in source files.
const STRUCTURAL_PREFIXES: &[&str] = &[
    "import ", "from ", "class ", "def ", "async def ", "fn ", "pub ", "use ", "mod ", "impl ",
    "trait ", "struct ", "enum ", "func ", "type ", "package ", "function ", "export ", "interface ",
];

/// Short structural preview of a file: headings for Markdown, import and
/// definition lines for everything else. Only the first `max_lines` lines
/// are inspected.
#[must_use]
pub fn preview(path: &str, content: &str, max_lines: usize) -> String {
    let markdown = path.to_ascii_lowercase().ends_with(".md");
    content
        .lines()
        .take(max_lines)
        .map(str::trim)
        .filter(|line| {
            if markdown {
                line.starts_with('#')
            } else {
                STRUCTURAL_PREFIXES.iter().any(|p| line.starts_with(p))
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Knowledge summary entry for one file.
#[must_use]
pub fn knowledge_entry(path: &str, preview: &str) -> String {
    format!("\n--- File: {path} ---\n{preview}\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn markdown_keeps_headings() {
        let md = "# Title\nintro text\n## Usage\n  ### Nested\nmore";
        assert_eq!(preview("README.md", md, 100), "# Title\n## Usage\n### Nested");
    }

    #[test]
    fn python_keeps_imports_and_definitions() {
        let py = "import os\nfrom x import y\n\nclass A:\n    def run(self):\n        return 1\n";
        assert_eq!(
            preview("a.py", py, 100),
            "import os\nfrom x import y\nclass A:\ndef run(self):"
        );
    }

    #[test]
    fn rust_keeps_items() {
        let rs = "use std::fmt;\n\npub struct S;\nimpl S {\n    fn f() {}\n}\nlet x = 1;";
        assert_eq!(preview("s.rs", rs, 100), "use std::fmt;\npub struct S;\nimpl S {\nfn f() {}");
    }

    #[test]
    fn only_first_lines_are_inspected() {
        let py = "x = 1\nimport late\n";
        assert_eq!(preview("a.py", py, 1), "");
    }

    #[test]
    fn entry_format() {
        assert_eq!(knowledge_entry("a.py", "import os"), "\n--- File: a.py ---\nimport os\n");
    }
}
