//! AST-aware chunking via tree-sitter with line-window fallback.
//!
//! Only top-level declarations are considered, plus one level of class body.
//! Every chunk carries whole source lines, and line numbers are 1-based and
//! inclusive. Files without a grammar, or whose tree contains syntax errors,
//! are split into fixed-size line windows instead.

use std::path::Path;

use tree_sitter::{Node, Parser, Tree};

use crate::document::{Chunk, ChunkKind, ChunkMetadata};
use crate::error::{IndexError, Result};
use crate::languages::{Lang, detect_language};

/// Docstring lines repeated in a method's synthetic header.
const MAX_HEADER_DOC_LINES: usize = 8;

/// Chunker configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkerConfig {
    /// Functions and methods shorter than this (in chars) are dropped (default: 50).
    pub min_chunk_chars: usize,
    /// Classes longer than this are decomposed per method (default: 1500).
    pub max_class_chars: usize,
    /// Lines per window in the fallback path (default: 100).
    pub window_lines: usize,
    /// Hard cap on chunk content; longer text is cut and tagged `raw` (default: 8000).
    pub max_chunk_chars: usize,
    /// Largest definition-free file kept as one `global_script` chunk (default: 2000).
    pub global_script_chars: usize,
}

impl Default for ChunkerConfig {
    fn default() -> Self {
        Self {
            min_chunk_chars: 50,
            max_class_chars: 1500,
            window_lines: 100,
            max_chunk_chars: 8000,
            global_script_chars: 2000,
        }
    }
}

/// Split one file into indexable chunks.
///
/// Never fails: parse problems degrade to windowing. Blank input yields no
/// chunks, any other input yields at least one.
#[must_use]
pub fn chunk(content: &str, file_path: &str, config: &ChunkerConfig) -> Vec<Chunk> {
    if content.trim().is_empty() {
        return Vec::new();
    }
    let lines: Vec<&str> = content.lines().collect();

    let Some(lang) = detect_language(Path::new(file_path)) else {
        return window(&lines, file_path, config);
    };

    let tree = match parse(content, lang) {
        Ok(tree) => tree,
        Err(e) => {
            tracing::debug!(file = file_path, error = %e, "falling back to line windows");
            return window(&lines, file_path, config);
        }
    };

    let ctx = ChunkCtx {
        source: content,
        lines: &lines,
        file_path,
        lang,
        config,
    };
    let chunks = ctx.walk(&tree.root_node());
    if chunks.is_empty() {
        return ctx.script_fallback();
    }
    chunks
}

fn parse(source: &str, lang: Lang) -> Result<Tree> {
    let grammar = lang.grammar().ok_or(IndexError::UnsupportedLanguage)?;

    let mut parser = Parser::new();
    parser
        .set_language(&grammar)
        .map_err(|e| IndexError::Parse(format!("set_language failed: {e}")))?;

    let tree = parser
        .parse(source, None)
        .ok_or_else(|| IndexError::Parse("parser produced no tree".into()))?;

    if tree.root_node().has_error() {
        return Err(IndexError::Parse(format!(
            "{} source contains syntax errors",
            lang.id()
        )));
    }
    Ok(tree)
}

/// Shared context for one file.
struct ChunkCtx<'a> {
    source: &'a str,
    lines: &'a [&'a str],
    file_path: &'a str,
    lang: Lang,
    config: &'a ChunkerConfig,
}

impl ChunkCtx<'_> {
    fn walk(&self, root: &Node) -> Vec<Chunk> {
        let mut output = Vec::new();
        let child_count = u32::try_from(root.named_child_count()).unwrap_or(u32::MAX);

        for i in 0..child_count {
            let Some(outer) = root.named_child(i) else {
                continue;
            };
            let node = self.unwrap_wrapper(outer);
            let kind = node.kind();

            if self.lang.function_kinds().contains(&kind) {
                self.push_function(&outer, self.name_of(&node), &mut output);
            } else if self.lang.receiver_method_kinds().contains(&kind) {
                self.push_receiver_method(&outer, &node, &mut output);
            } else if self.lang.class_kinds().contains(&kind) {
                self.push_class(&outer, &node, &mut output);
            } else if let Some(name) = self.declared_function_name(&node) {
                self.push_function(&outer, name, &mut output);
            }
        }
        output
    }

    fn push_function(&self, outer: &Node, name: String, output: &mut Vec<Chunk>) {
        let Some((start, end)) = self.rows(outer) else {
            return;
        };
        let text = self.line_text(start, end);
        if char_len(&text) < self.config.min_chunk_chars {
            return;
        }
        output.push(self.make_chunk(text, ChunkKind::Function, name, String::new(), start, end));
    }

    fn push_receiver_method(&self, outer: &Node, node: &Node, output: &mut Vec<Chunk>) {
        let Some((start, end)) = self.rows(outer) else {
            return;
        };
        let text = self.line_text(start, end);
        if char_len(&text) < self.config.min_chunk_chars {
            return;
        }
        let class = node
            .child_by_field_name("receiver")
            .map(|r| receiver_type(self.text(&r)))
            .unwrap_or_default();
        output.push(self.make_chunk(
            text,
            ChunkKind::Method,
            self.name_of(node),
            class,
            start,
            end,
        ));
    }

    fn push_class(&self, outer: &Node, node: &Node, output: &mut Vec<Chunk>) {
        let Some((start, end)) = self.rows(outer) else {
            return;
        };
        let text = self.line_text(start, end);
        let class_name = self.name_of(node);

        if char_len(&text) <= self.config.max_class_chars {
            output.push(self.make_chunk(
                text,
                ChunkKind::Class,
                class_name,
                String::new(),
                start,
                end,
            ));
            return;
        }

        let before = output.len();
        if let Some(body) = node.child_by_field_name("body") {
            let header = self.method_header(&class_name, &self.docstring(outer, node));
            let child_count = u32::try_from(body.named_child_count()).unwrap_or(u32::MAX);
            for i in 0..child_count {
                let Some(member) = body.named_child(i) else {
                    continue;
                };
                let method = self.unwrap_wrapper(member);
                if !self.lang.method_kinds().contains(&method.kind()) {
                    continue;
                }
                let Some((m_start, m_end)) = self.rows(&member) else {
                    continue;
                };
                let source = self.line_text(m_start, m_end);
                if char_len(&source) < self.config.min_chunk_chars {
                    continue;
                }
                output.push(self.make_chunk(
                    format!("{header}\n{source}"),
                    ChunkKind::Method,
                    self.name_of(&method),
                    class_name.clone(),
                    m_start,
                    m_end,
                ));
            }
        }

        // Nothing worth splitting out: keep the class whole, capped.
        if output.len() == before {
            output.push(self.make_chunk(
                text,
                ChunkKind::Class,
                class_name,
                String::new(),
                start,
                end,
            ));
        }
    }

    fn script_fallback(&self) -> Vec<Chunk> {
        if char_len(self.source) > self.config.global_script_chars {
            return window(self.lines, self.file_path, self.config);
        }
        let end = self.lines.len().max(1);
        vec![Chunk {
            content: self.source.to_owned(),
            metadata: ChunkMetadata {
                file: self.file_path.to_owned(),
                kind: ChunkKind::GlobalScript,
                name: "script".to_owned(),
                class: String::new(),
                start_line: 1,
                end_line: end,
            },
        }]
    }

    fn make_chunk(
        &self,
        content: String,
        kind: ChunkKind,
        name: String,
        class: String,
        start_row: usize,
        end_row: usize,
    ) -> Chunk {
        let (content, kind) = match truncate_chars(&content, self.config.max_chunk_chars) {
            Some(cut) => (cut.to_owned(), ChunkKind::Raw),
            None => (content, kind),
        };
        Chunk {
            content,
            metadata: ChunkMetadata {
                file: self.file_path.to_owned(),
                kind,
                name,
                class,
                start_line: start_row + 1,
                end_line: end_row + 1,
            },
        }
    }

    fn unwrap_wrapper<'t>(&self, node: Node<'t>) -> Node<'t> {
        if let Some((wrapper_kind, field)) = self.lang.wrapper()
            && node.kind() == wrapper_kind
            && let Some(inner) = node.child_by_field_name(field)
        {
            return inner;
        }
        node
    }

    /// Row span clamped to the file's lines. A node ending at column 0 does
    /// not own that last row.
    fn rows(&self, node: &Node) -> Option<(usize, usize)> {
        let last = self.lines.len().checked_sub(1)?;
        let start = node.start_position().row;
        let end_pos = node.end_position();
        let mut end = end_pos.row;
        if end_pos.column == 0 && end > start {
            end -= 1;
        }
        let end = end.min(last);
        (start <= end).then_some((start, end))
    }

    fn line_text(&self, start: usize, end: usize) -> String {
        self.lines[start..=end].join("\n")
    }

    fn text(&self, node: &Node) -> &str {
        &self.source[node.byte_range()]
    }

    fn name_of(&self, node: &Node) -> String {
        // Go: `type X struct {}` names the type_spec, not the declaration.
        if node.kind() == "type_declaration" {
            let child_count = u32::try_from(node.named_child_count()).unwrap_or(u32::MAX);
            for i in 0..child_count {
                if let Some(spec) = node.named_child(i)
                    && let Some(name) = spec.child_by_field_name("name")
                {
                    return self.text(&name).to_owned();
                }
            }
        }
        // tree-sitter-rust: impl_item uses "type" field, most others use "name"
        node.child_by_field_name("name")
            .or_else(|| node.child_by_field_name("type"))
            .map_or_else(|| node.kind().to_owned(), |n| self.text(&n).to_owned())
    }

    /// `const handler = () => {}` and friends in JS/TS.
    fn declared_function_name(&self, node: &Node) -> Option<String> {
        if !matches!(self.lang, Lang::JavaScript | Lang::TypeScript)
            || !matches!(node.kind(), "lexical_declaration" | "variable_declaration")
        {
            return None;
        }
        let declarator = node.named_child(0)?;
        if declarator.kind() != "variable_declarator" {
            return None;
        }
        let value = declarator.child_by_field_name("value")?;
        if !matches!(
            value.kind(),
            "arrow_function" | "function_expression" | "function"
        ) {
            return None;
        }
        let name = declarator.child_by_field_name("name")?;
        Some(self.text(&name).to_owned())
    }

    fn docstring(&self, outer: &Node, node: &Node) -> Vec<String> {
        if self.lang == Lang::Python {
            return self.python_docstring(node);
        }

        let mut comments = Vec::new();
        let mut boundary = outer.start_position().row;
        let mut cur = outer.prev_named_sibling();
        while let Some(prev) = cur {
            let Some((p_start, p_end)) = self.rows(&prev) else {
                break;
            };
            if p_end + 1 < boundary {
                break;
            }
            if prev.kind().contains("comment") {
                comments.push(self.text(&prev));
            } else if prev.kind() != "attribute_item" {
                break;
            }
            boundary = p_start;
            cur = prev.prev_named_sibling();
        }
        comments.reverse();

        comments
            .iter()
            .flat_map(|c| c.lines())
            .map(strip_comment_marker)
            .filter(|l| !l.is_empty())
            .map(str::to_owned)
            .collect()
    }

    fn python_docstring(&self, node: &Node) -> Vec<String> {
        let Some(first) = node
            .child_by_field_name("body")
            .and_then(|body| body.named_child(0))
        else {
            return Vec::new();
        };
        if first.kind() != "expression_statement" {
            return Vec::new();
        }
        let Some(string) = first.named_child(0).filter(|s| s.kind() == "string") else {
            return Vec::new();
        };
        string_body(self.text(&string))
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_owned)
            .collect()
    }

    fn method_header(&self, class_name: &str, doc: &[String]) -> String {
        let marker = self.lang.line_comment();
        let mut header = format!("{marker} Class: {class_name}");
        for line in doc.iter().take(MAX_HEADER_DOC_LINES) {
            header.push('\n');
            header.push_str(marker);
            header.push(' ');
            header.push_str(line);
        }
        header
    }
}

/// Text of a Python string literal without its prefix (`r`, `u`, `b`, `f`)
/// and quotes.
fn string_body(literal: &str) -> &str {
    literal
        .trim_start_matches(|c: char| matches!(c.to_ascii_lowercase(), 'r' | 'u' | 'b' | 'f'))
        .trim_matches(|c| c == '"' || c == '\'')
}

/// Fixed-size line windows; never fails.
fn window(lines: &[&str], file_path: &str, config: &ChunkerConfig) -> Vec<Chunk> {
    let size = config.window_lines.max(1);
    let mut output = Vec::new();

    for (i, group) in lines.chunks(size).enumerate() {
        let text = group.join("\n");
        if text.trim().is_empty() {
            continue;
        }
        let start_line = i * size + 1;
        let end_line = start_line + group.len() - 1;
        let (content, kind) = match truncate_chars(&text, config.max_chunk_chars) {
            Some(cut) => (cut.to_owned(), ChunkKind::Raw),
            None => (text, ChunkKind::TextChunk),
        };
        output.push(Chunk {
            content,
            metadata: ChunkMetadata {
                file: file_path.to_owned(),
                kind,
                name: format!("lines {start_line}-{end_line}"),
                class: String::new(),
                start_line,
                end_line,
            },
        });
    }
    output
}

fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// Returns the prefix of `text` holding `max` chars, or `None` if it already fits.
fn truncate_chars(text: &str, max: usize) -> Option<&str> {
    text.char_indices().nth(max).map(|(idx, _)| &text[..idx])
}

/// `(s *Server)` -> `Server`, `(l List[T])` -> `List`.
fn receiver_type(receiver: &str) -> String {
    let inner = receiver.trim().trim_start_matches('(').trim_end_matches(')');
    let ty = inner.split_whitespace().last().unwrap_or_default();
    let ty = ty.trim_start_matches('*');
    ty.split('[').next().unwrap_or_default().to_owned()
}

fn strip_comment_marker(line: &str) -> &str {
    let line = line.trim();
    let line = line.strip_suffix("*/").unwrap_or(line);
    ["///", "//!", "//", "/**", "/*", "*", "#"]
        .iter()
        .find_map(|marker| line.strip_prefix(marker))
        .unwrap_or(line)
        .trim()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn config() -> ChunkerConfig {
        ChunkerConfig::default()
    }

    fn small_class_config() -> ChunkerConfig {
        ChunkerConfig {
            max_class_chars: 60,
            ..ChunkerConfig::default()
        }
    }

    const PY_SAMPLE: &str = r#"import os


def fetch_remote_listing(repo_url):
    """Return every path in the remote repository."""
    parts = repo_url.rstrip("/").split("/")
    owner, name = parts[-2], parts[-1]
    return [owner, name]


class Greeter:
    """Says hello and goodbye."""

    def hello(self, name):
        message = "hello " + name
        print(message)
        return message

    def goodbye(self, name):
        message = "goodbye " + name
        print(message)
        return message
"#;

    #[test]
    fn blank_input_yields_nothing() {
        assert!(chunk("", "a.py", &config()).is_empty());
        assert!(chunk("  \n\t\n", "a.py", &config()).is_empty());
    }

    #[test]
    fn python_function_and_small_class() {
        let chunks = chunk(PY_SAMPLE, "app/greet.py", &config());
        assert_eq!(chunks.len(), 2);

        let f = &chunks[0].metadata;
        assert_eq!(f.kind, ChunkKind::Function);
        assert_eq!(f.name, "fetch_remote_listing");
        assert_eq!((f.start_line, f.end_line), (4, 8));
        assert!(f.class.is_empty());

        let c = &chunks[1].metadata;
        assert_eq!(c.kind, ChunkKind::Class);
        assert_eq!(c.name, "Greeter");
        assert_eq!(c.start_line, 11);
        assert!(chunks[1].content.starts_with("class Greeter:"));
    }

    #[test]
    fn oversized_class_is_split_into_methods_with_header() {
        let chunks = chunk(PY_SAMPLE, "app/greet.py", &small_class_config());
        let methods: Vec<_> = chunks
            .iter()
            .filter(|c| c.metadata.kind == ChunkKind::Method)
            .collect();
        assert_eq!(methods.len(), 2);
        for m in &methods {
            assert_eq!(m.metadata.class, "Greeter");
            assert!(m.content.starts_with("# Class: Greeter\n# Says hello and goodbye.\n"));
        }
        assert_eq!(methods[0].metadata.name, "hello");
        assert_eq!(methods[0].metadata.start_line, 14);
        assert_eq!(methods[1].metadata.name, "goodbye");
        assert!(methods[0].metadata.end_line < methods[1].metadata.start_line);
    }

    #[test]
    fn prefixed_docstring_loses_prefix_in_method_header() {
        let source = PY_SAMPLE.replace(r#""""Says hello"#, r#"r"""Says hello"#);
        let chunks = chunk(&source, "app/greet.py", &small_class_config());
        let method = chunks
            .iter()
            .find(|c| c.metadata.kind == ChunkKind::Method)
            .unwrap();
        assert!(method.content.starts_with("# Class: Greeter\n# Says hello and goodbye.\n"));
    }

    #[test]
    fn string_body_strips_prefixes_and_quotes() {
        assert_eq!(string_body(r#""""plain""""#), "plain");
        assert_eq!(string_body(r#"u'unicode'"#), "unicode");
        assert_eq!(string_body(r#"Rb"""raw bytes""""#), "raw bytes");
    }

    #[test]
    fn short_functions_are_dropped() {
        let source = "def a():\n    return 1\n\ndef b():\n    return 2\n";
        let chunks = chunk(source, "tiny.py", &config());
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].metadata.kind, ChunkKind::GlobalScript);
        assert_eq!(chunks[0].metadata.name, "script");
    }

    #[test]
    fn decorated_function_keeps_decorator_and_name() {
        let source = r"@app.route('/health')
def health_check_endpoint(request):
    status = {'ok': True, 'version': 3}
    return status
";
        let chunks = chunk(source, "api.py", &config());
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].metadata.name, "health_check_endpoint");
        assert_eq!(chunks[0].metadata.start_line, 1);
        assert!(chunks[0].content.starts_with("@app.route"));
    }

    #[test]
    fn oversized_class_with_only_tiny_methods_stays_whole() {
        let source = r"class Flags:
    ENABLED = True
    DISABLED = False
    NAMES = ['alpha', 'beta', 'gamma', 'delta']

    def on(self):
        pass
";
        let chunks = chunk(source, "flags.py", &small_class_config());
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].metadata.kind, ChunkKind::Class);
        assert_eq!(chunks[0].metadata.name, "Flags");
    }

    #[test]
    fn script_without_definitions_is_global_script() {
        let source = "import sys\nprint(sys.argv)\n";
        let chunks = chunk(source, "run.py", &config());
        assert_eq!(chunks.len(), 1);
        let m = &chunks[0].metadata;
        assert_eq!(m.kind, ChunkKind::GlobalScript);
        assert_eq!((m.start_line, m.end_line), (1, 2));
    }

    #[test]
    fn long_script_without_definitions_is_windowed() {
        let source: String = (0..250).map(|i| format!("value_{i} = {i}\n")).collect();
        let chunks = chunk(&source, "values.py", &config());
        assert_eq!(chunks.len(), 3);
        assert!(chunks.iter().all(|c| c.metadata.kind == ChunkKind::TextChunk));
        assert_eq!(chunks[2].metadata.start_line, 201);
        assert_eq!(chunks[2].metadata.end_line, 250);
    }

    #[test]
    fn malformed_source_falls_back_to_windows() {
        let source = "def broken(:\n    return ((\n";
        let chunks = chunk(source, "broken.py", &config());
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].metadata.kind, ChunkKind::TextChunk);
        assert_eq!(chunks[0].metadata.name, "lines 1-2");
    }

    #[test]
    fn unknown_extension_is_windowed() {
        let source: String = (0..130).map(|i| format!("line {i}\n")).collect();
        let chunks = chunk(&source, "docs/README.md", &config());
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].metadata.start_line, 1);
        assert_eq!(chunks[0].metadata.end_line, 100);
        assert_eq!(chunks[1].metadata.start_line, 101);
    }

    #[test]
    fn hard_cap_truncates_and_tags_raw() {
        let cfg = ChunkerConfig {
            max_chunk_chars: 40,
            global_script_chars: 10,
            ..ChunkerConfig::default()
        };
        let source = "x".repeat(120);
        let chunks = chunk(&source, "blob.txt", &cfg);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].metadata.kind, ChunkKind::Raw);
        assert_eq!(chunks[0].content.chars().count(), 40);
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        assert_eq!(truncate_chars("héllo", 2), Some("hé"));
        assert_eq!(truncate_chars("abc", 3), None);
    }

    #[test]
    fn rust_impl_is_a_class_and_splits_into_methods() {
        let source = r#"/// Keeps track of open connections.
#[derive(Debug)]
pub struct Pool {
    size: usize,
}

/// Pool operations.
impl Pool {
    pub fn acquire_connection(&mut self) -> usize {
        self.size += 1;
        self.size
    }

    pub fn release_connection(&mut self) -> usize {
        self.size -= 1;
        self.size
    }
}
"#;
        let chunks = chunk(source, "src/pool.rs", &small_class_config());
        let pool_struct = chunks
            .iter()
            .find(|c| c.metadata.kind == ChunkKind::Class)
            .unwrap();
        assert_eq!(pool_struct.metadata.name, "Pool");

        let methods: Vec<_> = chunks
            .iter()
            .filter(|c| c.metadata.kind == ChunkKind::Method)
            .collect();
        assert_eq!(methods.len(), 2);
        assert_eq!(methods[0].metadata.name, "acquire_connection");
        assert_eq!(methods[0].metadata.class, "Pool");
        assert!(methods[0].content.starts_with("// Class: Pool\n// Pool operations.\n"));
    }

    #[test]
    fn go_receiver_method_carries_receiver_type() {
        let source = r#"package server

type Server struct {
	addr string
}

func (s *Server) ListenAndServe(ctx context.Context) error {
	fmt.Println("listening on", s.addr)
	return nil
}
"#;
        let chunks = chunk(source, "server.go", &config());
        let method = chunks
            .iter()
            .find(|c| c.metadata.kind == ChunkKind::Method)
            .unwrap();
        assert_eq!(method.metadata.name, "ListenAndServe");
        assert_eq!(method.metadata.class, "Server");
        let ty = chunks
            .iter()
            .find(|c| c.metadata.kind == ChunkKind::Class)
            .unwrap();
        assert_eq!(ty.metadata.name, "Server");
    }

    #[test]
    fn js_exported_class_and_arrow_function() {
        let source = r"export class Router {
  route(path) {
    return this.table[path];
  }
}

const resolveHandlerForPath = (table, path) => {
  return table[path] || table['*'];
};
";
        let chunks = chunk(source, "src/router.js", &config());
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].metadata.kind, ChunkKind::Class);
        assert_eq!(chunks[0].metadata.name, "Router");
        assert!(chunks[0].content.starts_with("export class Router"));
        assert_eq!(chunks[1].metadata.kind, ChunkKind::Function);
        assert_eq!(chunks[1].metadata.name, "resolveHandlerForPath");
    }

    #[test]
    fn receiver_type_strips_pointer_and_generics() {
        assert_eq!(receiver_type("(s *Server)"), "Server");
        assert_eq!(receiver_type("(l List[T])"), "List");
        assert_eq!(receiver_type("(Config)"), "Config");
    }

    #[test]
    fn strip_comment_marker_variants() {
        assert_eq!(strip_comment_marker("/// doc"), "doc");
        assert_eq!(strip_comment_marker("// plain"), "plain");
        assert_eq!(strip_comment_marker(" * star"), "star");
        assert_eq!(strip_comment_marker("/** block */"), "block");
    }

    #[test]
    fn chunking_is_deterministic() {
        let a = chunk(PY_SAMPLE, "app/greet.py", &small_class_config());
        let b = chunk(PY_SAMPLE, "app/greet.py", &small_class_config());
        assert_eq!(a, b);
    }

    fn covered_lines(chunks: &[Chunk]) -> usize {
        chunks
            .iter()
            .map(|c| c.metadata.end_line - c.metadata.start_line + 1)
            .sum()
    }

    proptest! {
        #[test]
        fn non_blank_source_always_yields_chunks(
            body in "[a-z_():=\"# \n]{1,300}",
            ext in prop::sample::select(vec!["py", "rs", "js", "go", "md"]),
        ) {
            prop_assume!(!body.trim().is_empty());
            let path = format!("file.{ext}");
            let cfg = ChunkerConfig { window_lines: 7, ..ChunkerConfig::default() };
            let chunks = chunk(&body, &path, &cfg);
            prop_assert!(!chunks.is_empty());
            prop_assert!(covered_lines(&chunks) <= body.lines().count());
            for c in &chunks {
                prop_assert!(!c.content.is_empty());
                prop_assert!(c.content.chars().count() <= cfg.max_chunk_chars);
                prop_assert!(c.metadata.start_line >= 1);
                prop_assert!(c.metadata.start_line <= c.metadata.end_line);
            }
            prop_assert_eq!(chunks, chunk(&body, &path, &cfg));
        }
    }
}
