//! Embedding text generation and context rendering for answer prompts.

use crate::document::{Chunk, Document};

/// Generate text optimized for embedding (not for display).
///
/// Prepends the file path and the `Class.name` scope so same-named methods
/// of different classes land apart. The stored chunk content is unchanged.
#[must_use]
pub fn contextualize_for_embedding(chunk: &Chunk) -> String {
    let meta = &chunk.metadata;
    let mut text = String::with_capacity(chunk.content.len() + 128);

    text.push_str("# ");
    text.push_str(&meta.file);
    text.push('\n');

    if !meta.class.is_empty() {
        text.push_str("# Scope: ");
        text.push_str(&meta.class);
        text.push('.');
        text.push_str(&meta.name);
        text.push('\n');
    }

    text.push_str(&chunk.content);
    text
}

/// Render retrieved documents as answer context.
///
/// Each document becomes a `--- File: <path> (Class: <C>) ---` block with its
/// content cut to `chars_per_doc` characters.
#[must_use]
pub fn format_context(documents: &[Document], chars_per_doc: usize) -> String {
    let mut out = String::new();
    for doc in documents {
        let meta = doc.metadata();
        out.push_str("--- File: ");
        out.push_str(&meta.file);
        if !meta.class.is_empty() {
            out.push_str(" (Class: ");
            out.push_str(&meta.class);
            out.push(')');
        }
        out.push_str(" ---\n");
        let content = doc.content();
        match content.char_indices().nth(chars_per_doc) {
            Some((idx, _)) => out.push_str(&content[..idx]),
            None => out.push_str(content),
        }
        out.push_str("\n\n");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{ChunkKind, ChunkMetadata};

    fn sample_chunk() -> Chunk {
        Chunk {
            content: "def run(self):\n    return 42".to_string(),
            metadata: ChunkMetadata {
                file: "app/jobs.py".to_string(),
                kind: ChunkKind::Method,
                name: "run".to_string(),
                class: "Job".to_string(),
                start_line: 3,
                end_line: 4,
            },
        }
    }

    #[test]
    fn contextualize_includes_file_path_and_scope() {
        let text = contextualize_for_embedding(&sample_chunk());
        assert!(text.starts_with("# app/jobs.py\n# Scope: Job.run\n"));
        assert!(text.ends_with("return 42"));
    }

    #[test]
    fn contextualize_empty_class_omits_scope() {
        let mut chunk = sample_chunk();
        chunk.metadata.class = String::new();
        let text = contextualize_for_embedding(&chunk);
        assert!(!text.contains("Scope:"));
    }

    #[test]
    fn format_context_marks_class_and_truncates() {
        let doc = Document::new(sample_chunk(), 0);
        let text = format_context(&[doc], 8);
        assert!(text.starts_with("--- File: app/jobs.py (Class: Job) ---\ndef run("));
        assert!(!text.contains("return"));
    }

    #[test]
    fn format_context_top_level_has_no_class_marker() {
        let mut chunk = sample_chunk();
        chunk.metadata.class = String::new();
        let text = format_context(&[Document::new(chunk, 0)], 2000);
        assert!(text.starts_with("--- File: app/jobs.py ---\n"));
    }

    #[test]
    fn format_context_empty() {
        assert!(format_context(&[], 100).is_empty());
    }
}
