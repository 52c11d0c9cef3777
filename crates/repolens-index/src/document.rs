//! Indexable fragments and the records the hybrid index stores them as.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChunkKind {
    Function,
    Method,
    Class,
    TextChunk,
    /// Text cut at the hard length cap.
    Raw,
    GlobalScript,
}

impl ChunkKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Function => "function",
            Self::Method => "method",
            Self::Class => "class",
            Self::TextChunk => "text_chunk",
            Self::Raw => "raw",
            Self::GlobalScript => "global_script",
        }
    }
}

impl std::fmt::Display for ChunkKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkMetadata {
    pub file: String,
    #[serde(rename = "type")]
    pub kind: ChunkKind,
    pub name: String,
    /// Enclosing type name, empty for top-level fragments.
    pub class: String,
    /// 1-based, inclusive.
    pub start_line: usize,
    /// 1-based, inclusive.
    pub end_line: usize,
}

/// One retrievable fragment of a source file. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    pub content: String,
    pub metadata: ChunkMetadata,
}

impl Chunk {
    #[must_use]
    pub fn file(&self) -> &str {
        &self.metadata.file
    }
}

/// A chunk plus its store-assigned `file#sequence` identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    #[serde(flatten)]
    pub chunk: Chunk,
}

impl Document {
    #[must_use]
    pub fn new(chunk: Chunk, sequence: usize) -> Self {
        Self {
            id: format!("{}#{sequence}", chunk.metadata.file),
            chunk,
        }
    }

    #[must_use]
    pub fn metadata(&self) -> &ChunkMetadata {
        &self.chunk.metadata
    }

    #[must_use]
    pub fn content(&self) -> &str {
        &self.chunk.content
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Chunk {
        Chunk {
            content: "def run(self):\n    pass".into(),
            metadata: ChunkMetadata {
                file: "app/worker.py".into(),
                kind: ChunkKind::Method,
                name: "run".into(),
                class: "Worker".into(),
                start_line: 4,
                end_line: 5,
            },
        }
    }

    #[test]
    fn document_id_is_file_and_sequence() {
        let doc = Document::new(sample(), 7);
        assert_eq!(doc.id, "app/worker.py#7");
    }

    #[test]
    fn metadata_serializes_kind_as_type() {
        let json = serde_json::to_value(&sample().metadata).unwrap();
        assert_eq!(json["type"], "method");
        assert_eq!(json["class"], "Worker");
    }

    #[test]
    fn kind_display_is_snake_case() {
        assert_eq!(ChunkKind::TextChunk.to_string(), "text_chunk");
        assert_eq!(ChunkKind::GlobalScript.to_string(), "global_script");
    }
}
