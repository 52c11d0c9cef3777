//! Error types for repolens-index.

/// Errors raised while preparing source text for indexing.
///
/// None of these escape [`crate::chunker::chunk`]; they drive its fallback paths.
#[derive(Debug, thiserror::Error)]
pub enum IndexError {
    /// Tree-sitter could not produce a clean tree.
    #[error("parse failed: {0}")]
    Parse(String),

    /// No grammar for this file.
    #[error("unsupported language")]
    UnsupportedLanguage,
}

/// Result type alias using `IndexError`.
pub type Result<T> = std::result::Result<T, IndexError>;
