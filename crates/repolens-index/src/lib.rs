//! AST-aware chunking and session-scoped hybrid retrieval.
//!
//! Source files are split into function, method and class fragments by
//! tree-sitter, embedded through an injected capability, and served back by a
//! hybrid index that fuses cosine similarity with BM25.

pub mod chunker;
pub mod context;
pub mod dense;
pub mod document;
pub mod error;
pub mod fusion;
pub mod hybrid;
pub mod languages;
pub mod lexical;
pub mod session;

pub use chunker::{ChunkerConfig, chunk};
pub use document::{Chunk, ChunkKind, ChunkMetadata, Document};
pub use error::{IndexError, Result};
pub use hybrid::{AddReport, HybridIndex, ResetScope, RetrievalParams};
pub use session::SessionStore;
