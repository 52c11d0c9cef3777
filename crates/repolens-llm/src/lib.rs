//! Language-model capabilities: completion, streaming completion and embedding.

pub mod error;
#[cfg(feature = "mock")]
pub mod mock;
pub mod ollama;
pub mod provider;

pub use error::LlmError;
pub use provider::{ChatStream, EmbedFn, EmbedFuture, LlmProvider, Message, Role, embed_fn};
