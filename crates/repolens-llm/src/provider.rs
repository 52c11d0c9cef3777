use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use futures_core::Stream;
use serde::{Deserialize, Serialize};

use crate::error::LlmError;

/// Lazily produced answer fragments.
pub type ChatStream = Pin<Box<dyn Stream<Item = Result<String, LlmError>> + Send>>;

pub type EmbedFuture = Pin<Box<dyn Future<Output = Result<Vec<f32>, LlmError>> + Send>>;

/// Type-erased embedding capability, shared by every session index.
pub type EmbedFn = Arc<dyn Fn(&str) -> EmbedFuture + Send + Sync>;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    #[must_use]
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }
}

pub trait LlmProvider: Send + Sync {
    /// Send messages to the LLM and return the assistant response.
    ///
    /// # Errors
    ///
    /// Returns an error only on transport failure or an unusable response.
    fn chat(&self, messages: &[Message]) -> impl Future<Output = Result<String, LlmError>> + Send;

    /// Stream the assistant response as text fragments.
    ///
    /// # Errors
    ///
    /// Returns an error if the stream cannot be opened.
    fn chat_stream(
        &self,
        messages: &[Message],
    ) -> impl Future<Output = Result<ChatStream, LlmError>> + Send;

    fn supports_streaming(&self) -> bool;

    /// Embed a single text.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot produce a vector.
    fn embed(&self, text: &str) -> impl Future<Output = Result<Vec<f32>, LlmError>> + Send;

    fn supports_embeddings(&self) -> bool;

    fn name(&self) -> &str;

    /// Single-prompt completion.
    ///
    /// # Errors
    ///
    /// Propagates the error of [`LlmProvider::chat`].
    fn complete(&self, prompt: &str) -> impl Future<Output = Result<String, LlmError>> + Send {
        let messages = [Message::user(prompt)];
        async move { self.chat(&messages).await }
    }

    /// Single-prompt streaming completion. Providers without native streaming
    /// yield the whole answer as one fragment.
    ///
    /// # Errors
    ///
    /// Propagates the error of the underlying chat call.
    fn complete_stream(
        &self,
        prompt: &str,
    ) -> impl Future<Output = Result<ChatStream, LlmError>> + Send {
        let messages = [Message::user(prompt)];
        async move {
            if self.supports_streaming() {
                self.chat_stream(&messages).await
            } else {
                let text = self.chat(&messages).await?;
                let stream: ChatStream = Box::pin(tokio_stream::once(Ok(text)));
                Ok(stream)
            }
        }
    }
}

/// Wrap a provider's `embed` into a cloneable closure.
///
/// An empty vector from the backend is reported as [`LlmError::EmptyResponse`]
/// so callers only have one failure shape to handle. A provider without
/// embedding support is never called; every request fails with
/// [`LlmError::EmbedUnsupported`].
pub fn embed_fn<P>(provider: Arc<P>) -> EmbedFn
where
    P: LlmProvider + 'static,
{
    if !provider.supports_embeddings() {
        let name = provider.name().to_owned();
        tracing::debug!(provider = %name, "embeddings unsupported, indexes stay lexical-only");
        return Arc::new(move |_: &str| -> EmbedFuture {
            let provider = name.clone();
            Box::pin(async move { Err(LlmError::EmbedUnsupported { provider }) })
        });
    }
    Arc::new(move |text: &str| -> EmbedFuture {
        let p = Arc::clone(&provider);
        let owned = text.to_owned();
        Box::pin(async move {
            let vector = p.embed(&owned).await?;
            if vector.is_empty() {
                return Err(LlmError::EmptyResponse {
                    provider: p.name().to_owned(),
                });
            }
            Ok(vector)
        })
    })
}
