//! Ollama backend.
//!
//! Exploration and chat only ever send one prompt, so [`LlmProvider::complete`]
//! and [`LlmProvider::complete_stream`] go straight to `/api/generate`.
//! Message lists use `/api/chat`.

use ollama_rs::Ollama;
use ollama_rs::generation::chat::ChatMessage;
use ollama_rs::generation::chat::request::ChatMessageRequest;
use ollama_rs::generation::completion::request::GenerationRequest;
use ollama_rs::generation::embeddings::request::{EmbeddingsInput, GenerateEmbeddingsRequest};
use tokio_stream::StreamExt;

use crate::error::LlmError;
use crate::provider::{ChatStream, LlmProvider, Message, Role};

const PROVIDER: &str = "ollama";

#[derive(Debug, Clone)]
pub struct OllamaProvider {
    client: Ollama,
    model: String,
    embedding_model: String,
}

impl OllamaProvider {
    /// Client for the server at `base_url`, e.g. `http://localhost:11434`.
    ///
    /// # Errors
    ///
    /// Returns [`LlmError::Endpoint`] if `base_url` is not a valid URL.
    pub fn new(
        base_url: &str,
        model: impl Into<String>,
        embedding_model: impl Into<String>,
    ) -> Result<Self, LlmError> {
        let client = Ollama::try_new(base_url).map_err(|e| LlmError::Endpoint {
            url: base_url.to_owned(),
            reason: e.to_string(),
        })?;
        Ok(Self {
            client,
            model: model.into(),
            embedding_model: embedding_model.into(),
        })
    }

    #[must_use]
    pub fn endpoint(&self) -> &str {
        self.client.url_str()
    }

    /// Check the server answers. Configured models it has not pulled are
    /// logged.
    ///
    /// # Errors
    ///
    /// Returns an error if the model list cannot be fetched.
    pub async fn health_check(&self) -> Result<(), LlmError> {
        let local = self.client.list_local_models().await?;
        for wanted in [&self.model, &self.embedding_model] {
            if !local.iter().any(|m| same_model(&m.name, wanted)) {
                tracing::warn!(model = %wanted, endpoint = self.endpoint(), "model not pulled on the Ollama server");
            }
        }
        Ok(())
    }
}

/// `llama3` names the same model as `llama3:latest`.
fn same_model(local: &str, wanted: &str) -> bool {
    local == wanted || (!wanted.contains(':') && local.strip_suffix(":latest") == Some(wanted))
}

fn chat_messages(messages: &[Message]) -> Vec<ChatMessage> {
    messages
        .iter()
        .map(|m| match m.role {
            Role::System => ChatMessage::system(m.content.clone()),
            Role::User => ChatMessage::user(m.content.clone()),
            Role::Assistant => ChatMessage::assistant(m.content.clone()),
        })
        .collect()
}

impl LlmProvider for OllamaProvider {
    async fn chat(&self, messages: &[Message]) -> Result<String, LlmError> {
        let request = ChatMessageRequest::new(self.model.clone(), chat_messages(messages));
        let response = self.client.send_chat_messages(request).await?;
        Ok(response.message.content)
    }

    async fn chat_stream(&self, messages: &[Message]) -> Result<ChatStream, LlmError> {
        let request = ChatMessageRequest::new(self.model.clone(), chat_messages(messages));
        let stream = self.client.send_chat_messages_stream(request).await?;
        Ok(Box::pin(stream.map(|item| {
            item.map(|r| r.message.content)
                .map_err(|()| LlmError::Stream("Ollama chat stream interrupted".into()))
        })))
    }

    async fn complete(&self, prompt: &str) -> Result<String, LlmError> {
        let request = GenerationRequest::new(self.model.clone(), prompt);
        Ok(self.client.generate(request).await?.response)
    }

    /// Each network read becomes one fragment holding every token it carried.
    async fn complete_stream(&self, prompt: &str) -> Result<ChatStream, LlmError> {
        let request = GenerationRequest::new(self.model.clone(), prompt);
        let stream = self.client.generate_stream(request).await?;
        Ok(Box::pin(stream.map(|batch| {
            batch
                .map(|responses| responses.into_iter().map(|r| r.response).collect::<String>())
                .map_err(LlmError::from)
        })))
    }

    fn supports_streaming(&self) -> bool {
        true
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, LlmError> {
        let request = GenerateEmbeddingsRequest::new(
            self.embedding_model.clone(),
            EmbeddingsInput::from(text),
        );
        let response = self.client.generate_embeddings(request).await?;
        response
            .embeddings
            .into_iter()
            .next()
            .ok_or_else(|| LlmError::EmptyResponse {
                provider: PROVIDER.into(),
            })
    }

    fn supports_embeddings(&self) -> bool {
        true
    }

    #[allow(clippy::unnecessary_literal_bound)]
    fn name(&self) -> &str {
        PROVIDER
    }
}
