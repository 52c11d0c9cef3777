//! Test-only mock LLM provider.

use std::sync::{Arc, Mutex, PoisonError};

use crate::provider::{ChatStream, LlmProvider, Message};

/// Maps a text to a vector. Lets tests plug in deterministic embedders.
pub type EmbedMapper = Arc<dyn Fn(&str) -> Vec<f32> + Send + Sync>;

#[derive(Clone)]
pub struct MockProvider {
    responses: Arc<Mutex<Vec<String>>>,
    prompts: Arc<Mutex<Vec<String>>>,
    pub default_response: String,
    pub embedding: Vec<f32>,
    pub embed_mapper: Option<EmbedMapper>,
    pub supports_embeddings: bool,
    pub streaming: bool,
    pub fail_chat: bool,
    pub fail_stream: bool,
    /// Milliseconds to sleep before returning a response.
    pub delay_ms: u64,
}

impl std::fmt::Debug for MockProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockProvider")
            .field("default_response", &self.default_response)
            .field("supports_embeddings", &self.supports_embeddings)
            .field("streaming", &self.streaming)
            .field("fail_chat", &self.fail_chat)
            .field("fail_stream", &self.fail_stream)
            .finish_non_exhaustive()
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self {
            responses: Arc::new(Mutex::new(Vec::new())),
            prompts: Arc::new(Mutex::new(Vec::new())),
            default_response: "mock response".into(),
            embedding: vec![0.0; 384],
            embed_mapper: None,
            supports_embeddings: false,
            streaming: false,
            fail_chat: false,
            fail_stream: false,
            delay_ms: 0,
        }
    }
}

impl MockProvider {
    #[must_use]
    pub fn with_responses(responses: Vec<String>) -> Self {
        Self {
            responses: Arc::new(Mutex::new(responses)),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn failing() -> Self {
        Self {
            fail_chat: true,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_streaming(mut self) -> Self {
        self.streaming = true;
        self
    }

    #[must_use]
    pub fn with_failing_stream(mut self) -> Self {
        self.streaming = true;
        self.fail_stream = true;
        self
    }

    #[must_use]
    pub fn with_delay(mut self, ms: u64) -> Self {
        self.delay_ms = ms;
        self
    }

    #[must_use]
    pub fn with_embedder(mut self, mapper: impl Fn(&str) -> Vec<f32> + Send + Sync + 'static) -> Self {
        self.supports_embeddings = true;
        self.embed_mapper = Some(Arc::new(mapper));
        self
    }

    /// Last-message contents of every chat call so far, in order.
    #[must_use]
    pub fn prompts(&self) -> Vec<String> {
        self.prompts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl LlmProvider for MockProvider {
    #[allow(clippy::unnecessary_literal_bound)]
    fn name(&self) -> &str {
        "mock"
    }

    async fn chat(&self, messages: &[Message]) -> Result<String, crate::LlmError> {
        if self.delay_ms > 0 {
            tokio::time::sleep(std::time::Duration::from_millis(self.delay_ms)).await;
        }
        if let Some(last) = messages.last() {
            self.prompts
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(last.content.clone());
        }
        if self.fail_chat {
            return Err(crate::LlmError::Other("mock LLM error".into()));
        }
        let mut responses = self.responses.lock().unwrap_or_else(PoisonError::into_inner);
        if responses.is_empty() {
            Ok(self.default_response.clone())
        } else {
            Ok(responses.remove(0))
        }
    }

    async fn chat_stream(&self, messages: &[Message]) -> Result<ChatStream, crate::LlmError> {
        if self.fail_stream {
            return Err(crate::LlmError::Stream("mock stream error".into()));
        }
        let response = self.chat(messages).await?;
        let chunks: Vec<_> = response.chars().map(|c| c.to_string()).map(Ok).collect();
        Ok(Box::pin(tokio_stream::iter(chunks)))
    }

    fn supports_streaming(&self) -> bool {
        self.streaming
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, crate::LlmError> {
        if !self.supports_embeddings {
            return Err(crate::LlmError::EmbedUnsupported {
                provider: "mock".into(),
            });
        }
        match &self.embed_mapper {
            Some(mapper) => Ok(mapper(text)),
            None => Ok(self.embedding.clone()),
        }
    }

    fn supports_embeddings(&self) -> bool {
        self.supports_embeddings
    }
}
