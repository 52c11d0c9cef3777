#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("ollama request failed: {0}")]
    Ollama(#[from] ollama_rs::error::OllamaError),

    #[error("invalid endpoint {url}: {reason}")]
    Endpoint { url: String, reason: String },

    #[error("empty response from {provider}")]
    EmptyResponse { provider: String },

    #[error("embedding not supported by {provider}")]
    EmbedUnsupported { provider: String },

    #[error("stream failed: {0}")]
    Stream(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, LlmError>;
