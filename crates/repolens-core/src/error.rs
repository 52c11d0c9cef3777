#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("LLM error: {0}")]
    Llm(#[from] repolens_llm::LlmError),

    #[error("background task failed: {0}")]
    Join(#[from] tokio::task::JoinError),

    #[error("repository listing is empty: {0}")]
    EmptyListing(String),

    #[error("event receiver dropped")]
    ChannelClosed,
}

pub type Result<T> = std::result::Result<T, CoreError>;
