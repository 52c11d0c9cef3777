//! Shared fetch, chunk and index path used by exploration and chat.

use repolens_index::{AddReport, ChunkerConfig, HybridIndex, chunk};
use repolens_llm::{ChatStream, LlmError, LlmProvider};

use crate::error::Result;
use crate::source::FileSource;

/// Chunk `content` on the blocking pool and add the chunks to `index`.
///
/// # Errors
///
/// Returns an error if the chunking task panics or is cancelled.
pub async fn index_content(
    index: &HybridIndex,
    path: &str,
    content: String,
    config: &ChunkerConfig,
) -> Result<AddReport> {
    let owned_path = path.to_owned();
    let config = config.clone();
    let chunks =
        tokio::task::spawn_blocking(move || chunk(&content, &owned_path, &config)).await?;
    tracing::debug!(path, chunks = chunks.len(), "file chunked");
    Ok(index.add(chunks).await)
}

/// Fetch one file and index it. `None` when the fetch failed.
///
/// # Errors
///
/// Propagates [`index_content`] errors.
pub async fn fetch_and_index<S: FileSource>(
    source: &S,
    index: &HybridIndex,
    repo_url: &str,
    path: &str,
    config: &ChunkerConfig,
) -> Result<Option<AddReport>> {
    let Some(content) = source.fetch(repo_url, path).await else {
        tracing::warn!(path, "fetch failed");
        return Ok(None);
    };
    index_content(index, path, content, config).await.map(Some)
}

/// Open a streaming completion, falling back to one non-streaming request
/// whose text becomes a single fragment.
///
/// # Errors
///
/// Returns the non-streaming error when both attempts fail.
pub async fn open_stream<P: LlmProvider>(llm: &P, prompt: &str) -> std::result::Result<ChatStream, LlmError> {
    match llm.complete_stream(prompt).await {
        Ok(stream) => Ok(stream),
        Err(e) => {
            tracing::warn!(provider = llm.name(), "streaming failed to start, retrying without streaming: {e}");
            let text = llm.complete(prompt).await?;
            Ok(Box::pin(tokio_stream::once(Ok(text))))
        }
    }
}
