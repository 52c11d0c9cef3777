//! Retrieval-augmented answers with on-demand file supplementation.

mod reply;

pub use reply::{Reply, ReplySniffer, parse_reply};

use std::sync::Arc;

use repolens_index::context::format_context;
use repolens_index::{ChunkerConfig, Document, HybridIndex, SessionStore};
use repolens_llm::LlmProvider;
use tokio::sync::mpsc;
use tokio_stream::StreamExt;
use tokio_stream::wrappers::ReceiverStream;

use crate::config::ChatConfig;
use crate::error::{CoreError, Result};
use crate::ingest;
use crate::prompt;
use crate::source::FileSource;

const FRAGMENT_BUFFER: usize = 128;

/// Answers questions against a session's index.
pub struct ChatService<P, S> {
    llm: Arc<P>,
    source: Arc<S>,
    sessions: Arc<SessionStore>,
    config: ChatConfig,
    chunker: ChunkerConfig,
}

impl<P, S> std::fmt::Debug for ChatService<P, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatService")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

async fn send(out: &mpsc::Sender<String>, text: impl Into<String>) -> Result<()> {
    out.send(text.into())
        .await
        .map_err(|_| CoreError::ChannelClosed)
}

impl<P: LlmProvider, S: FileSource> ChatService<P, S> {
    #[must_use]
    pub fn new(
        llm: Arc<P>,
        source: Arc<S>,
        sessions: Arc<SessionStore>,
        config: ChatConfig,
        chunker: ChunkerConfig,
    ) -> Self {
        Self {
            llm,
            source,
            sessions,
            config,
            chunker,
        }
    }

    /// Answer `query` for `session_id`, sending answer fragments and
    /// supplementation notices to `out` in display order.
    ///
    /// # Errors
    ///
    /// Returns an error on LLM transport failure, a failed indexing task, or
    /// when `out` is closed.
    pub async fn respond(&self, session_id: &str, query: &str, out: &mpsc::Sender<String>) -> Result<()> {
        let index = self.sessions.get_or_create(session_id);
        let docs = index.search(query, self.config.top_k).await;
        tracing::debug!(session_id, hits = docs.len(), "retrieved context");
        let context = format_context(&docs, self.config.context_chars_per_doc);

        let prompt = prompt::answer(&context, query, true);
        let mut stream = ingest::open_stream(self.llm.as_ref(), &prompt).await?;
        let mut sniffer = ReplySniffer::new();
        while let Some(fragment) = stream.next().await {
            if let Some(text) = sniffer.push(&fragment?) {
                send(out, text).await?;
            }
        }

        match sniffer.finish() {
            None => Ok(()),
            Some(Reply::Answer(text)) => send(out, text).await,
            Some(Reply::FileRequest(path)) => {
                tracing::info!(session_id, path, "answer requested a file");
                send(out, format!("> Missing file requested: `{path}`\n\n")).await?;
                let prompt = match self.resolve(&index, &path, out).await? {
                    Some(docs) => {
                        let supplement = format_context(&docs, usize::MAX);
                        prompt::supplemented_answer(&path, &supplement, &context, query)
                    }
                    None => prompt::answer(&context, query, false),
                };
                self.stream_all(&prompt, out).await
            }
        }
    }

    /// Chunks of `path`, indexing it first when needed. `None` after telling
    /// the user why the file could not be resolved.
    async fn resolve(
        &self,
        index: &HybridIndex,
        path: &str,
        out: &mpsc::Sender<String>,
    ) -> Result<Option<Vec<Document>>> {
        if index.contains_file(path) {
            send(out, format!("> `{path}` is already indexed, using its full content\n\n")).await?;
            let docs = index.get_by_file(path);
            if !docs.is_empty() {
                return Ok(Some(docs));
            }
        }

        let Some(repo_url) = index.repo_url() else {
            tracing::warn!(path, "no repository recorded for session");
            send(
                out,
                format!("> Cannot download `{path}`: no repository is associated with this session. Run an exploration first.\n\n"),
            )
            .await?;
            return Ok(None);
        };

        send(out, format!("> Downloading and indexing `{path}`...\n\n")).await?;
        match ingest::fetch_and_index(self.source.as_ref(), index, &repo_url, path, &self.chunker).await? {
            Some(report) if report.added > 0 => Ok(Some(index.get_by_file(path))),
            Some(_) => {
                send(
                    out,
                    format!("> `{path}` was downloaded but has no indexable content.\n\n"),
                )
                .await?;
                Ok(None)
            }
            None => {
                send(
                    out,
                    format!("> Could not resolve `{path}`: the file does not exist or could not be downloaded.\n\n"),
                )
                .await?;
                Ok(None)
            }
        }
    }

    async fn stream_all(&self, prompt: &str, out: &mpsc::Sender<String>) -> Result<()> {
        let mut stream = ingest::open_stream(self.llm.as_ref(), prompt).await?;
        while let Some(fragment) = stream.next().await {
            let fragment = fragment?;
            if !fragment.is_empty() {
                send(out, fragment).await?;
            }
        }
        Ok(())
    }
}

impl<P, S> ChatService<P, S>
where
    P: LlmProvider + 'static,
    S: FileSource + 'static,
{
    /// Answer in a background task. A failure ends the stream with a
    /// user-visible error line.
    pub fn spawn(self: &Arc<Self>, session_id: String, query: String) -> ReceiverStream<String> {
        let (tx, rx) = mpsc::channel(FRAGMENT_BUFFER);
        let service = Arc::clone(self);
        tokio::spawn(async move {
            if let Err(e) = service.respond(&session_id, &query, &tx).await {
                tracing::error!(session_id, "chat failed: {e}");
                let _ = tx.send(format!("\n\nError: {e}")).await;
            }
        });
        ReceiverStream::new(rx)
    }
}
