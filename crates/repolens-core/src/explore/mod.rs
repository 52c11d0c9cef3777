//! Bounded exploration of a repository: plan, fetch, index, report.

mod event;
mod plan;
mod preview;
mod tree;

pub use event::{ExploreEvent, Step};
pub use plan::{PlanFilter, parse_plan, select_files};
pub(crate) use plan::strip_fences;
pub use preview::{knowledge_entry, preview};
pub use tree::{find_readme, smart_file_tree};

use std::collections::HashSet;
use std::sync::Arc;

use repolens_index::{ChunkerConfig, HybridIndex, SessionStore};
use repolens_llm::LlmProvider;
use tokio::sync::mpsc;
use tokio_stream::StreamExt;
use tokio_stream::wrappers::ReceiverStream;

use crate::config::ExploreConfig;
use crate::error::{CoreError, Result};
use crate::ingest;
use crate::prompt;
use crate::source::FileSource;

const EVENT_BUFFER: usize = 64;

enum Phase {
    Init,
    Planning,
    Fetching(Vec<String>),
    Indexing(Vec<(String, String)>),
    Report,
    Done,
}

impl Phase {
    fn name(&self) -> &'static str {
        match self {
            Self::Init => "init",
            Self::Planning => "planning",
            Self::Fetching(_) => "fetching",
            Self::Indexing(_) => "indexing",
            Self::Report => "report",
            Self::Done => "done",
        }
    }
}

/// What a completed run produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExploreSummary {
    /// Files read, in fetch order.
    pub visited: Vec<String>,
    pub rounds: usize,
    pub chunks: usize,
    pub report: String,
}

struct RunState {
    index: Arc<HybridIndex>,
    listing: HashSet<String>,
    tree: String,
    readme: Option<String>,
    round: usize,
    visited: HashSet<String>,
    visited_order: Vec<String>,
    knowledge: String,
    chunks: usize,
    report: String,
}

/// Runs exploration over a [`FileSource`] and indexes into a session.
pub struct Explorer<P, S> {
    llm: Arc<P>,
    source: Arc<S>,
    sessions: Arc<SessionStore>,
    config: ExploreConfig,
    chunker: ChunkerConfig,
}

impl<P, S> std::fmt::Debug for Explorer<P, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Explorer")
            .field("config", &self.config)
            .field("chunker", &self.chunker)
            .finish_non_exhaustive()
    }
}

async fn emit(events: &mpsc::Sender<ExploreEvent>, step: Step, message: impl Into<String>) -> Result<()> {
    events
        .send(ExploreEvent::new(step, message))
        .await
        .map_err(|_| CoreError::ChannelClosed)
}

impl<P: LlmProvider, S: FileSource> Explorer<P, S> {
    #[must_use]
    pub fn new(
        llm: Arc<P>,
        source: Arc<S>,
        sessions: Arc<SessionStore>,
        config: ExploreConfig,
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

    /// Explore `repo_url` into the index of `session_id`, sending progress to
    /// `events`. The last event sent is `finish` on success or `error` on
    /// failure. Whatever was indexed before a failure stays indexed.
    ///
    /// # Errors
    ///
    /// Returns the error that ended the run, after reporting it as an `error`
    /// event.
    pub async fn run(
        &self,
        repo_url: &str,
        session_id: &str,
        events: &mpsc::Sender<ExploreEvent>,
    ) -> Result<ExploreSummary> {
        match self.drive(repo_url, session_id, events).await {
            Ok(summary) => Ok(summary),
            Err(e) => {
                tracing::error!(repo_url, session_id, "exploration failed: {e}");
                if !matches!(e, CoreError::ChannelClosed) {
                    let _ = events.send(ExploreEvent::new(Step::Error, e.to_string())).await;
                }
                Err(e)
            }
        }
    }

    async fn drive(
        &self,
        repo_url: &str,
        session_id: &str,
        events: &mpsc::Sender<ExploreEvent>,
    ) -> Result<ExploreSummary> {
        let mut state = RunState {
            index: self.sessions.get_or_create(session_id),
            listing: HashSet::new(),
            tree: String::new(),
            readme: None,
            round: 0,
            visited: HashSet::new(),
            visited_order: Vec::new(),
            knowledge: String::new(),
            chunks: 0,
            report: String::new(),
        };

        let mut phase = Phase::Init;
        loop {
            tracing::debug!(session_id, round = state.round, phase = phase.name(), "exploration phase");
            phase = match phase {
                Phase::Init => self.init(repo_url, &mut state, events).await?,
                Phase::Planning => self.plan(&mut state, events).await?,
                Phase::Fetching(files) => self.fetch(repo_url, files, &mut state, events).await?,
                Phase::Indexing(fetched) => self.index(fetched, &mut state, events).await?,
                Phase::Report => self.report(&mut state, events).await?,
                Phase::Done => break,
            };
        }

        emit(events, Step::Finish, "Done").await?;
        tracing::info!(
            session_id,
            files = state.visited_order.len(),
            chunks = state.chunks,
            "exploration finished"
        );
        Ok(ExploreSummary {
            visited: state.visited_order,
            rounds: state.round,
            chunks: state.chunks,
            report: state.report,
        })
    }

    async fn init(
        &self,
        repo_url: &str,
        state: &mut RunState,
        events: &mpsc::Sender<ExploreEvent>,
    ) -> Result<Phase> {
        emit(events, Step::Init, format!("Connecting to {repo_url}")).await?;
        state.index.start_run(repo_url).await;

        let paths = self.source.list(repo_url).await;
        if paths.is_empty() {
            return Err(CoreError::EmptyListing(repo_url.to_owned()));
        }
        tracing::info!(repo_url, files = paths.len(), "repository listed");
        emit(events, Step::Fetched, format!("Found {} files", paths.len())).await?;

        state.tree = smart_file_tree(&paths, &self.config);
        state.readme = find_readme(&paths).map(str::to_owned);
        state.listing = paths.into_iter().collect();
        Ok(Phase::Planning)
    }

    async fn plan(&self, state: &mut RunState, events: &mpsc::Sender<ExploreEvent>) -> Result<Phase> {
        emit(
            events,
            Step::Thinking,
            format!("Round {}/{}: planning", state.round + 1, self.config.max_rounds),
        )
        .await?;

        let prompt = prompt::planning(
            &state.tree,
            &state.visited_order,
            &state.knowledge,
            self.config.max_files_per_round,
        );
        let reply = self.llm.complete(&prompt).await?;
        let planned = parse_plan(&reply);
        let files = select_files(
            planned,
            &PlanFilter {
                listing: &state.listing,
                visited: &state.visited,
                readme: state.readme.as_deref(),
                round: state.round,
                max_files: self.config.max_files_per_round,
            },
        );

        if files.is_empty() {
            tracing::info!(round = state.round, "planner selected nothing new, stopping");
            emit(events, Step::Plan, "No new files to read, wrapping up").await?;
            return Ok(Phase::Report);
        }
        emit(events, Step::Plan, format!("Reading: {}", files.join(", "))).await?;
        Ok(Phase::Fetching(files))
    }

    async fn fetch(
        &self,
        repo_url: &str,
        files: Vec<String>,
        state: &mut RunState,
        events: &mpsc::Sender<ExploreEvent>,
    ) -> Result<Phase> {
        let mut fetched = Vec::with_capacity(files.len());
        for path in files {
            emit(events, Step::Download, format!("Downloading {path}")).await?;
            let Some(content) = self.source.fetch(repo_url, &path).await else {
                tracing::warn!(path, "fetch failed, skipping");
                continue;
            };
            let summary = preview(&path, &content, self.config.preview_lines);
            state.knowledge.push_str(&knowledge_entry(&path, &summary));
            state.visited.insert(path.clone());
            state.visited_order.push(path.clone());
            fetched.push((path, content));
        }
        Ok(Phase::Indexing(fetched))
    }

    async fn index(
        &self,
        fetched: Vec<(String, String)>,
        state: &mut RunState,
        events: &mpsc::Sender<ExploreEvent>,
    ) -> Result<Phase> {
        if !fetched.is_empty() {
            emit(events, Step::Indexing, format!("Indexing {} files", fetched.len())).await?;
        }
        for (path, content) in fetched {
            let report = ingest::index_content(&state.index, &path, content, &self.chunker).await?;
            tracing::debug!(path, added = report.added, embedded = report.embedded, "file indexed");
            state.chunks += report.added;
        }

        state.round += 1;
        if state.round < self.config.max_rounds {
            Ok(Phase::Planning)
        } else {
            Ok(Phase::Report)
        }
    }

    async fn report(&self, state: &mut RunState, events: &mpsc::Sender<ExploreEvent>) -> Result<Phase> {
        emit(events, Step::Generating, "Writing the architecture report").await?;
        let prompt = prompt::report(
            &state.visited_order,
            &state.knowledge,
            self.config.knowledge_budget_chars,
        );
        let mut stream = ingest::open_stream(self.llm.as_ref(), &prompt).await?;
        while let Some(fragment) = stream.next().await {
            let fragment = fragment?;
            if fragment.is_empty() {
                continue;
            }
            state.report.push_str(&fragment);
            emit(events, Step::ReportChunk, fragment).await?;
        }
        Ok(Phase::Done)
    }
}

impl<P, S> Explorer<P, S>
where
    P: LlmProvider + 'static,
    S: FileSource + 'static,
{
    /// Run in a background task and return its event stream.
    pub fn spawn(self: &Arc<Self>, repo_url: String, session_id: String) -> ReceiverStream<ExploreEvent> {
        let (tx, rx) = mpsc::channel(EVENT_BUFFER);
        let explorer = Arc::clone(self);
        tokio::spawn(async move {
            let _ = explorer.run(&repo_url, &session_id, &tx).await;
        });
        ReceiverStream::new(rx)
    }
}
