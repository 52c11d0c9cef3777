//! Session-scoped hybrid index: dense cosine search plus BM25, fused by rank.
//!
//! Writers (`add`, `reset`, `start_run`) are serialized by an async gate and
//! compute embeddings before touching shared state, which is then swapped in
//! under a short write lock. Readers take a read lock for the whole ranking,
//! so they observe either the state before a write or the state after it.

use std::collections::HashSet;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use repolens_llm::EmbedFn;

use crate::context::contextualize_for_embedding;
use crate::dense::DenseIndex;
use crate::document::{Chunk, Document};
use crate::fusion::{RankedList, reciprocal_rank_fusion};
use crate::lexical::LexicalIndex;

/// Fusion parameters. The dense weight must exceed the lexical weight.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetrievalParams {
    pub rrf_k: f32,
    pub dense_weight: f32,
    pub lexical_weight: f32,
}

impl Default for RetrievalParams {
    fn default() -> Self {
        Self {
            rrf_k: 60.0,
            dense_weight: 1.0,
            lexical_weight: 0.3,
        }
    }
}

/// What a reset clears besides the indexed content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetScope {
    /// Documents, both indexes and the indexed-file set. `repo_url` survives.
    IndexOnly,
    /// Everything, including `repo_url`.
    Everything,
}

/// Outcome of one `add` batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AddReport {
    pub added: usize,
    /// Chunks that also made it into the dense index.
    pub embedded: usize,
}

#[derive(Default)]
struct IndexState {
    documents: Vec<Document>,
    dense: DenseIndex,
    lexical: LexicalIndex,
    indexed_files: HashSet<String>,
}

pub struct HybridIndex {
    session_id: String,
    embed: EmbedFn,
    params: RetrievalParams,
    state: RwLock<IndexState>,
    repo_url: RwLock<Option<String>>,
    write_gate: tokio::sync::Mutex<()>,
}

impl std::fmt::Debug for HybridIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HybridIndex")
            .field("session_id", &self.session_id)
            .field("params", &self.params)
            .field("documents", &self.len())
            .finish_non_exhaustive()
    }
}

impl HybridIndex {
    #[must_use]
    pub fn new(session_id: impl Into<String>, embed: EmbedFn, params: RetrievalParams) -> Self {
        Self {
            session_id: session_id.into(),
            embed,
            params,
            state: RwLock::new(IndexState::default()),
            repo_url: RwLock::new(None),
            write_gate: tokio::sync::Mutex::new(()),
        }
    }

    #[must_use]
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    fn read_state(&self) -> RwLockReadGuard<'_, IndexState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, IndexState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Clear indexed content. See [`ResetScope`] for `repo_url` handling.
    pub async fn reset(&self, scope: ResetScope) {
        let _gate = self.write_gate.lock().await;
        *self.write_state() = IndexState::default();
        if scope == ResetScope::Everything {
            *self.repo_url.write().unwrap_or_else(PoisonError::into_inner) = None;
        }
        tracing::debug!(session = %self.session_id, ?scope, "index reset");
    }

    /// Begin an exploration run: wipe everything, then record `repo_url`.
    ///
    /// Both steps happen under the write gate, so the assignment always
    /// follows the wipe and no writer can slip in between.
    pub async fn start_run(&self, repo_url: &str) {
        let _gate = self.write_gate.lock().await;
        *self.write_state() = IndexState::default();
        *self.repo_url.write().unwrap_or_else(PoisonError::into_inner) = Some(repo_url.to_owned());
        tracing::info!(session = %self.session_id, repo_url, "index reset for new run");
    }

    #[must_use]
    pub fn repo_url(&self) -> Option<String> {
        self.repo_url
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Append chunks. A chunk whose embedding fails stays lexically searchable
    /// but is left out of the dense index. The lexical index is rebuilt over
    /// the whole store afterwards.
    pub async fn add(&self, chunks: Vec<Chunk>) -> AddReport {
        if chunks.is_empty() {
            return AddReport::default();
        }
        let _gate = self.write_gate.lock().await;

        let mut vectors = Vec::with_capacity(chunks.len());
        for chunk in &chunks {
            let text = contextualize_for_embedding(chunk);
            match (self.embed)(&text).await {
                Ok(v) if !v.is_empty() => vectors.push(Some(v)),
                Ok(_) => {
                    tracing::warn!(file = chunk.file(), "empty embedding, chunk kept lexical-only");
                    vectors.push(None);
                }
                Err(e) => {
                    tracing::warn!(file = chunk.file(), error = %e, "embedding failed, chunk kept lexical-only");
                    vectors.push(None);
                }
            }
        }

        let mut state = self.write_state();
        let mut report = AddReport::default();
        for (chunk, vector) in chunks.into_iter().zip(vectors) {
            let position = state.documents.len();
            if let Some(v) = vector {
                state.dense.insert(position, v);
                report.embedded += 1;
            }
            state.indexed_files.insert(chunk.metadata.file.clone());
            state.documents.push(Document::new(chunk, position));
            report.added += 1;
        }

        let texts: Vec<String> = state
            .documents
            .iter()
            .map(|d| contextualize_for_embedding(&d.chunk))
            .collect();
        state.lexical = LexicalIndex::build(texts.iter().map(String::as_str));

        tracing::debug!(
            session = %self.session_id,
            added = report.added,
            embedded = report.embedded,
            total = state.documents.len(),
            "chunks indexed"
        );
        report
    }

    /// Rank documents for `query`, best first, at most `top_k`.
    pub async fn search(&self, query: &str, top_k: usize) -> Vec<Document> {
        if top_k == 0 || self.is_empty() {
            return Vec::new();
        }

        let query_vector = match (self.embed)(query).await {
            Ok(v) if has_direction(&v) => Some(v),
            Ok(_) => None,
            Err(e) => {
                tracing::warn!(error = %e, "query embedding failed, lexical ranking only");
                None
            }
        };

        let state = self.read_state();
        let pool = top_k.saturating_mul(2);

        let dense: Vec<usize> = query_vector
            .map(|v| {
                state
                    .dense
                    .search(&v, pool)
                    .into_iter()
                    .map(|(pos, _)| pos)
                    .collect()
            })
            .unwrap_or_default();
        let lexical: Vec<usize> = state
            .lexical
            .top(query, pool)
            .into_iter()
            .map(|(pos, _)| pos)
            .collect();

        let fused = reciprocal_rank_fusion(
            &[
                RankedList {
                    positions: &dense,
                    weight: self.params.dense_weight,
                },
                RankedList {
                    positions: &lexical,
                    weight: self.params.lexical_weight,
                },
            ],
            self.params.rrf_k,
            top_k,
        );

        fused
            .into_iter()
            .filter_map(|(pos, _)| state.documents.get(pos).cloned())
            .collect()
    }

    /// Every chunk of `path`, ordered by start line. Empty if never indexed.
    #[must_use]
    pub fn get_by_file(&self, path: &str) -> Vec<Document> {
        let state = self.read_state();
        let mut docs: Vec<Document> = state
            .documents
            .iter()
            .filter(|d| d.metadata().file == path)
            .cloned()
            .collect();
        docs.sort_by_key(|d| d.metadata().start_line);
        docs
    }

    #[must_use]
    pub fn contains_file(&self, path: &str) -> bool {
        self.read_state().indexed_files.contains(path)
    }

    /// Indexed paths, sorted.
    #[must_use]
    pub fn indexed_files(&self) -> Vec<String> {
        let mut files: Vec<String> = self.read_state().indexed_files.iter().cloned().collect();
        files.sort();
        files
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.read_state().documents.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Documents that made it into the dense index.
    #[must_use]
    pub fn embedded_len(&self) -> usize {
        self.read_state().dense.len()
    }
}

/// An empty or all-zero query vector ranks every document equally, so it
/// contributes no dense list.
fn has_direction(vector: &[f32]) -> bool {
    vector.iter().any(|x| x.abs() > 0.0)
}
