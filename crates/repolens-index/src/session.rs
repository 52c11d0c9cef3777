//! Session identifier to hybrid index mapping.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use repolens_llm::EmbedFn;

use crate::hybrid::{HybridIndex, RetrievalParams};

/// Owns one [`HybridIndex`] per session id for the life of the process.
///
/// Construct once at startup and hand out by reference; indexes are created
/// lazily on first use and never evicted.
pub struct SessionStore {
    embed: EmbedFn,
    params: RetrievalParams,
    sessions: Mutex<HashMap<String, Arc<HybridIndex>>>,
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("params", &self.params)
            .field("sessions", &self.len())
            .finish_non_exhaustive()
    }
}

impl SessionStore {
    #[must_use]
    pub fn new(embed: EmbedFn, params: RetrievalParams) -> Self {
        Self {
            embed,
            params,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    /// Existing index for `session_id`, or a new empty one.
    ///
    /// The map lock is held across lookup and insertion, so concurrent first
    /// calls for one id share a single instance.
    #[must_use]
    pub fn get_or_create(&self, session_id: &str) -> Arc<HybridIndex> {
        let mut sessions = self.sessions.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(index) = sessions.get(session_id) {
            return Arc::clone(index);
        }
        let index = Arc::new(HybridIndex::new(
            session_id,
            Arc::clone(&self.embed),
            self.params,
        ));
        sessions.insert(session_id.to_owned(), Arc::clone(&index));
        tracing::info!(session = session_id, "session index created");
        index
    }

    #[must_use]
    pub fn get(&self, session_id: &str) -> Option<Arc<HybridIndex>> {
        self.sessions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(session_id)
            .cloned()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.sessions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use repolens_llm::EmbedFuture;

    use super::*;
    use crate::document::{Chunk, ChunkKind, ChunkMetadata};

    fn constant_embedder() -> EmbedFn {
        Arc::new(|_: &str| -> EmbedFuture { Box::pin(async { Ok(vec![1.0, 0.0]) }) })
    }

    fn store() -> SessionStore {
        SessionStore::new(constant_embedder(), RetrievalParams::default())
    }

    #[test]
    fn get_or_create_returns_same_instance() {
        let store = store();
        let a = store.get_or_create("s1");
        let b = store.get_or_create("s1");
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(store.len(), 1);
        assert_eq!(a.session_id(), "s1");
    }

    #[test]
    fn get_does_not_create() {
        let store = store();
        assert!(store.get("missing").is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn concurrent_first_access_creates_one_instance() {
        let store = Arc::new(store());
        let handles: Vec<_> = (0..16)
            .map(|_| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || store.get_or_create("shared"))
            })
            .collect();
        let indexes: Vec<Arc<HybridIndex>> =
            handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert!(indexes.windows(2).all(|w| Arc::ptr_eq(&w[0], &w[1])));
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn sessions_are_isolated() {
        let store = store();
        let s1 = store.get_or_create("s1");
        let s2 = store.get_or_create("s2");
        s1.add(vec![Chunk {
            content: "def only_in_first_session(): pass".into(),
            metadata: ChunkMetadata {
                file: "a.py".into(),
                kind: ChunkKind::Function,
                name: "only_in_first_session".into(),
                class: String::new(),
                start_line: 1,
                end_line: 1,
            },
        }])
        .await;

        assert_eq!(s1.get_by_file("a.py").len(), 1);
        assert!(s2.get_by_file("a.py").is_empty());
        assert!(s2.search("only_in_first_session", 5).await.is_empty());
    }
}
