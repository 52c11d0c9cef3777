//! Remote file listing and fetching capability.

use std::collections::BTreeMap;
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Lists and fetches files of a remote repository.
///
/// Both operations report failure as an empty value and never error, so a
/// single bad file cannot abort an exploration run.
pub trait FileSource: Send + Sync {
    /// Every file path in the repository, or empty on failure.
    fn list(&self, repo_url: &str) -> impl Future<Output = Vec<String>> + Send;

    /// Text content of one file, or `None` on failure.
    fn fetch(&self, repo_url: &str, path: &str) -> impl Future<Output = Option<String>> + Send;
}

/// In-process repository, keyed by path. Ignores `repo_url`.
#[derive(Debug, Default)]
pub struct MemorySource {
    files: BTreeMap<String, Option<String>>,
    fetches: AtomicUsize,
}

impl MemorySource {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_file(mut self, path: impl Into<String>, content: impl Into<String>) -> Self {
        self.files.insert(path.into(), Some(content.into()));
        self
    }

    /// A path that is listed but cannot be fetched.
    #[must_use]
    pub fn with_unreadable(mut self, path: impl Into<String>) -> Self {
        self.files.insert(path.into(), None);
        self
    }

    /// Number of `fetch` calls so far.
    #[must_use]
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::Relaxed)
    }
}

impl FileSource for MemorySource {
    async fn list(&self, _repo_url: &str) -> Vec<String> {
        self.files.keys().cloned().collect()
    }

    async fn fetch(&self, _repo_url: &str, path: &str) -> Option<String> {
        self.fetches.fetch_add(1, Ordering::Relaxed);
        self.files.get(path).cloned().flatten()
    }
}
