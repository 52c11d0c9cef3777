use serde::{Deserialize, Serialize};

use repolens_index::{ChunkerConfig, RetrievalParams};

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub github: GitHubConfig,
    #[serde(default)]
    pub index: IndexConfig,
    #[serde(default)]
    pub explore: ExploreConfig,
    #[serde(default)]
    pub chat: ChatConfig,
}

/// LLM provider backend selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    Ollama,
}

impl ProviderKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ollama => "ollama",
        }
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

pub(crate) fn default_embedding_model() -> String {
    "qwen3-embedding".into()
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct LlmConfig {
    pub provider: ProviderKind,
    pub base_url: String,
    pub model: String,
    #[serde(default = "default_embedding_model")]
    pub embedding_model: String,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: ProviderKind::Ollama,
            base_url: "http://localhost:11434".into(),
            model: "mistral:7b".into(),
            embedding_model: default_embedding_model(),
        }
    }
}

fn default_github_api_base() -> String {
    "https://api.github.com".into()
}

fn default_github_raw_base() -> String {
    "https://raw.githubusercontent.com".into()
}

fn default_github_timeout_secs() -> u64 {
    30
}

#[derive(Debug, Deserialize, Serialize)]
pub struct GitHubConfig {
    #[serde(default = "default_github_api_base")]
    pub api_base: String,
    #[serde(default = "default_github_raw_base")]
    pub raw_base: String,
    #[serde(default, skip_serializing)]
    pub token: Option<String>,
    #[serde(default = "default_github_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            api_base: default_github_api_base(),
            raw_base: default_github_raw_base(),
            token: None,
            timeout_secs: default_github_timeout_secs(),
        }
    }
}

fn default_min_chunk_chars() -> usize {
    50
}

fn default_max_class_chars() -> usize {
    1500
}

fn default_window_lines() -> usize {
    100
}

fn default_max_chunk_chars() -> usize {
    8000
}

fn default_global_script_chars() -> usize {
    2000
}

fn default_rrf_k() -> f32 {
    60.0
}

fn default_dense_weight() -> f32 {
    1.0
}

fn default_lexical_weight() -> f32 {
    0.3
}

#[derive(Debug, Deserialize, Serialize)]
pub struct IndexConfig {
    #[serde(default = "default_min_chunk_chars")]
    pub min_chunk_chars: usize,
    #[serde(default = "default_max_class_chars")]
    pub max_class_chars: usize,
    #[serde(default = "default_window_lines")]
    pub window_lines: usize,
    #[serde(default = "default_max_chunk_chars")]
    pub max_chunk_chars: usize,
    #[serde(default = "default_global_script_chars")]
    pub global_script_chars: usize,
    #[serde(default = "default_rrf_k")]
    pub rrf_k: f32,
    #[serde(default = "default_dense_weight")]
    pub dense_weight: f32,
    #[serde(default = "default_lexical_weight")]
    pub lexical_weight: f32,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            min_chunk_chars: default_min_chunk_chars(),
            max_class_chars: default_max_class_chars(),
            window_lines: default_window_lines(),
            max_chunk_chars: default_max_chunk_chars(),
            global_script_chars: default_global_script_chars(),
            rrf_k: default_rrf_k(),
            dense_weight: default_dense_weight(),
            lexical_weight: default_lexical_weight(),
        }
    }
}

impl IndexConfig {
    #[must_use]
    pub fn chunker(&self) -> ChunkerConfig {
        ChunkerConfig {
            min_chunk_chars: self.min_chunk_chars,
            max_class_chars: self.max_class_chars,
            window_lines: self.window_lines,
            max_chunk_chars: self.max_chunk_chars,
            global_script_chars: self.global_script_chars,
        }
    }

    #[must_use]
    pub fn retrieval(&self) -> RetrievalParams {
        RetrievalParams {
            rrf_k: self.rrf_k,
            dense_weight: self.dense_weight,
            lexical_weight: self.lexical_weight,
        }
    }
}

fn default_max_rounds() -> usize {
    3
}

fn default_small_repo_threshold() -> usize {
    300
}

fn default_small_repo_max_entries() -> usize {
    500
}

fn default_large_repo_source_cap() -> usize {
    400
}

fn default_preview_lines() -> usize {
    100
}

fn default_knowledge_budget_chars() -> usize {
    10_000
}

fn default_max_files_per_round() -> usize {
    3
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ExploreConfig {
    #[serde(default = "default_max_rounds")]
    pub max_rounds: usize,
    /// Repositories with fewer files get an essentially complete tree.
    #[serde(default = "default_small_repo_threshold")]
    pub small_repo_threshold: usize,
    #[serde(default = "default_small_repo_max_entries")]
    pub small_repo_max_entries: usize,
    #[serde(default = "default_large_repo_source_cap")]
    pub large_repo_source_cap: usize,
    #[serde(default = "default_preview_lines")]
    pub preview_lines: usize,
    #[serde(default = "default_knowledge_budget_chars")]
    pub knowledge_budget_chars: usize,
    #[serde(default = "default_max_files_per_round")]
    pub max_files_per_round: usize,
}

impl Default for ExploreConfig {
    fn default() -> Self {
        Self {
            max_rounds: default_max_rounds(),
            small_repo_threshold: default_small_repo_threshold(),
            small_repo_max_entries: default_small_repo_max_entries(),
            large_repo_source_cap: default_large_repo_source_cap(),
            preview_lines: default_preview_lines(),
            knowledge_budget_chars: default_knowledge_budget_chars(),
            max_files_per_round: default_max_files_per_round(),
        }
    }
}

fn default_top_k() -> usize {
    5
}

fn default_context_chars_per_doc() -> usize {
    2000
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ChatConfig {
    #[serde(default = "default_top_k")]
    pub top_k: usize,
    #[serde(default = "default_context_chars_per_doc")]
    pub context_chars_per_doc: usize,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            top_k: default_top_k(),
            context_chars_per_doc: default_context_chars_per_doc(),
        }
    }
}
