use super::Config;

impl Config {
    pub(crate) fn apply_env_overrides(&mut self) {
        self.apply_env_overrides_llm();
        self.apply_env_overrides_github();
        self.apply_env_overrides_retrieval();
    }

    fn apply_env_overrides_llm(&mut self) {
        if let Ok(v) = std::env::var("REPOLENS_LLM_PROVIDER") {
            if let Ok(kind) = serde_json::from_value(serde_json::Value::String(v.clone())) {
                self.llm.provider = kind;
            } else {
                tracing::warn!("ignoring invalid REPOLENS_LLM_PROVIDER value: {v}");
            }
        }
        if let Ok(v) = std::env::var("REPOLENS_LLM_BASE_URL") {
            self.llm.base_url = v;
        }
        if let Ok(v) = std::env::var("REPOLENS_LLM_MODEL") {
            self.llm.model = v;
        }
        if let Ok(v) = std::env::var("REPOLENS_LLM_EMBEDDING_MODEL") {
            self.llm.embedding_model = v;
        }
    }

    fn apply_env_overrides_github(&mut self) {
        if let Ok(v) = std::env::var("REPOLENS_GITHUB_TOKEN")
            && !v.trim().is_empty()
        {
            self.github.token = Some(v);
        }
        if let Ok(v) = std::env::var("REPOLENS_GITHUB_API_BASE") {
            self.github.api_base = v;
        }
        if let Ok(v) = std::env::var("REPOLENS_GITHUB_RAW_BASE") {
            self.github.raw_base = v;
        }
        if let Ok(v) = std::env::var("REPOLENS_GITHUB_TIMEOUT")
            && let Ok(secs) = v.parse::<u64>()
        {
            self.github.timeout_secs = secs;
        }
    }

    fn apply_env_overrides_retrieval(&mut self) {
        if let Ok(v) = std::env::var("REPOLENS_EXPLORE_MAX_ROUNDS")
            && let Ok(n) = v.parse::<usize>()
        {
            self.explore.max_rounds = n;
        }
        if let Ok(v) = std::env::var("REPOLENS_CHAT_TOP_K")
            && let Ok(n) = v.parse::<usize>()
        {
            self.chat.top_k = n;
        }
        if let Ok(v) = std::env::var("REPOLENS_INDEX_DENSE_WEIGHT")
            && let Ok(w) = v.parse::<f32>()
        {
            self.index.dense_weight = w;
        }
        if let Ok(v) = std::env::var("REPOLENS_INDEX_LEXICAL_WEIGHT")
            && let Ok(w) = v.parse::<f32>()
        {
            self.index.lexical_weight = w;
        }
    }
}
