mod env;
mod types;


pub use types::*;

use std::path::Path;

use anyhow::{Context, bail};

impl Config {
    /// Load configuration from a TOML file with env var overrides.
    ///
    /// Falls back to defaults when the file does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed, or if
    /// the resulting values fail [`Config::validate`].
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path).context("failed to read config file")?;
            toml::from_str::<Self>(&content).context("failed to parse config file")?
        } else {
            Self::default()
        };

        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Reject settings the retrieval and exploration code cannot honor.
    ///
    /// # Errors
    ///
    /// Returns an error naming the first offending setting.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.index.dense_weight <= self.index.lexical_weight {
            bail!(
                "index.dense_weight ({}) must be greater than index.lexical_weight ({})",
                self.index.dense_weight,
                self.index.lexical_weight
            );
        }
        if self.explore.max_rounds == 0 {
            bail!("explore.max_rounds must be at least 1");
        }
        if self.index.window_lines == 0 {
            bail!("index.window_lines must be at least 1");
        }
        if self.chat.top_k == 0 {
            bail!("chat.top_k must be at least 1");
        }
        if self.index.max_chunk_chars < self.index.global_script_chars {
            bail!(
                "index.max_chunk_chars ({}) must not be below index.global_script_chars ({})",
                self.index.max_chunk_chars,
                self.index.global_script_chars
            );
        }
        Ok(())
    }
}
