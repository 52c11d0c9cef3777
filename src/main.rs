use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use repolens_core::config::{Config, ProviderKind};
use repolens_core::{ChatService, ExploreEvent, Explorer, GitHubSource, Step};
use repolens_index::SessionStore;
use repolens_llm::{LlmError, embed_fn};
use repolens_llm::ollama::OllamaProvider;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_stream::StreamExt;

/// Explore a GitHub repository with a local model, then answer questions
/// about it.
#[derive(Parser, Debug)]
#[command(name = "repolens", version)]
struct Cli {
    /// Repository URL, e.g. `https://github.com/owner/repo`.
    repo_url: String,

    /// Session id; reusing one replaces that session's index.
    #[arg(long)]
    session: Option<String>,

    /// Path to configuration file (TOML). Falls back to `REPOLENS_CONFIG`,
    /// then `config/default.toml`.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print the report and exit without reading questions.
    #[arg(long)]
    report_only: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_subscriber();
    let cli = Cli::parse();

    let config_path = resolve_config_path(cli.config.as_deref());
    let config = Config::load(&config_path)
        .with_context(|| format!("failed to load {}", config_path.display()))?;

    let llm = Arc::new(create_provider(&config).context("failed to configure the LLM provider")?);
    if let Err(e) = llm.health_check().await {
        tracing::warn!("ollama health check failed: {e:#}");
    }
    let source = Arc::new(GitHubSource::new(&config.github).context("failed to build GitHub client")?);
    let sessions = Arc::new(SessionStore::new(
        embed_fn(Arc::clone(&llm)),
        config.index.retrieval(),
    ));

    let session_id = cli
        .session
        .unwrap_or_else(|| format!("cli-{}", std::process::id()));
    tracing::info!(session_id, repo_url = cli.repo_url, "starting exploration");

    let explorer = Arc::new(Explorer::new(
        Arc::clone(&llm),
        Arc::clone(&source),
        Arc::clone(&sessions),
        config.explore.clone(),
        config.index.chunker(),
    ));
    let mut events = explorer.spawn(cli.repo_url.clone(), session_id.clone());
    let mut stdout = std::io::stdout();
    let mut failed = false;
    while let Some(event) = events.next().await {
        failed |= event.step == Step::Error;
        print_event(&mut stdout, &event)?;
    }
    writeln!(stdout)?;

    if cli.report_only {
        if failed {
            anyhow::bail!("exploration of {} failed", cli.repo_url);
        }
        return Ok(());
    }
    if failed {
        eprintln!("exploration failed; answers use whatever was indexed");
    }

    let chat = Arc::new(ChatService::new(
        Arc::clone(&llm),
        source,
        sessions,
        config.chat.clone(),
        config.index.chunker(),
    ));
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    eprint!("> ");
    while let Some(line) = lines.next_line().await? {
        let query = line.trim();
        if matches!(query, "exit" | "quit") {
            break;
        }
        if !query.is_empty() {
            let mut fragments = chat.spawn(session_id.clone(), query.to_owned());
            while let Some(fragment) = fragments.next().await {
                write!(stdout, "{fragment}")?;
                stdout.flush()?;
            }
            writeln!(stdout)?;
        }
        eprint!("> ");
    }
    Ok(())
}

fn init_subscriber() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn resolve_config_path(arg: Option<&std::path::Path>) -> PathBuf {
    if let Some(path) = arg {
        return path.to_path_buf();
    }
    if let Ok(path) = std::env::var("REPOLENS_CONFIG") {
        return PathBuf::from(path);
    }
    PathBuf::from("config/default.toml")
}

fn create_provider(config: &Config) -> Result<OllamaProvider, LlmError> {
    match config.llm.provider {
        ProviderKind::Ollama => OllamaProvider::new(
            &config.llm.base_url,
            config.llm.model.as_str(),
            config.llm.embedding_model.as_str(),
        ),
    }
}

/// Report text goes to `out` as it streams; progress lines go to stderr.
fn print_event(out: &mut impl Write, event: &ExploreEvent) -> std::io::Result<()> {
    match event.step {
        Step::ReportChunk => {
            write!(out, "{}", event.message)?;
            out.flush()
        }
        Step::Generating => {
            eprintln!("[{}] {}", event.step, event.message);
            writeln!(out)
        }
        _ => {
            eprintln!("[{}] {}", event.step, event.message);
            Ok(())
        }
    }
}
