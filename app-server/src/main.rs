//! `kbqa` - answer questions from a knowledge document.
//!
//! # Usage
//!
//! ```bash
//! # Serve the question endpoint
//! kbqa serve --knowledge knowledgebase.md
//! kbqa serve --strategy embedding --embeddings embeddings.json
//!
//! # Build the vector store for the embedding strategy
//! kbqa precompute --input knowledgebase.md --output embeddings.json
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use kbqa_completion::CompletionGateway;
use kbqa_embeddings::OpenAIProvider;
use kbqa_retrieval::{RetrievalEngine, RetrieverStrategy};
use kbqa_server::precompute::{DEFAULT_CHUNK_WORDS, precompute};
use kbqa_server::config::default_log_filter;
use kbqa_server::{QueryHandler, ServerConfig, serve};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Knowledge-base question answering.
#[derive(Parser)]
#[command(name = "kbqa", version, about)]
struct Cli {
    /// Configuration file
    #[arg(short, long, env = "KBQA_CONFIG", default_value = "kbqa.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the question endpoint over HTTP
    Serve(ServeArgs),

    /// Embed a knowledge document into a vector store
    Precompute(PrecomputeArgs),
}

#[derive(clap::Args)]
struct ServeArgs {
    /// Address to listen on
    #[arg(long, env = "KBQA_BIND")]
    bind: Option<SocketAddr>,

    /// Knowledge document for the lexical strategy
    #[arg(long)]
    knowledge: Option<PathBuf>,

    /// Vector store for the embedding strategy
    #[arg(long)]
    embeddings: Option<PathBuf>,

    /// Retrieval strategy (lexical or embedding)
    #[arg(long)]
    strategy: Option<RetrieverStrategy>,

    /// Passages per prompt
    #[arg(long)]
    top_k: Option<usize>,

    /// Subject named in the prompt framing
    #[arg(long)]
    subject: Option<String>,

    /// Completion model
    #[arg(long)]
    model: Option<String>,
}

#[derive(clap::Args)]
struct PrecomputeArgs {
    /// Knowledge document to embed
    #[arg(long, default_value = "knowledgebase.md")]
    input: PathBuf,

    /// Vector store to write
    #[arg(long, default_value = "embeddings.json")]
    output: PathBuf,

    /// Words per passage
    #[arg(long, default_value_t = DEFAULT_CHUNK_WORDS)]
    chunk_words: usize,

    /// Embedding model
    #[arg(long)]
    model: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env is normal.
    let dotenv = dotenvy::dotenv();

    let cli = Cli::parse();

    let filter = default_log_filter(cli.verbose);
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .with_target(false)
        .init();

    if let Ok(path) = dotenv {
        info!("Loaded environment from {}", path.display());
    }

    let mut config = ServerConfig::load(&cli.config)?;
    config
        .retrieval
        .apply_env_overrides(|key| std::env::var(key).ok())?;

    match cli.command {
        Command::Serve(args) => run_serve(config, args).await,
        Command::Precompute(args) => run_precompute(config, args).await,
    }
}

async fn run_serve(mut config: ServerConfig, args: ServeArgs) -> Result<()> {
    if let Some(bind) = args.bind {
        config.bind = bind;
    }
    if let Some(path) = args.knowledge {
        config.retrieval.knowledge_path = path;
    }
    if let Some(path) = args.embeddings {
        config.retrieval.embeddings_path = path;
    }
    if let Some(strategy) = args.strategy {
        config.retrieval.strategy = strategy;
    }
    if let Some(top_k) = args.top_k {
        config.retrieval.top_k = top_k;
    }
    if let Some(subject) = args.subject {
        config.retrieval.prompt.subject = subject;
    }
    if let Some(model) = args.model {
        config.completion.model = model;
    }

    let gateway = config.completion.gateway();
    if !gateway.is_available() {
        warn!("ANTHROPIC_API_KEY is not set; questions will fail until it is");
    }

    let engine = RetrievalEngine::builder()
        .with_config(config.retrieval)
        .build()
        .await?;

    let handler = Arc::new(QueryHandler::new(engine, Arc::new(gateway)));
    serve(config.bind, handler).await
}

async fn run_precompute(config: ServerConfig, args: PrecomputeArgs) -> Result<()> {
    let embedding = config.retrieval.embedding;
    let mut provider = OpenAIProvider::new()
        .with_base_url(embedding.base_url)
        .with_timeout(std::time::Duration::from_secs(embedding.timeout_secs));
    if let Some(model) = args.model.or(embedding.model) {
        provider = provider.with_model(model);
    }

    let count = precompute(&provider, &args.input, &args.output, args.chunk_words).await?;
    println!("Wrote {count} passages to {}", args.output.display());
    Ok(())
}
