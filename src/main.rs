//! Sitesage main entry point
//!
//! Command-line interface that assembles the crawl and answer pipelines and
//! serves the HTTP API.

use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use sitesage::config::{load_config, ApiKeys};
use sitesage::crawler::{HttpFetcher, RenderedFallback};
use sitesage::llm::{GroqChat, OpenAiEmbedder};
use sitesage::server::{start_server, AppState};
use sitesage::{Config, CorpusRegistry, TextChunker, TraversalEngine};

/// Sitesage: crawl a website, then ask it questions
///
/// Sitesage serves an HTTP API that crawls a site into an in-memory vector
/// index and answers natural-language questions about its content with
/// source attribution.
#[derive(Parser, Debug)]
#[command(name = "sitesage")]
#[command(version)]
#[command(about = "Website crawling and question-answering service", long_about = None)]
struct Cli {
    /// Path to TOML configuration file; defaults apply when omitted
    #[arg(value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            load_config(path)?
        }
        None => Config::default(),
    };
    let addr: SocketAddr = config.server.bind.parse()?;

    let keys = ApiKeys::from_env();

    let fetcher = Arc::new(HttpFetcher::new(&config.crawler)?);
    // No browser-rendering backend is wired in; requests asking for one fall
    // back to plain HTTP fetches. The fallback wrapper still bounds
    // concurrency if a backend is added behind the Fetcher trait.
    let rendered: Option<RenderedFallback> = None;
    let engine = Arc::new(TraversalEngine::new(fetcher, rendered));

    let chunker = Arc::new(TextChunker::new(
        config.chunking.chunk_size,
        config.chunking.chunk_overlap,
    ));
    let embedder = Arc::new(OpenAiEmbedder::new(&config.llm, keys.embedding)?);
    let chat = Arc::new(GroqChat::new(&config.llm, keys.chat)?);

    let state = AppState {
        config: Arc::new(config),
        registry: Arc::new(CorpusRegistry::new()),
        engine,
        chunker,
        embedder,
        chat,
    };

    start_server(addr, state).await?;
    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("sitesage=info,warn"),
            1 => EnvFilter::new("sitesage=debug,info,tower_http=debug"),
            2 => EnvFilter::new("sitesage=trace,debug,tower_http=debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}
