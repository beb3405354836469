//! # Outline Bridge CLI (`obridge`)
//!
//! Host for the two bridge actions: push a page's blocks to the ingest
//! endpoint, and ask the query endpoint a question.
//!
//! ## Usage
//!
//! ```bash
//! obridge --config ./config/obridge.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `obridge reindex <page>` | Flatten a page and send it to `POST /ingest` |
//! | `obridge ask "<question>"` | Ask `POST /query` and print the answer with sources |
//! | `obridge flatten <page>` | Print the ingest payload without sending it |
//!
//! `<page>` is a `.md`/`.json` page file, or a page name looked up in
//! `[outline].graph_dir`.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use outline_bridge::bridge::Bridge;
use outline_bridge::client::{ReindexOutcome, SyncClient};
use outline_bridge::config::{self, Config};
use outline_bridge::flatten::flatten;
use outline_bridge::logging;
use outline_bridge::notify::ConsoleNotifier;
use outline_bridge::provider_fs::FileOutlineProvider;
use outline_bridge::render::render_answer;
use outline_bridge::transport::HttpTransport;

const DEFAULT_CONFIG_PATH: &str = "./config/obridge.toml";

/// Outline Bridge — sync note outlines with a remote retrieval service.
#[derive(Parser)]
#[command(
    name = "obridge",
    about = "Outline Bridge — sync note outlines with a remote retrieval service",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    ///
    /// Defaults to `./config/obridge.toml`; built-in defaults are used when
    /// that file does not exist.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Service base URL, overriding the config file and `OBRIDGE_SERVICE_URL`.
    #[arg(long, global = true)]
    service: Option<String>,

    /// Enable debug logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Flatten a page and send all of its blocks to the ingest endpoint.
    ///
    /// Waits for the page file to appear (bounded by `[readiness]`). If it
    /// never does, the reindex is skipped.
    Reindex {
        /// Page file path, or page name inside `[outline].graph_dir`.
        page: String,
    },

    /// Ask the query endpoint a question.
    Ask {
        /// The question. Multiple words are joined with spaces.
        #[arg(required = true, num_args = 1..)]
        question: Vec<String>,

        /// Number of sources to request.
        #[arg(long)]
        top_k: Option<usize>,

        /// Print the parsed result as JSON instead of text.
        #[arg(long)]
        json: bool,
    },

    /// Print the ingest payload for a page without sending it.
    Flatten {
        /// Page file path, or page name inside `[outline].graph_dir`.
        page: String,
    },
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let (path, explicit) = match &cli.config {
        Some(path) => (path.clone(), true),
        None => (PathBuf::from(DEFAULT_CONFIG_PATH), false),
    };
    let cfg = config::load_or_minimal(&path, explicit)?.with_overrides(cli.service.as_deref());
    config::validate(&cfg)?;

    match cli.command {
        Commands::Reindex { page } => run_reindex(&cfg, &page).await,
        Commands::Ask {
            question,
            top_k,
            json,
        } => run_ask(&cfg, &question.join(" "), top_k, json).await,
        Commands::Flatten { page } => run_flatten(&cfg, &page),
    }
}

fn build_client(cfg: &Config) -> Result<SyncClient> {
    let transport = Arc::new(HttpTransport::from_config(&cfg.service)?);
    Ok(
        SyncClient::new(&cfg.service.base_url, transport, Arc::new(ConsoleNotifier))
            .with_top_k(cfg.service.top_k),
    )
}

async fn run_reindex(cfg: &Config, page: &str) -> Result<ExitCode> {
    let provider = Arc::new(FileOutlineProvider::resolve(
        page,
        cfg.outline.graph_dir.as_deref(),
    ));
    let bridge = Bridge::attach(build_client(cfg)?, provider, &cfg.readiness).await;

    match bridge.reindex().await {
        Ok(ReindexOutcome::Ingested { page, records, .. }) => {
            tracing::info!(page = %page, records, "reindex finished");
            Ok(ExitCode::SUCCESS)
        }
        Ok(ReindexOutcome::Skipped) => {
            eprintln!("warning: page '{}' not found; reindex skipped", page);
            Ok(ExitCode::FAILURE)
        }
        // Already reported through the notifier.
        Err(_) => Ok(ExitCode::FAILURE),
    }
}

async fn run_ask(
    cfg: &Config,
    question: &str,
    top_k: Option<usize>,
    json: bool,
) -> Result<ExitCode> {
    let client = build_client(cfg)?;
    let top_k = top_k.unwrap_or(client.top_k());

    match client.ask_with_top_k(question, top_k).await {
        Ok(result) => {
            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                println!("{}", render_answer(&result));
            }
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => {
            eprintln!("{}", err);
            Ok(ExitCode::FAILURE)
        }
    }
}

fn run_flatten(cfg: &Config, page: &str) -> Result<ExitCode> {
    let provider = FileOutlineProvider::resolve(page, cfg.outline.graph_dir.as_deref());
    let Some(loaded) = provider.load()? else {
        eprintln!("warning: No page context");
        return Ok(ExitCode::FAILURE);
    };
    let records = flatten(&loaded.blocks, loaded.label());
    println!("{}", serde_json::to_string_pretty(&records)?);
    Ok(ExitCode::SUCCESS)
}
