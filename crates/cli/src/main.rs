//! ragdex CLI
//!
//! Main entry point for the ragdex command-line tool.
//! Seeds documents into a vector index and searches them.

mod commands;

use clap::{Parser, Subcommand};
use commands::{IndexCommand, SearchCommand, SeedCommand};
use ragdex_core::{
    config::AppConfig,
    logging::{self, LogFormat},
    AppResult,
};
use ragdex_knowledge::KnowledgeBase;
use std::path::PathBuf;

/// ragdex - semantic document search over a local vector index
#[derive(Parser, Debug)]
#[command(name = "ragdex")]
#[command(about = "Seed documents into a vector index and search them", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to workspace directory (default: current directory)
    #[arg(short, long, global = true)]
    workspace: Option<PathBuf>,

    /// Path to config file (default: <workspace>/.ragdex/config.yaml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Enable verbose output (sets log level to debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// Embedding provider (openai, ollama, trigram)
    #[arg(short, long, global = true)]
    provider: Option<String>,

    /// Embedding model identifier
    #[arg(short, long, global = true)]
    model: Option<String>,

    /// Index name
    #[arg(short, long, global = true)]
    index: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Embed a file or directory into the index
    Seed(SeedCommand),

    /// Search the index
    Search(SearchCommand),

    /// Index statistics and maintenance
    Index(IndexCommand),
}

#[tokio::main]
async fn main() -> AppResult<()> {
    dotenvy::dotenv().ok();

    // Parse command-line arguments first (needed for logging config)
    let cli = Cli::parse();

    // Workspace and config file decide which config.yaml is merged
    let config = AppConfig::load_with(|key| match key {
        "RAGDEX_WORKSPACE" if cli.workspace.is_some() => {
            cli.workspace.as_ref().map(|p| p.display().to_string())
        }
        "RAGDEX_CONFIG" if cli.config.is_some() => {
            cli.config.as_ref().map(|p| p.display().to_string())
        }
        _ => std::env::var(key).ok(),
    })?;

    // Apply CLI overrides
    let config = config.with_overrides(
        cli.workspace.clone(),
        cli.provider.clone(),
        cli.model.clone(),
        cli.index.clone(),
        cli.log_level.clone(),
        cli.verbose,
        cli.no_color,
    );

    // Initialize logging with final configuration
    let format = config
        .log_format
        .as_deref()
        .map(LogFormat::from_name)
        .unwrap_or_default();
    logging::init_logging(config.log_level.as_deref(), config.no_color, format)?;

    tracing::debug!("Workspace: {:?}", config.workspace);
    tracing::debug!(
        "Provider: {} ({}, {} dims)",
        config.embedding.provider,
        config.embedding.model,
        config.embedding.dimensions
    );
    tracing::debug!("Index: {} ({})", config.index_name, config.metric);

    let kb = KnowledgeBase::connect(&config)?;

    let command_name = match &cli.command {
        Commands::Seed(_) => "seed",
        Commands::Search(_) => "search",
        Commands::Index(_) => "index",
    };
    let _span = tracing::info_span!("command", name = command_name).entered();

    // Route to command handlers
    let result = match &cli.command {
        Commands::Seed(cmd) => cmd.execute(&config, &kb).await,
        Commands::Search(cmd) => cmd.execute(&kb).await,
        Commands::Index(cmd) => cmd.execute(&kb).await,
    };

    match &result {
        Ok(_) => tracing::info!("Command completed successfully"),
        Err(e) => tracing::error!("Command failed: {}", e),
    }

    result
}
