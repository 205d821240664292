//! Unity Companion CLI
//!
//! Main entry point for the companion backend.
//! Serves the patient chat API and offers local commands for trying the pipeline.

mod commands;
mod server;

use clap::{Parser, Subcommand};
use commands::{AskCommand, KnowledgeCommand, ServeCommand};
use companion_core::{config::AppConfig, logging, AppResult};
use std::path::PathBuf;

/// Unity Companion - patient chat backend for prenatal screening results
#[derive(Parser, Debug)]
#[command(name = "companion")]
#[command(about = "Patient chat backend for prenatal screening results", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to workspace directory (default: current directory)
    #[arg(short, long, global = true, env = "COMPANION_WORKSPACE")]
    workspace: Option<PathBuf>,

    /// Path to config file
    #[arg(short, long, global = true, env = "COMPANION_CONFIG")]
    config: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, env = "RUST_LOG")]
    log_level: Option<String>,

    /// Enable verbose output (sets log level to debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    no_color: bool,

    /// LLM provider (gemini, ollama)
    #[arg(short, long, global = true, env = "COMPANION_PROVIDER")]
    provider: Option<String>,

    /// Model identifier
    #[arg(short, long, global = true, env = "COMPANION_MODEL")]
    model: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the chat HTTP server
    Serve(ServeCommand),

    /// Ask a single question
    Ask(AskCommand),

    /// Inspect the knowledge base
    Knowledge(KnowledgeCommand),
}

#[tokio::main]
async fn main() -> AppResult<()> {
    // Parse command-line arguments first (needed for logging config)
    let cli = Cli::parse();

    // Load configuration from defaults, config file and environment
    let config = AppConfig::load_from(cli.workspace, cli.config)?;

    // Apply CLI overrides
    let config = config.with_overrides(
        cli.provider,
        cli.model,
        cli.log_level,
        cli.verbose,
        cli.no_color,
    );

    // Initialize logging with final configuration
    logging::init_logging(config.log_level.as_deref(), config.no_color, config.log_json)?;

    config.validate()?;

    tracing::info!("Unity Companion starting");
    tracing::debug!("Workspace: {:?}", config.workspace);
    tracing::debug!("Provider: {}", config.provider);
    tracing::debug!("Model: {}", config.model);
    tracing::debug!("Knowledge file: {:?}", config.knowledge_file());

    let command_name = match &cli.command {
        Commands::Serve(_) => "serve",
        Commands::Ask(_) => "ask",
        Commands::Knowledge(_) => "knowledge",
    };
    let _span = tracing::info_span!("command", name = command_name).entered();

    // Route to command handlers
    let result = match cli.command {
        Commands::Serve(cmd) => cmd.execute(&config).await,
        Commands::Ask(cmd) => cmd.execute(&config).await,
        Commands::Knowledge(cmd) => cmd.execute(&config).await,
    };

    match &result {
        Ok(_) => tracing::info!("Command completed successfully"),
        Err(e) => tracing::error!("Command failed: {}", e),
    }

    result
}
