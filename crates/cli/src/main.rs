//! Samarth CLI
//!
//! Main entry point for the samarth command-line tool.
//! Answers questions about Indian crop production and rainfall with cited sources.

mod commands;

use clap::{Parser, Subcommand};
use commands::{AskCommand, IntentCommand, NormalizeCommand};
use samarth_core::{config::AppConfig, logging, AppResult};
use std::path::PathBuf;

/// Samarth - questions over crop production and rainfall data
#[derive(Parser, Debug)]
#[command(name = "samarth")]
#[command(about = "Answer questions over Indian crop production and rainfall data", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to workspace directory (default: current directory)
    #[arg(short, long, global = true, env = "SAMARTH_WORKSPACE")]
    workspace: Option<PathBuf>,

    /// Path to config file
    #[arg(short, long, global = true, env = "SAMARTH_CONFIG")]
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

    /// Data source (synthetic, file, datagov)
    #[arg(short, long, global = true, env = "SAMARTH_SOURCE")]
    source: Option<String>,

    /// Directory with crop.json and rainfall.json (file source)
    #[arg(long, global = true, env = "SAMARTH_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Answer a question with cited figures
    Ask(AskCommand),

    /// Show how a question is understood, without fetching data
    Intent(IntentCommand),

    /// Normalize a raw JSON batch into the shared row schema
    Normalize(NormalizeCommand),
}

#[tokio::main]
async fn main() -> AppResult<()> {
    // Parse command-line arguments first (needed for logging config)
    let cli = Cli::parse();

    let config = AppConfig::load_from(cli.workspace.clone(), cli.config.clone())?;

    // Apply CLI overrides
    let config = config.with_overrides(
        cli.workspace,
        cli.source,
        cli.data_dir,
        cli.log_level,
        cli.verbose,
        cli.no_color,
    );

    let format = if cli.json_logs {
        logging::LogFormat::Json
    } else {
        logging::LogFormat::Pretty
    };
    logging::init_logging(config.log_level.as_deref(), config.no_color, format)?;

    tracing::info!("Samarth CLI starting");
    tracing::debug!("Workspace: {:?}", config.workspace);
    tracing::debug!("Source: {}", config.source);

    let command_name = match &cli.command {
        Commands::Ask(_) => "ask",
        Commands::Intent(_) => "intent",
        Commands::Normalize(_) => "normalize",
    };
    let _span = tracing::info_span!("command", name = command_name).entered();

    // Route to command handlers
    let result = match cli.command {
        Commands::Ask(cmd) => cmd.execute(&config).await,
        Commands::Intent(cmd) => cmd.execute(&config),
        Commands::Normalize(cmd) => cmd.execute(&config),
    };

    match &result {
        Ok(_) => tracing::info!("Command completed successfully"),
        Err(e) => tracing::error!("Command failed: {}", e),
    }

    result
}
