//! Frosty CLI
//!
//! Main entry point for the frosty command-line tool.
//! Prints the system prompt for the SQL assistant, optionally resolving
//! the column descriptor against a live warehouse, SQLite, or spreadsheet schema.

mod commands;

use clap::{Parser, Subcommand};
use commands::{AuthCommand, ColumnsCommand, ProfilesCommand, PromptCommand};
use frosty_core::{config::AppConfig, logging, AppResult, ColumnPolicy, SourceKind};
use std::path::PathBuf;

/// Frosty - system prompts for a chat-based SQL assistant
#[derive(Parser, Debug)]
#[command(name = "frosty")]
#[command(about = "Build the system prompt for a chat-based SQL assistant", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to workspace directory (default: current directory)
    #[arg(short, long, global = true, env = "FROSTY_WORKSPACE")]
    workspace: Option<PathBuf>,

    /// Path to config file
    #[arg(short, long, global = true, env = "FROSTY_CONFIG")]
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

    /// Table profile id
    #[arg(short, long, global = true, env = "FROSTY_PROFILE")]
    profile: Option<String>,

    /// Column source (static, warehouse, sqlite, sheets)
    #[arg(short, long, global = true, env = "FROSTY_SOURCE")]
    source: Option<SourceKind>,

    /// Column policy (full, filter-by-live); defaults per source
    #[arg(long, global = true)]
    policy: Option<ColumnPolicy>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the system prompt
    Prompt(PromptCommand),

    /// List available table profiles
    Profiles(ProfilesCommand),

    /// Show the live column set of the configured source
    Columns(ColumnsCommand),

    /// Authorize spreadsheet access and report the token state
    Auth(AuthCommand),
}

#[tokio::main]
async fn main() -> AppResult<()> {
    let cli = Cli::parse();

    let config = AppConfig::load_with(cli.workspace.clone(), cli.config.clone())?;

    let config = config.with_overrides(
        cli.workspace,
        cli.config,
        cli.profile,
        cli.source,
        cli.policy,
        cli.log_level,
        cli.verbose,
        cli.no_color,
    );

    logging::init_logging(config.log_level.as_deref(), config.no_color)?;

    tracing::info!("Frosty starting");
    tracing::debug!("Workspace: {:?}", config.workspace);
    tracing::debug!("Profile: {}", config.profile);
    tracing::debug!("Source: {} ({})", config.source, config.effective_policy());

    let command_name = match &cli.command {
        Commands::Prompt(_) => "prompt",
        Commands::Profiles(_) => "profiles",
        Commands::Columns(_) => "columns",
        Commands::Auth(_) => "auth",
    };
    let _span = tracing::info_span!("command", name = command_name).entered();

    let result = match cli.command {
        Commands::Prompt(cmd) => cmd.execute(&config).await,
        Commands::Profiles(cmd) => cmd.execute(&config),
        Commands::Columns(cmd) => cmd.execute(&config).await,
        Commands::Auth(cmd) => cmd.execute(&config).await,
    };

    match &result {
        Ok(_) => tracing::info!("Command completed successfully"),
        Err(e) => tracing::error!("Command failed: {}", e),
    }

    result
}
