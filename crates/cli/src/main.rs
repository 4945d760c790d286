//! lambda-phage CLI
//!
//! Main entry point for the lambda-phage command-line tool.
//! Sets up function configs interactively, groups them into projects and
//! deploys projects to a function-execution service.

mod commands;

use clap::{Parser, Subcommand};
use commands::{InitCommand, ProjectCommand};
use phage_core::{logging, AppResult, AppSettings};
use std::path::PathBuf;

/// lambda-phage - set up, group and deploy serverless functions
#[derive(Parser, Debug)]
#[command(name = "lambda-phage")]
#[command(about = "Set up, group and deploy serverless functions", long_about = None)]
#[command(version)]
struct Cli {
    /// Home directory holding .lambda_phage (default: your home directory)
    #[arg(long, global = true, env = "PHAGE_HOME")]
    home: Option<PathBuf>,

    /// Function config file (default: l-p.yml)
    #[arg(short, long, global = true, env = "PHAGE_CONFIG")]
    config: Option<PathBuf>,

    /// Function service URL
    #[arg(long, global = true, env = "PHAGE_ENDPOINT")]
    endpoint: Option<String>,

    /// Deploy provider (http)
    #[arg(long, global = true, env = "PHAGE_PROVIDER")]
    provider: Option<String>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, env = "RUST_LOG")]
    log_level: Option<String>,

    /// Enable verbose output (sets log level to debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Set up a function config in the current directory
    Init(InitCommand),

    /// Manage and deploy projects
    Project(ProjectCommand),
}

#[tokio::main]
async fn main() -> AppResult<()> {
    // Parse command-line arguments first (needed for logging config)
    let cli = Cli::parse();

    // Load base settings from environment and the settings file under --home
    let settings = AppSettings::load(cli.home.clone())?;

    // Apply CLI overrides
    let settings = settings.with_overrides(
        cli.home,
        cli.config,
        cli.provider,
        cli.endpoint,
        cli.log_level,
        cli.verbose,
        cli.no_color,
    );

    logging::init_logging(settings.log_level.as_deref(), settings.no_color)?;

    tracing::info!("lambda-phage starting");
    tracing::debug!("Home: {:?}", settings.home);
    tracing::debug!("Config file: {:?}", settings.config_file);
    tracing::debug!("Provider: {} at {}", settings.provider, settings.endpoint);

    settings.validate()?;

    let command_name = match &cli.command {
        Commands::Init(_) => "init",
        Commands::Project(_) => "project",
    };
    let _span = tracing::info_span!("command", name = command_name).entered();

    // Route to command handlers
    let result = match cli.command {
        Commands::Init(cmd) => cmd.execute(&settings).await,
        Commands::Project(cmd) => cmd.execute(&settings).await,
    };

    // Log completion
    match &result {
        Ok(_) => tracing::info!("Command completed successfully"),
        Err(e) => tracing::error!("Command failed: {}", e),
    }

    result
}
