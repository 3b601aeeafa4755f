use std::path::Path;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use biovigil::cli::{self, Cli, Commands};
use biovigil::config;
use biovigil::errors::VigilError;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(!cli.no_color)
        .init();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {}", e);
        let exit_code = match &e {
            VigilError::Config(_) => 2,
            VigilError::Precondition(_) => 3,
            VigilError::Validation(_) => 4,
            _ => 1,
        };
        std::process::exit(exit_code);
    }
}

async fn run(cli: Cli) -> Result<(), VigilError> {
    let config = config::load_or_default(cli.config.as_deref().map(Path::new)).await?;

    match cli.command {
        Commands::Ingest(args) => cli::ingest::handle_ingest(args, &config).await,
        Commands::Analyze(args) => cli::analyze::handle_analyze(args, &config).await,
        Commands::Recommend(args) => cli::recommend::handle_recommend(args, &config).await,
        Commands::Status => cli::status::handle_status(&config).await,
        Commands::Validate(args) => handle_validate(args).await,
    }
}

async fn handle_validate(args: cli::commands::ValidateArgs) -> Result<(), VigilError> {
    let path = std::path::PathBuf::from(&args.config);
    let _config = config::parse_config(&path).await?;
    println!("Configuration is valid: {}", args.config);
    Ok(())
}
