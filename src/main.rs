//! Signal screener CLI application.

mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use screener_config::load_config_or_default;
use screener_monitor::setup_logging;
use std::path::Path;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = load_config_or_default(&cli.config)
        .with_context(|| format!("Failed to load configuration from {}", cli.config.display()))?;

    // Setup logging; the dashboard owns the terminal, so it logs to file only
    let level = cli
        .log_level
        .map(|l| l.as_str().to_string())
        .unwrap_or_else(|| config.logging.level.clone());
    let json = cli.json_logs || config.logging.format == "json";
    let console = !matches!(&cli.command, Commands::Watch(args) if args.tui);
    let _log_guard = setup_logging(
        &level,
        json,
        config.logging.file.as_deref().map(Path::new),
        console,
    );

    // Execute command
    match cli.command {
        Commands::Scan(args) => cli::commands::scan::run(args, &config).await,
        Commands::Watch(args) => cli::commands::watch::run(args, &config).await,
        Commands::Strategies => cli::commands::strategies::run().await,
        Commands::ValidateConfig => cli::commands::validate::run(&cli.config).await,
        Commands::ClearAlerts(args) => cli::commands::clear_alerts::run(args, &config).await,
    }
}
