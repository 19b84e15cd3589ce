//! CLI definitions.

pub mod commands;

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "screener")]
#[command(author, version, about = "Footprint and multi-timeframe signal screener")]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "config/default.toml")]
    pub config: PathBuf,

    /// Log level (overrides logging.level)
    #[arg(short, long)]
    pub log_level: Option<LogLevel>,

    /// Enable JSON log format
    #[arg(long)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run one screening cycle and print the table
    Scan(ScanArgs),
    /// Re-run the screen every refresh interval
    Watch(WatchArgs),
    /// List available strategies
    Strategies,
    /// Validate configuration
    ValidateConfig,
    /// Forget fired alerts so they can fire again
    ClearAlerts(ClearAlertsArgs),
}

#[derive(clap::Args)]
pub struct ScanArgs {
    /// Export the table as CSV (defaults to screener.export_file)
    #[arg(long, value_name = "PATH", num_args = 0..=1)]
    pub csv: Option<Option<PathBuf>>,

    /// Print the report as JSON instead of a table
    #[arg(long)]
    pub json: bool,

    /// Only show BUY and SELL rows
    #[arg(long)]
    pub active_only: bool,

    /// Skip alert dispatch for this run
    #[arg(long)]
    pub no_alerts: bool,
}

#[derive(clap::Args)]
pub struct WatchArgs {
    /// Show the terminal dashboard
    #[arg(long)]
    pub tui: bool,

    /// Only show BUY and SELL rows
    #[arg(long)]
    pub active_only: bool,

    /// Rewrite this CSV file after every cycle
    #[arg(long, value_name = "PATH")]
    pub csv: Option<PathBuf>,
}

#[derive(clap::Args)]
pub struct ClearAlertsArgs {
    /// Only clear the keys of this symbol
    #[arg(short, long)]
    pub symbol: Option<String>,
}
