//! Clear fired alerts command.

use anyhow::{Context, Result};
use tracing::info;

use screener_alerts::AlertLog;
use screener_config::AppConfig;

use crate::cli::ClearAlertsArgs;

pub async fn run(args: ClearAlertsArgs, config: &AppConfig) -> Result<()> {
    let path = &config.alerts.log_file;
    let mut log =
        AlertLog::load(path).with_context(|| format!("Failed to load alert log {}", path))?;

    let cleared = match &args.symbol {
        Some(symbol) => log.clear_instrument(symbol),
        None => {
            let count = log.len();
            log.clear();
            count
        }
    };

    log.save()
        .with_context(|| format!("Failed to save alert log {}", path))?;

    info!(cleared, symbol = ?args.symbol, "Cleared alert keys");
    match args.symbol {
        Some(symbol) => println!("Cleared {} alert key(s) for {}", cleared, symbol),
        None => println!("Cleared {} alert key(s)", cleared),
    }

    Ok(())
}
