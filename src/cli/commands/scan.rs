//! Single screening cycle.

use anyhow::{Context, Result};
use std::path::PathBuf;
use tracing::info;

use screener_config::AppConfig;

use super::build_screener;
use crate::cli::ScanArgs;

pub async fn run(args: ScanArgs, config: &AppConfig) -> Result<()> {
    let mut screener = build_screener(config, !args.no_alerts)?;
    let report = screener.run_cycle().await;

    if args.json {
        println!("{}", report.to_json()?);
    } else {
        print!("{}", report.summary(args.active_only));
    }

    if let Some(path) = args.csv {
        let path = path.unwrap_or_else(|| PathBuf::from(&config.screener.export_file));
        report
            .save_csv(&path)
            .with_context(|| format!("Failed to export CSV to {}", path.display()))?;
        info!(path = %path.display(), rows = report.rows.len(), "Exported CSV");
    }

    Ok(())
}
