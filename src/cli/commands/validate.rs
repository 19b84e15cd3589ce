//! Validate configuration command.

use anyhow::Result;
use std::path::Path;
use screener_config::load_config;

pub async fn run(config_path: &Path) -> Result<()> {
    println!("Validating configuration: {:?}", config_path);

    let config = match load_config(config_path) {
        Ok(config) => config,
        Err(e) => {
            println!("Configuration error: {}", e);
            return Err(e.into());
        }
    };

    if let Err(e) = config.validate() {
        println!("Configuration error: {}", e);
        return Err(e.into());
    }

    println!("Configuration is valid!");
    println!();
    println!("App: {}", config.app.name);
    println!("Environment: {}", config.app.environment);
    println!("Log level: {}", config.logging.level);
    println!("Strategy: {}", config.screener.strategy);
    println!("Provider: {}", config.screener.provider);
    println!("Instruments: {}", config.screener.instruments.join(", "));
    println!("Refresh: every {} min", config.screener.refresh_interval_min);
    println!(
        "Alerts: {} (log: {})",
        if config.alerts.enabled { "on" } else { "off" },
        config.alerts.log_file
    );

    Ok(())
}
