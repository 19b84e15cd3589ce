//! CLI command implementations.

pub mod clear_alerts;
pub mod scan;
pub mod strategies;
pub mod validate;
pub mod watch;

use anyhow::{Context, Result};
use tracing::{info, warn};

use screener_alerts::{AlertDispatcher, AlertLog, LogSink, TelegramConfig, TelegramSink};
use screener_config::AppConfig;
use screener_core::traits::NotificationSink;
use screener_data::build_fetcher;
use screener_engine::Screener;
use screener_signals::StrategyRegistry;

/// Assemble the screener described by `config`.
pub(crate) fn build_screener(config: &AppConfig, alerts: bool) -> Result<Screener> {
    config.validate().context("Invalid configuration")?;

    let classifier = StrategyRegistry::new()
        .create(
            &config.screener.strategy,
            config.strategy_config()?,
            config.indicators.clone(),
        )
        .with_context(|| format!("Failed to create strategy {}", config.screener.strategy))?;

    let fetcher = build_fetcher(config.screener.provider, &config.fetcher_options())
        .with_context(|| format!("Failed to create {} fetcher", config.screener.provider))?;

    info!(
        strategy = classifier.name(),
        provider = fetcher.name(),
        instruments = config.screener.instruments.len(),
        "Screener ready"
    );

    let screener = Screener::new(fetcher, classifier, config.screener.instruments.clone());
    if !alerts {
        return Ok(screener);
    }

    let log = AlertLog::load(&config.alerts.log_file)
        .with_context(|| format!("Failed to load alert log {}", config.alerts.log_file))?;
    let dispatcher = AlertDispatcher::new(log, build_sink(config), config.alerts.enabled)
        .with_max_age_days(config.alerts.max_age_days);

    Ok(screener.with_dispatcher(dispatcher))
}

/// Telegram when its credentials are present, the log otherwise.
fn build_sink(config: &AppConfig) -> Box<dyn NotificationSink> {
    let telegram = &config.telegram;
    match TelegramConfig::from_env(&telegram.token_env, &telegram.chat_id_env, &telegram.api_base)
        .and_then(TelegramSink::new)
    {
        Ok(sink) => Box::new(sink),
        Err(e) => {
            warn!(error = %e, "Telegram not configured; alerts go to the log");
            Box::new(LogSink)
        }
    }
}
