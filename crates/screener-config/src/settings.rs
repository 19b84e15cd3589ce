//! Configuration structures.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use screener_core::error::ScreenerError;
use screener_core::types::Timeframe;
use screener_data::{FetcherOptions, Provider};
use screener_indicators::IndicatorParams;
use screener_signals::{FootprintConfig, MultiTimeframeConfig, StrategyRegistry};

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub app: AppSettings,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub screener: ScreenerSettings,
    #[serde(default)]
    pub indicators: IndicatorParams,
    #[serde(default)]
    pub footprint: FootprintSettings,
    #[serde(default)]
    pub multi_timeframe: MultiTimeframeConfig,
    #[serde(default)]
    pub alerts: AlertSettings,
    #[serde(default)]
    pub telegram: TelegramSettings,
}

/// General app settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppSettings {
    pub name: String,
    pub environment: String,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            name: "footprint-screener".to_string(),
            environment: "development".to_string(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
    pub file: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
            file: None,
        }
    }
}

/// What to screen and where the bars come from.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScreenerSettings {
    pub refresh_interval_min: u64,
    /// Registry name of the classifier
    pub strategy: String,
    pub instruments: Vec<String>,
    pub provider: Provider,
    /// Exchange suffix for Yahoo tickers
    pub symbol_suffix: String,
    /// Overrides the provider's default endpoint
    pub base_url: Option<String>,
    /// Footprint bar interval
    pub timeframe: Timeframe,
    pub lookback_days: u32,
    pub min_bars: usize,
    pub csv_dir: Option<String>,
    /// Default CSV export file name
    pub export_file: String,
}

impl Default for ScreenerSettings {
    fn default() -> Self {
        let instruments = [
            "RELIANCE", "HDFCBANK", "INFY", "TCS", "ICICIBANK", "LT", "SBIN", "KOTAKBANK",
            "AXISBANK", "BSE", "BHARTIARTL", "TITAN", "ASIANPAINT", "OFSS", "MARUTI", "BOSCHLTD",
            "TRENT", "NESTLEIND", "ULTRACEMCO", "MCX", "CAMS", "COFORGE", "HAL", "KEI",
        ];
        Self {
            refresh_interval_min: 5,
            strategy: "footprint".to_string(),
            instruments: instruments.iter().map(|s| s.to_string()).collect(),
            provider: Provider::Yahoo,
            symbol_suffix: ".NS".to_string(),
            base_url: None,
            timeframe: Timeframe::Daily,
            lookback_days: 15,
            min_bars: 10,
            csv_dir: None,
            export_file: "fii_dii_signals.csv".to_string(),
        }
    }
}

/// Footprint thresholds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FootprintSettings {
    pub lookback: usize,
    pub volume_surge_ratio: f64,
    pub price_strength_ratio: f64,
}

impl Default for FootprintSettings {
    fn default() -> Self {
        let defaults = FootprintConfig::default();
        Self {
            lookback: defaults.lookback,
            volume_surge_ratio: defaults.volume_surge_ratio,
            price_strength_ratio: defaults.price_strength_ratio,
        }
    }
}

/// Alert delivery settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertSettings {
    /// Live toggle; when off signals are computed but never sent
    pub enabled: bool,
    pub log_file: String,
    /// Forget keys older than this; `None` keeps them forever
    pub max_age_days: Option<u32>,
}

impl Default for AlertSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            log_file: "alert_log.json".to_string(),
            max_age_days: None,
        }
    }
}

/// Telegram credentials are read from these environment variables.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TelegramSettings {
    pub token_env: String,
    pub chat_id_env: String,
    pub api_base: String,
}

impl Default for TelegramSettings {
    fn default() -> Self {
        Self {
            token_env: "TELEGRAM_TOKEN".to_string(),
            chat_id_env: "TELEGRAM_CHAT_ID".to_string(),
            api_base: "https://api.telegram.org".to_string(),
        }
    }
}

impl AppConfig {
    /// Reject inconsistent settings before anything runs.
    pub fn validate(&self) -> Result<(), ScreenerError> {
        let fail = |msg: String| Err(ScreenerError::Config(msg));

        if self.screener.instruments.is_empty() {
            return fail("screener.instruments must list at least one symbol".into());
        }
        if self.screener.instruments.iter().any(|s| s.trim().is_empty()) {
            return fail("screener.instruments contains an empty symbol".into());
        }
        if self.screener.refresh_interval_min == 0 {
            return fail("screener.refresh_interval_min must be greater than 0".into());
        }
        if !matches!(self.logging.format.as_str(), "pretty" | "json") {
            return fail(format!(
                "logging.format must be \"pretty\" or \"json\", got \"{}\"",
                self.logging.format
            ));
        }
        if self.alerts.log_file.trim().is_empty() {
            return fail("alerts.log_file must not be empty".into());
        }

        self.indicators
            .validate()
            .map_err(|e| ScreenerError::Config(format!("indicators: {}", e)))?;

        let registry = StrategyRegistry::new();
        if !registry.exists(&self.screener.strategy) {
            return fail(format!(
                "Unknown strategy \"{}\"; expected one of {}",
                self.screener.strategy,
                registry
                    .list()
                    .iter()
                    .map(|s| s.name.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            ));
        }
        self.footprint_config().validate()?;
        self.multi_timeframe.validate()?;

        Ok(())
    }

    /// Footprint classifier configuration assembled from its sections.
    pub fn footprint_config(&self) -> FootprintConfig {
        FootprintConfig {
            timeframe: self.screener.timeframe,
            lookback_days: self.screener.lookback_days,
            lookback: self.footprint.lookback,
            min_bars: self.screener.min_bars,
            volume_surge_ratio: self.footprint.volume_surge_ratio,
            price_strength_ratio: self.footprint.price_strength_ratio,
        }
    }

    /// JSON configuration for the selected strategy, as the registry
    /// expects it.
    pub fn strategy_config(&self) -> Result<serde_json::Value, ScreenerError> {
        let value = if self.screener.strategy == "footprint" {
            serde_json::to_value(self.footprint_config())
        } else {
            serde_json::to_value(&self.multi_timeframe)
        };
        value.map_err(|e| ScreenerError::Serialization(e.to_string()))
    }

    pub fn fetcher_options(&self) -> FetcherOptions {
        FetcherOptions {
            symbol_suffix: self.screener.symbol_suffix.clone(),
            base_url: self.screener.base_url.clone(),
            csv_dir: self.screener.csv_dir.as_ref().map(PathBuf::from),
        }
    }

    /// Render the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ScreenerError> {
        toml::to_string_pretty(self).map_err(|e| ScreenerError::Serialization(e.to_string()))
    }
}
