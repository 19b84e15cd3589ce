//! Configuration management.

mod settings;

pub use settings::{
    AlertSettings, AppConfig, AppSettings, FootprintSettings, LoggingConfig, ScreenerSettings,
    TelegramSettings,
};

use config::{Config, ConfigError, Environment, File};
use std::path::Path;

fn build(path: &Path, required: bool) -> Result<AppConfig, ConfigError> {
    let config = Config::builder()
        .add_source(File::from(path).required(required))
        .add_source(
            Environment::with_prefix("SCREENER")
                .separator("__")
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("screener.instruments")
                .with_list_parse_key("multi_timeframe.timeframes")
                .with_list_parse_key("multi_timeframe.band_timeframes"),
        )
        .build()?;

    config.try_deserialize()
}

/// Load configuration from file and environment.
pub fn load_config(path: &Path) -> Result<AppConfig, ConfigError> {
    build(path, true)
}

/// Like [`load_config`], but a missing file falls back to the defaults.
pub fn load_config_or_default(path: &Path) -> Result<AppConfig, ConfigError> {
    build(path, false)
}
