//! Strategy registry for selecting a classifier by name.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use screener_core::error::StrategyError;
use screener_indicators::IndicatorParams;

use crate::{
    Classifier, FootprintClassifier, FootprintConfig, MultiTimeframeClassifier,
    MultiTimeframeConfig,
};

/// Information about a registered strategy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategyInfo {
    /// Registry key
    pub name: String,
    /// Strategy description
    pub description: String,
    /// Default configuration as JSON
    pub default_config: serde_json::Value,
}

/// Registry for the built-in classifiers.
pub struct StrategyRegistry {
    strategies: BTreeMap<String, StrategyInfo>,
}

impl StrategyRegistry {
    /// Create a new registry with all built-in strategies.
    pub fn new() -> Self {
        let mut strategies = BTreeMap::new();

        let mut register = |name: &str, description: &str, default_config: serde_json::Value| {
            strategies.insert(
                name.to_string(),
                StrategyInfo {
                    name: name.to_string(),
                    description: description.to_string(),
                    default_config,
                },
            );
        };

        register(
            "footprint",
            "Single timeframe: breakout + volume surge + price strength + MACD",
            serde_json::to_value(FootprintConfig::default()).unwrap_or_default(),
        );
        register(
            "mtf_unanimous",
            "Multi-timeframe: all Supertrends agree, confirmed by a band cross",
            serde_json::to_value(MultiTimeframeConfig::default()).unwrap_or_default(),
        );
        register(
            "mtf_majority",
            "Multi-timeframe: unanimous rule, else majority-vote bias",
            serde_json::to_value(MultiTimeframeConfig::default()).unwrap_or_default(),
        );

        Self { strategies }
    }

    /// List all available strategies, sorted by name.
    pub fn list(&self) -> Vec<&StrategyInfo> {
        self.strategies.values().collect()
    }

    /// Get strategy info by name.
    pub fn get(&self, name: &str) -> Option<&StrategyInfo> {
        self.strategies.get(name)
    }

    /// Check if a strategy exists.
    pub fn exists(&self, name: &str) -> bool {
        self.strategies.contains_key(name)
    }

    /// Create a classifier from its configuration.
    pub fn create(
        &self,
        name: &str,
        config: serde_json::Value,
        params: IndicatorParams,
    ) -> Result<Box<dyn Classifier>, StrategyError> {
        params
            .validate()
            .map_err(|e| StrategyError::InvalidConfig(e.to_string()))?;

        match name {
            "footprint" => {
                let config: FootprintConfig = serde_json::from_value(config)
                    .map_err(|e| StrategyError::InvalidConfig(e.to_string()))?;
                config.validate()?;
                Ok(Box::new(FootprintClassifier::new(config, params)))
            }
            "mtf_unanimous" | "mtf_majority" => {
                let config: MultiTimeframeConfig = serde_json::from_value(config)
                    .map_err(|e| StrategyError::InvalidConfig(e.to_string()))?;
                config.validate()?;
                if name == "mtf_unanimous" {
                    Ok(Box::new(MultiTimeframeClassifier::unanimous(config, params)))
                } else {
                    Ok(Box::new(MultiTimeframeClassifier::majority(config, params)))
                }
            }
            _ => Err(StrategyError::NotFound(name.to_string())),
        }
    }

    /// Create a classifier with default configuration.
    pub fn create_default(
        &self,
        name: &str,
        params: IndicatorParams,
    ) -> Result<Box<dyn Classifier>, StrategyError> {
        let info = self
            .get(name)
            .ok_or_else(|| StrategyError::NotFound(name.to_string()))?;
        self.create(name, info.default_config.clone(), params)
    }
}

impl Default for StrategyRegistry {
    fn default() -> Self {
        Self::new()
    }
}
