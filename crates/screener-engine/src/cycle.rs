//! The evaluation cycle.

use chrono::Local;
use tracing::{debug, info, warn};

use screener_alerts::AlertDispatcher;
use screener_core::traits::BarFetcher;
use screener_core::types::Classification;
use screener_signals::{Classifier, SeriesSet};

use crate::report::{ScreenerReport, ScreenerRow};

/// Fetches, classifies and dispatches, one instrument at a time.
pub struct Screener {
    fetcher: Box<dyn BarFetcher>,
    classifier: Box<dyn Classifier>,
    instruments: Vec<String>,
    dispatcher: Option<AlertDispatcher>,
}

impl Screener {
    /// Create a screener without alerting.
    pub fn new(
        fetcher: Box<dyn BarFetcher>,
        classifier: Box<dyn Classifier>,
        instruments: Vec<String>,
    ) -> Self {
        Self {
            fetcher,
            classifier,
            instruments,
            dispatcher: None,
        }
    }

    /// Route actionable signals through `dispatcher`.
    pub fn with_dispatcher(mut self, dispatcher: AlertDispatcher) -> Self {
        self.dispatcher = Some(dispatcher);
        self
    }

    pub fn strategy_name(&self) -> &str {
        self.classifier.name()
    }

    pub fn fetcher_name(&self) -> &str {
        self.fetcher.name()
    }

    pub fn instruments(&self) -> &[String] {
        &self.instruments
    }

    pub fn dispatcher(&self) -> Option<&AlertDispatcher> {
        self.dispatcher.as_ref()
    }

    /// Run one full cycle over every instrument.
    ///
    /// Never fails: a bad instrument becomes a NO_DATA row and a failed
    /// delivery is recorded on its row.
    pub async fn run_cycle(&mut self) -> ScreenerReport {
        if let Some(dispatcher) = self.dispatcher.as_mut() {
            dispatcher.begin_cycle();
        }

        let instruments = self.instruments.clone();
        let mut rows = Vec::with_capacity(instruments.len());

        for symbol in &instruments {
            let series = self.fetch_series(symbol).await;
            let evaluation = self.classifier.classify(symbol, &series);
            debug!(
                symbol = %symbol,
                signal = %evaluation.classification,
                "Classified"
            );

            let alert = match self.dispatcher.as_mut() {
                Some(dispatcher) => Some(dispatcher.dispatch(&evaluation).await),
                None => None,
            };

            rows.push(ScreenerRow { evaluation, alert });
        }

        let report = ScreenerReport::new(self.classifier.name(), rows, Local::now());
        info!(
            strategy = self.classifier.name(),
            instruments = report.rows.len(),
            buy = report.count(Classification::Buy),
            sell = report.count(Classification::Sell),
            no_data = report.count(Classification::NoData),
            alerts_sent = report.alerts_sent(),
            "Cycle complete"
        );
        report
    }

    /// Fetch every series the classifier needs. Failures leave the
    /// timeframe out of the set.
    async fn fetch_series(&self, symbol: &str) -> SeriesSet {
        let mut set = SeriesSet::new();

        for (timeframe, lookback) in self.classifier.requirements() {
            match self.fetcher.fetch(symbol, timeframe, lookback).await {
                Ok(series) if series.is_empty() => {
                    warn!(symbol, timeframe = %timeframe, "Empty series; treating as no data");
                }
                Ok(series) => {
                    set.insert(timeframe, series);
                }
                Err(e) => {
                    warn!(
                        symbol,
                        timeframe = %timeframe,
                        source = self.fetcher.name(),
                        error = %e,
                        "Fetch failed; treating as no data"
                    );
                }
            }
        }

        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use screener_alerts::{AlertLog, DispatchOutcome};
    use screener_core::error::{DataError, NotifyError};
    use screener_core::traits::NotificationSink;
    use screener_core::types::{Bar, BarSeries, Lookback, Timeframe};
    use screener_indicators::IndicatorParams;
    use screener_signals::StrategyRegistry;
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    struct MapFetcher {
        bars: HashMap<String, Vec<Bar>>,
    }

    #[async_trait]
    impl BarFetcher for MapFetcher {
        async fn fetch(
            &self,
            symbol: &str,
            timeframe: Timeframe,
            _lookback: Lookback,
        ) -> Result<BarSeries, DataError> {
            self.bars
                .get(symbol)
                .map(|bars| BarSeries::from_bars(symbol, timeframe, bars.clone()))
                .ok_or_else(|| DataError::SymbolNotFound(symbol.to_string()))
        }

        fn name(&self) -> &str {
            "map"
        }
    }

    #[derive(Clone, Default)]
    struct Recording {
        sent: Arc<Mutex<Vec<String>>>,
    }

    #[async_trait]
    impl NotificationSink for Recording {
        async fn notify(&self, text: &str) -> Result<(), NotifyError> {
            self.sent.lock().unwrap().push(text.to_string());
            Ok(())
        }

        fn name(&self) -> &str {
            "recording"
        }
    }

    fn bar(i: usize, close: f64, volume: f64) -> Bar {
        Bar::new(i as i64 * 86_400_000, close, close + 1.0, close - 1.0, close, volume)
    }

    fn breakout_bars() -> Vec<Bar> {
        let mut bars: Vec<Bar> = (0..29).map(|i| bar(i, 100.0 + i as f64, 1000.0)).collect();
        bars.push(bar(29, 130.0, 2000.0));
        bars
    }

    fn screener(instruments: &[&str]) -> Screener {
        let mut bars = HashMap::new();
        bars.insert("TCS".to_string(), breakout_bars());
        bars.insert(
            "FLAT".to_string(),
            (0..30).map(|i| bar(i, 50.0, 1000.0)).collect(),
        );
        bars.insert("SHORT".to_string(), (0..4).map(|i| bar(i, 50.0, 1000.0)).collect());

        let classifier = StrategyRegistry::new()
            .create_default("footprint", IndicatorParams::default())
            .unwrap();
        Screener::new(
            Box::new(MapFetcher { bars }),
            classifier,
            instruments.iter().map(|s| s.to_string()).collect(),
        )
    }

    #[tokio::test]
    async fn test_cycle_isolates_failures() {
        let mut screener = screener(&["TCS", "DELISTED", "FLAT", "SHORT"]);
        let report = screener.run_cycle().await;

        let signals: Vec<_> = report
            .rows
            .iter()
            .map(|r| (r.evaluation.symbol.as_str(), r.evaluation.classification))
            .collect();
        assert_eq!(
            signals,
            vec![
                ("TCS", Classification::Buy),
                ("DELISTED", Classification::NoData),
                ("FLAT", Classification::Avoid),
                ("SHORT", Classification::NoData),
            ]
        );
        assert!(report.rows.iter().all(|r| r.alert.is_none()));
        assert!(report.has_data());
    }

    #[tokio::test]
    async fn test_alert_fires_once_across_cycles() {
        let sink = Recording::default();
        let dispatcher = AlertDispatcher::new(AlertLog::in_memory(), Box::new(sink.clone()), true);
        let mut screener = screener(&["TCS", "FLAT"]).with_dispatcher(dispatcher);

        let first = screener.run_cycle().await;
        assert!(first.rows[0].alert_sent());
        assert_eq!(first.rows[1].alert, Some(DispatchOutcome::NotActionable));
        assert_eq!(first.alerts_sent(), 1);

        let second = screener.run_cycle().await;
        assert_eq!(second.rows[0].alert, Some(DispatchOutcome::Suppressed));

        let sent = sink.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].contains("*TCS* ▶️ BUY"));
        assert!(screener
            .dispatcher()
            .unwrap()
            .log()
            .contains("TCS_BUY"));
    }

    #[tokio::test]
    async fn test_all_missing_is_no_data_state() {
        let mut screener = screener(&["NOPE", "ALSO_NOPE"]);
        let report = screener.run_cycle().await;
        assert_eq!(report.rows.len(), 2);
        assert!(!report.has_data());
    }
}
