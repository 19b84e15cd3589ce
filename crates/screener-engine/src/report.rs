//! Screener report generation.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io;
use std::path::Path;

use screener_alerts::{group_thousands, DispatchOutcome};
use screener_core::error::ScreenerError;
use screener_core::types::Classification;
use screener_signals::SignalEvaluation;

/// One instrument's line in the report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScreenerRow {
    pub evaluation: SignalEvaluation,
    /// Dispatch result; `None` when alerting was not wired in.
    pub alert: Option<DispatchOutcome>,
}

impl ScreenerRow {
    /// Whether this row's alert was delivered during the cycle.
    pub fn alert_sent(&self) -> bool {
        matches!(self.alert, Some(DispatchOutcome::Sent))
    }
}

/// Result of one evaluation cycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScreenerReport {
    pub strategy: String,
    pub generated_at: DateTime<Local>,
    /// One row per configured instrument, in configured order.
    pub rows: Vec<ScreenerRow>,
}

impl ScreenerReport {
    pub fn new(
        strategy: impl Into<String>,
        rows: Vec<ScreenerRow>,
        generated_at: DateTime<Local>,
    ) -> Self {
        Self {
            strategy: strategy.into(),
            generated_at,
            rows,
        }
    }

    /// False when no instrument produced usable data.
    pub fn has_data(&self) -> bool {
        self.rows
            .iter()
            .any(|r| r.evaluation.classification != Classification::NoData)
    }

    pub fn count(&self, classification: Classification) -> usize {
        self.rows
            .iter()
            .filter(|r| r.evaluation.classification == classification)
            .count()
    }

    /// BUY and SELL rows only.
    pub fn active(&self) -> impl Iterator<Item = &ScreenerRow> {
        self.rows
            .iter()
            .filter(|r| r.evaluation.classification.is_actionable())
    }

    pub fn alerts_sent(&self) -> usize {
        self.rows.iter().filter(|r| r.alert_sent()).count()
    }

    pub fn last_updated(&self) -> String {
        self.generated_at.format("%Y-%m-%d %H:%M:%S").to_string()
    }

    pub fn evaluations(&self) -> Vec<SignalEvaluation> {
        self.rows.iter().map(|r| r.evaluation.clone()).collect()
    }

    /// Generate a text table. `active_only` keeps BUY and SELL rows.
    pub fn summary(&self, active_only: bool) -> String {
        let mut s = String::new();

        s.push_str("═══════════════════════════════════════════════════════════════════════════════\n");
        s.push_str(&format!(
            "  SCREENER RESULTS  ({})\n",
            self.strategy
        ));
        s.push_str("═══════════════════════════════════════════════════════════════════════════════\n\n");

        if !self.has_data() {
            s.push_str("  ⚠️ No data returned for any instrument.\n\n");
        } else {
            s.push_str(&format!(
                "  {:<12} {:>12} {:<20} {:<14} {}\n",
                "Symbol", "Close", "Signal", "Action", "Details"
            ));
            s.push_str("───────────────────────────────────────────────────────────────────────────────\n");

            let rows: Vec<&ScreenerRow> = if active_only {
                self.active().collect()
            } else {
                self.rows.iter().collect()
            };

            if rows.is_empty() {
                s.push_str("  No active BUY/SELL signals.\n");
            }
            for row in rows {
                let eval = &row.evaluation;
                s.push_str(&format!(
                    "  {:<12} {:>12} {:<20} {:<14} {}\n",
                    eval.symbol,
                    eval.close
                        .map(|c| format!("{:.2}", c))
                        .unwrap_or_else(|| "-".to_string()),
                    eval.classification.label(),
                    eval.classification.action(),
                    eval.summary()
                ));
            }
            s.push('\n');

            s.push_str(&format!(
                "  BUY: {}  SELL: {}  No data: {}  Alerts sent: {}\n",
                self.count(Classification::Buy),
                self.count(Classification::Sell),
                self.count(Classification::NoData),
                self.alerts_sent()
            ));
        }

        s.push_str("═══════════════════════════════════════════════════════════════════════════════\n");
        s.push_str(&format!("🕒 Last updated: {}\n", self.last_updated()));

        s
    }

    /// Export to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Write the full table as CSV.
    pub fn write_csv<W: io::Write>(&self, writer: W) -> Result<(), csv::Error> {
        let mut wtr = csv::Writer::from_writer(writer);
        for row in &self.rows {
            wtr.serialize(CsvRow::from(&row.evaluation))?;
        }
        wtr.flush()?;
        Ok(())
    }

    /// Export the full table to a CSV file.
    pub fn save_csv(&self, path: &Path) -> Result<(), ScreenerError> {
        let file = File::create(path)?;
        self.write_csv(file)
            .map_err(|e| ScreenerError::Serialization(e.to_string()))
    }
}

#[derive(Serialize)]
struct CsvRow<'a> {
    #[serde(rename = "Symbol")]
    symbol: &'a str,
    #[serde(rename = "CMP")]
    cmp: Option<f64>,
    #[serde(rename = "Prev Close")]
    prev_close: Option<f64>,
    #[serde(rename = "Avg Volume")]
    avg_volume: Option<String>,
    #[serde(rename = "Today Vol")]
    today_volume: Option<String>,
    #[serde(rename = "Delivery %")]
    delivery_pct: Option<f64>,
    #[serde(rename = "Breakout")]
    breakout: Option<bool>,
    #[serde(rename = "Vol Surge")]
    volume_surge: Option<bool>,
    #[serde(rename = "Price Strength")]
    price_strength: Option<bool>,
    #[serde(rename = "MACD")]
    macd: Option<String>,
    #[serde(rename = "RSI")]
    rsi: Option<String>,
    #[serde(rename = "Long Buildup")]
    long_buildup: &'static str,
    #[serde(rename = "Short Buildup")]
    short_buildup: &'static str,
    #[serde(rename = "Signal")]
    signal: &'static str,
    #[serde(rename = "Action")]
    action: &'static str,
    #[serde(rename = "Details")]
    details: String,
}

impl<'a> From<&'a SignalEvaluation> for CsvRow<'a> {
    fn from(eval: &'a SignalEvaluation) -> Self {
        let reading = eval.footprint();
        let tick = |b: bool| if b { "✅" } else { "" };

        Self {
            symbol: &eval.symbol,
            cmp: eval.close.map(round2),
            prev_close: reading.map(|r| round2(r.prev_close)),
            avg_volume: reading.map(|r| group_thousands(r.avg_volume)),
            today_volume: reading.map(|r| group_thousands(r.volume)),
            delivery_pct: reading.and_then(|r| r.delivery_pct),
            breakout: reading.map(|r| r.breakout),
            volume_surge: reading.map(|r| r.volume_surge),
            price_strength: reading.map(|r| r.price_strength),
            macd: reading.map(|r| r.macd.to_string()),
            rsi: reading.and_then(|r| r.rsi_zone).map(|z| z.to_string()),
            long_buildup: reading.map_or("", |r| tick(r.long_buildup)),
            short_buildup: reading.map_or("", |r| tick(r.short_buildup)),
            signal: eval.classification.label(),
            action: eval.classification.action(),
            details: eval.summary(),
        }
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use screener_core::types::{Timeframe, TrendDirection};
    use screener_indicators::{BandCross, MacdRegime, RsiZone};
    use screener_signals::{FootprintReading, SignalDetail, TimeframeReading};

    fn footprint_row(symbol: &str, classification: Classification) -> ScreenerRow {
        ScreenerRow {
            evaluation: SignalEvaluation {
                symbol: symbol.into(),
                classification,
                close: Some(130.004),
                detail: SignalDetail::Footprint(FootprintReading {
                    close: 130.004,
                    prev_close: 128.0,
                    volume: 2000.0,
                    avg_volume: 1000.0,
                    recent_high: 128.0,
                    delivery_pct: Some(200.0),
                    breakout: true,
                    volume_surge: true,
                    price_strength: true,
                    macd: MacdRegime::Bullish,
                    rsi: Some(100.0),
                    rsi_zone: Some(RsiZone::Overbought),
                    ema: Some(120.0),
                    long_buildup: true,
                    short_buildup: false,
                }),
            },
            alert: Some(DispatchOutcome::Sent),
        }
    }

    fn report(rows: Vec<ScreenerRow>) -> ScreenerReport {
        ScreenerReport::new("footprint", rows, Local::now())
    }

    #[test]
    fn test_summary_lists_rows() {
        let report = report(vec![
            footprint_row("TCS", Classification::Buy),
            ScreenerRow {
                evaluation: SignalEvaluation::unavailable("HAL", "fetch failed"),
                alert: None,
            },
        ]);

        let summary = report.summary(false);
        assert!(summary.contains("TCS"));
        assert!(summary.contains("HAL"));
        assert!(summary.contains("130.00"));
        assert!(summary.contains("Alerts sent: 1"));
        assert!(summary.contains("Last updated"));

        let active = report.summary(true);
        assert!(active.contains("TCS"));
        assert!(!active.contains("HAL"));
    }

    #[test]
    fn test_no_data_state() {
        let report = report(vec![ScreenerRow {
            evaluation: SignalEvaluation::unavailable("HAL", "fetch failed"),
            alert: None,
        }]);
        assert!(!report.has_data());
        assert!(report.summary(false).contains("No data returned"));
    }

    #[test]
    fn test_csv_columns() {
        let mtf = ScreenerRow {
            evaluation: SignalEvaluation {
                symbol: "BTCUSDT".into(),
                classification: Classification::TrendOnly(TrendDirection::Bullish),
                close: Some(65000.0),
                detail: SignalDetail::MultiTimeframe {
                    timeframes: vec![TimeframeReading {
                        timeframe: Timeframe::Minute5,
                        trend: Some(TrendDirection::Bullish),
                        band_cross: Some(BandCross::NoCross),
                        close: Some(65000.0),
                    }],
                },
            },
            alert: None,
        };
        let report = report(vec![footprint_row("TCS", Classification::Buy), mtf]);

        let mut buf = Vec::new();
        report.write_csv(&mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert!(lines[0].starts_with("Symbol,CMP,Prev Close,Avg Volume,Today Vol,Delivery %"));
        assert!(lines[0].ends_with("Signal,Action,Details"));
        assert!(lines[1].starts_with("TCS,130.0,128.0,\"1,000\",\"2,000\",200.0,true,true,true"));
        assert!(lines[1].contains(",BUY,"));
        assert!(lines[2].starts_with("BTCUSDT,65000.0,,,,,,,,,,,,TREND_ONLY_BULLISH,"));
    }

    #[test]
    fn test_json_export() {
        let report = report(vec![footprint_row("TCS", Classification::Buy)]);
        let json = report.to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["strategy"], "footprint");
        assert_eq!(value["rows"][0]["evaluation"]["classification"], "buy");
        assert_eq!(value["rows"][0]["alert"], "sent");
    }
}
