//! Chat message formatting (Telegram Markdown).

use screener_signals::{FootprintReading, SignalDetail, SignalEvaluation, TimeframeReading};

/// Render the notification text for an evaluation.
pub fn format_alert(eval: &SignalEvaluation) -> String {
    match &eval.detail {
        SignalDetail::Footprint(reading) => footprint_message(eval, reading),
        SignalDetail::MultiTimeframe { timeframes } => multi_timeframe_message(eval, timeframes),
        SignalDetail::Unavailable { reason } => format!(
            "*{}* ▶️ {}\n{}",
            eval.symbol, eval.classification, reason
        ),
    }
}

fn footprint_message(eval: &SignalEvaluation, r: &FootprintReading) -> String {
    let tick = |b: bool| if b { "✅" } else { "-" };
    let delivery = r
        .delivery_pct
        .map_or_else(|| "-".to_string(), |pct| format!("{}%", pct));
    let rsi = r.rsi_zone.map_or_else(|| "n/a".to_string(), |z| z.to_string());

    format!(
        "🧠 *FII/DII Footprint Alert*\n\
         *{}* ▶️ {}\n\
         CMP: ₹{:.2}\n\
         Volume: {} (Avg: {})\n\
         Delivery%: {}\n\
         Breakout: {}\n\
         MACD: {}\n\
         RSI: {}\n\
         Long Buildup: {}\n\
         Short Buildup: {}\n\
         Action: {}",
        eval.symbol,
        eval.classification,
        r.close,
        group_thousands(r.volume),
        group_thousands(r.avg_volume),
        delivery,
        if r.breakout { "✅" } else { "❌" },
        r.macd,
        rsi,
        tick(r.long_buildup),
        tick(r.short_buildup),
        eval.classification.action(),
    )
}

fn multi_timeframe_message(eval: &SignalEvaluation, timeframes: &[TimeframeReading]) -> String {
    let mut msg = String::from("🧠 *Multi-Timeframe Trend Alert*\n");
    msg.push_str(&format!("*{}* ▶️ {}\n", eval.symbol, eval.classification));
    if let Some(close) = eval.close {
        msg.push_str(&format!("Price: {:.2}\n", close));
    }
    for tf in timeframes {
        let trend = tf.trend.map_or_else(|| "n/a".to_string(), |d| d.to_string());
        match tf.band_cross {
            Some(cross) => msg.push_str(&format!("{}: {} | BB {}\n", tf.timeframe, trend, cross)),
            None => msg.push_str(&format!("{}: {}\n", tf.timeframe, trend)),
        }
    }
    msg.push_str(&format!("Action: {}", eval.classification.action()));
    msg
}

/// Integer part with comma separators, e.g. `1,234,567`.
pub fn group_thousands(value: f64) -> String {
    let digits = (value.abs().trunc() as u64).to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if value < 0.0 && value.trunc() != 0.0 {
        out.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use screener_core::types::{Classification, Timeframe, TrendDirection};
    use screener_indicators::{BandCross, MacdRegime, RsiZone};

    fn footprint_eval() -> SignalEvaluation {
        SignalEvaluation {
            symbol: "RELIANCE".into(),
            classification: Classification::Buy,
            close: Some(2950.5),
            detail: SignalDetail::Footprint(FootprintReading {
                close: 2950.5,
                prev_close: 2900.0,
                volume: 12_345_678.0,
                avg_volume: 6_000_000.4,
                recent_high: 2920.0,
                delivery_pct: Some(205.76),
                breakout: true,
                volume_surge: true,
                price_strength: true,
                macd: MacdRegime::Bullish,
                rsi: Some(64.0),
                rsi_zone: Some(RsiZone::Neutral),
                ema: Some(2880.0),
                long_buildup: true,
                short_buildup: false,
            }),
        }
    }

    #[test]
    fn test_group_thousands() {
        assert_eq!(group_thousands(0.0), "0");
        assert_eq!(group_thousands(999.9), "999");
        assert_eq!(group_thousands(1000.0), "1,000");
        assert_eq!(group_thousands(12_345_678.0), "12,345,678");
        assert_eq!(group_thousands(-4500.0), "-4,500");
    }

    #[test]
    fn test_footprint_message() {
        let msg = format_alert(&footprint_eval());
        let lines: Vec<&str> = msg.lines().collect();

        assert_eq!(lines[0], "🧠 *FII/DII Footprint Alert*");
        assert_eq!(lines[1], "*RELIANCE* ▶️ BUY");
        assert_eq!(lines[2], "CMP: ₹2950.50");
        assert_eq!(lines[3], "Volume: 12,345,678 (Avg: 6,000,000)");
        assert_eq!(lines[4], "Delivery%: 205.76%");
        assert_eq!(lines[5], "Breakout: ✅");
        assert_eq!(lines[6], "MACD: Bullish");
        assert_eq!(lines[7], "RSI: Neutral");
        assert_eq!(lines[8], "Long Buildup: ✅");
        assert_eq!(lines[9], "Short Buildup: -");
        assert_eq!(lines[10], "Action: 📈 Buy");
    }

    #[test]
    fn test_multi_timeframe_message() {
        let eval = SignalEvaluation {
            symbol: "BTCUSDT".into(),
            classification: Classification::Sell,
            close: Some(60123.456),
            detail: SignalDetail::MultiTimeframe {
                timeframes: vec![
                    TimeframeReading {
                        timeframe: Timeframe::Minute5,
                        trend: Some(TrendDirection::Bearish),
                        band_cross: Some(BandCross::Down),
                        close: Some(60123.456),
                    },
                    TimeframeReading {
                        timeframe: Timeframe::Hour1,
                        trend: Some(TrendDirection::Bearish),
                        band_cross: None,
                        close: Some(60200.0),
                    },
                ],
            },
        };

        let msg = format_alert(&eval);
        assert!(msg.contains("*BTCUSDT* ▶️ SELL"));
        assert!(msg.contains("Price: 60123.46"));
        assert!(msg.contains("5m: BEARISH | BB DOWN"));
        assert!(msg.contains("1h: BEARISH\n"));
        assert!(msg.ends_with("Action: 📉 Sell"));
    }
}
