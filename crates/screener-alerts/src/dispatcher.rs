//! Alert dispatch: dedup, format, deliver, record.

use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use screener_core::traits::NotificationSink;
use screener_signals::SignalEvaluation;

use crate::log::AlertLog;
use crate::message::format_alert;

/// What happened to one evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DispatchOutcome {
    /// Not BUY or SELL.
    NotActionable,
    /// Already notified for this key.
    Suppressed,
    /// Would fire, but delivery is switched off.
    Disabled,
    Sent,
    /// Delivery failed; the key was not recorded and will retry next cycle.
    Failed(String),
}

/// Owns the alert log and the sink.
pub struct AlertDispatcher {
    log: AlertLog,
    sink: Box<dyn NotificationSink>,
    enabled: bool,
    max_age: Option<Duration>,
}

impl AlertDispatcher {
    /// `enabled` gates delivery only; classification always runs.
    pub fn new(log: AlertLog, sink: Box<dyn NotificationSink>, enabled: bool) -> Self {
        Self {
            log,
            sink,
            enabled,
            max_age: None,
        }
    }

    /// Prune keys older than `days` at the start of each cycle.
    pub fn with_max_age_days(mut self, days: Option<u32>) -> Self {
        self.max_age = days.map(|d| Duration::days(i64::from(d)));
        self
    }

    pub fn log(&self) -> &AlertLog {
        &self.log
    }

    pub fn log_mut(&mut self) -> &mut AlertLog {
        &mut self.log
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn sink_name(&self) -> &str {
        self.sink.name()
    }

    /// Refresh the log from disk, retry a failed save and apply age
    /// pruning.
    pub fn begin_cycle(&mut self) {
        if let Err(e) = self.log.reload() {
            warn!(error = %e, "Keeping in-memory alert log");
        }

        if self.log.has_unsaved() {
            info!("Retrying alert log save");
            self.persist();
        }

        if let Some(max_age) = self.max_age {
            let pruned = self.log.prune(max_age, Utc::now());
            if pruned > 0 {
                info!(pruned, "Pruned expired alert keys");
                self.persist();
            }
        }
    }

    /// Notify for one evaluation if it is new.
    pub async fn dispatch(&mut self, eval: &SignalEvaluation) -> DispatchOutcome {
        let classification = eval.classification;
        if !classification.is_actionable() {
            return DispatchOutcome::NotActionable;
        }
        if !self.log.should_notify(&eval.symbol, classification) {
            return DispatchOutcome::Suppressed;
        }
        if !self.enabled {
            return DispatchOutcome::Disabled;
        }

        let text = format_alert(eval);
        match self.sink.notify(&text).await {
            Ok(()) => {
                self.log.record(&eval.symbol, classification);
                self.persist();
                info!(
                    symbol = %eval.symbol,
                    signal = %classification,
                    sink = self.sink.name(),
                    "Alert sent"
                );
                DispatchOutcome::Sent
            }
            Err(e) => {
                warn!(
                    symbol = %eval.symbol,
                    signal = %classification,
                    error = %e,
                    "Alert delivery failed"
                );
                DispatchOutcome::Failed(e.to_string())
            }
        }
    }

    fn persist(&mut self) {
        if let Err(e) = self.log.save() {
            warn!(error = %e, "Failed to save alert log");
        }
    }
}
