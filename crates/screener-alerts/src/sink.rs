//! Local notification sinks.

use async_trait::async_trait;
use tracing::info;

use screener_core::error::NotifyError;
use screener_core::traits::NotificationSink;

/// Writes alerts to the log instead of a chat. Used when no chat
/// credentials are configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

#[async_trait]
impl NotificationSink for LogSink {
    async fn notify(&self, text: &str) -> Result<(), NotifyError> {
        info!(target: "screener::alert", "{}", text);
        Ok(())
    }

    fn name(&self) -> &str {
        "log"
    }
}
