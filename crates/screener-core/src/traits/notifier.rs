//! Notification sink trait definition.

use crate::error::NotifyError;
use async_trait::async_trait;

/// Destination for formatted alert messages (chat bot, log, ...).
///
/// Delivery is best-effort: callers log failures and carry on.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    /// Deliver one formatted message.
    async fn notify(&self, text: &str) -> Result<(), NotifyError>;

    /// Get the sink name.
    fn name(&self) -> &str;
}
