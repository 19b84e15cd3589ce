//! Alert deduplication and delivery.
//!
//! The [`AlertLog`] remembers which `(symbol, signal)` pairs already fired;
//! the [`AlertDispatcher`] consults it, formats the message and hands it to
//! a [`NotificationSink`].
//!
//! [`NotificationSink`]: screener_core::traits::NotificationSink

mod dispatcher;
mod log;
mod message;
mod sink;
mod telegram;

pub use dispatcher::{AlertDispatcher, DispatchOutcome};
pub use log::AlertLog;
pub use message::{format_alert, group_thousands};
pub use sink::LogSink;
pub use telegram::{TelegramConfig, TelegramSink, DEFAULT_API_BASE};
