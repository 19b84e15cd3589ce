//! Core traits for the screener.

mod data_source;
mod indicator;
mod notifier;

pub use data_source::BarFetcher;
pub use indicator::{Indicator, MultiOutputIndicator, OhlcvIndicator};
pub use notifier::NotificationSink;
