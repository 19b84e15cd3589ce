//! Evaluation cycle and screener report.
//!
//! One cycle fetches every configured instrument in turn, classifies it,
//! hands actionable results to the alert dispatcher and collects the rows
//! into a [`ScreenerReport`].

mod cycle;
mod report;

pub use cycle::Screener;
pub use report::{ScreenerReport, ScreenerRow};
