//! Logging setup and TUI dashboard.

mod dashboard;
mod logging;

pub use dashboard::{Dashboard, DashboardState};
pub use logging::{setup_logging, LogGuard};
