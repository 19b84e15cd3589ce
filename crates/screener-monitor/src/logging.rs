//! Logging setup.

use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Keeps the file writer flushing; drop it only on exit.
pub type LogGuard = WorkerGuard;

/// Setup logging with the given level.
///
/// `RUST_LOG` overrides `level`. With `file` set, events are also appended
/// to that file without ANSI colors. `console` is off while the dashboard
/// owns the terminal.
pub fn setup_logging(
    level: &str,
    json: bool,
    file: Option<&Path>,
    console: bool,
) -> Option<LogGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let (file_layer, guard) = match file {
        Some(path) => {
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."));
            let name = path
                .file_name()
                .map(|n| n.to_os_string())
                .unwrap_or_else(|| "screener.log".into());
            let (writer, guard) =
                tracing_appender::non_blocking(tracing_appender::rolling::never(dir, name));
            (
                Some(fmt::layer().with_ansi(false).with_writer(writer)),
                Some(guard),
            )
        }
        None => (None, None),
    };

    let registry = tracing_subscriber::registry().with(filter).with(file_layer);

    if json {
        registry.with(console.then(|| fmt::layer().json())).init();
    } else {
        registry.with(console.then(|| fmt::layer().pretty())).init();
    }

    guard
}
