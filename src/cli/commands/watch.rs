//! Periodic screening, plain or with the dashboard.

use anyhow::{Context, Result};
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::{info, warn};

use screener_config::AppConfig;
use screener_engine::{Screener, ScreenerReport};
use screener_monitor::{Dashboard, DashboardState};

use super::build_screener;
use crate::cli::WatchArgs;

const DASHBOARD_REFRESH_MS: u64 = 250;

pub async fn run(args: WatchArgs, config: &AppConfig) -> Result<()> {
    let screener = build_screener(config, true)?;
    let interval = Duration::from_secs(config.screener.refresh_interval_min * 60);

    info!(
        interval_min = config.screener.refresh_interval_min,
        alerts = config.alerts.enabled,
        "Watching"
    );

    if args.tui {
        run_dashboard(screener, interval).await
    } else {
        run_plain(screener, interval, &args).await
    }
}

async fn run_plain(mut screener: Screener, interval: Duration, args: &WatchArgs) -> Result<()> {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let report = screener.run_cycle().await;
                print!("{}", report.summary(args.active_only));
                if let Some(path) = &args.csv {
                    if let Err(e) = report.save_csv(path) {
                        warn!(path = %path.display(), error = %e, "CSV export failed");
                    }
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Shutting down");
                return Ok(());
            }
        }
    }
}

async fn run_dashboard(mut screener: Screener, interval: Duration) -> Result<()> {
    let initial = DashboardState {
        strategy_name: screener.strategy_name().to_string(),
        provider: screener.fetcher_name().to_string(),
        alerts_enabled: screener.dispatcher().is_some_and(|d| d.is_enabled()),
        ..Default::default()
    };
    let (tx, rx) = watch::channel(initial);

    let mut ui = tokio::task::spawn_blocking(move || {
        Dashboard::new(DASHBOARD_REFRESH_MS).run(|| rx.borrow().clone())
    });

    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let report = screener.run_cycle().await;
                tx.send_modify(|state| apply_report(state, &report));
            }
            res = &mut ui => {
                res.context("Dashboard task failed")?
                    .context("Dashboard terminal error")?;
                return Ok(());
            }
        }
    }
}

fn apply_report(state: &mut DashboardState, report: &ScreenerReport) {
    use screener_core::types::Classification;

    state.rows = report.evaluations();
    state.last_updated = Some(report.generated_at);
    state.cycles += 1;
    state.alerts_sent += report.alerts_sent();

    let message = if report.has_data() {
        format!(
            "{}  {} BUY, {} SELL, {} no data, {} alert(s) sent",
            report.last_updated(),
            report.count(Classification::Buy),
            report.count(Classification::Sell),
            report.count(Classification::NoData),
            report.alerts_sent()
        )
    } else {
        format!("{}  No data returned for any instrument", report.last_updated())
    };
    state.push_message(message);
}
