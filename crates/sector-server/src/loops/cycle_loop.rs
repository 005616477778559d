//! Refresh loop.
//!
//! Runs one occupancy cycle per refresh interval. Only this task runs cycles,
//! so passes never overlap. A manual refresh or group upload wakes it early.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use chrono::{DateTime, Utc};
use tokio::sync::broadcast;
use tokio::time::{sleep_until, Instant};

use sector_core::{CycleContext, CycleReport, GroupConfig};
use sector_feed::FeedClient;

use crate::backoff::Backoff;
use crate::config::Config;
use crate::state::AppState;

pub async fn run_cycle_loop(
    state: Arc<AppState>,
    feed: FeedClient,
    config: Config,
    shutdown: broadcast::Receiver<()>,
) {
    let refresh = config.refresh_interval();
    let backoff_max = Duration::from_secs(config.fetch_backoff_max_secs);

    tracing::info!(
        "Refresh loop started: traffic={} sectors={} every {:?}",
        feed.traffic_source(),
        feed.sector_source(),
        refresh
    );

    let (feed, config) = (&feed, &config);
    drive_cycles(state, refresh, backoff_max, shutdown, |groups| async move {
        run_cycle(feed, config, groups.as_deref(), Utc::now()).await
    })
    .await;
}

/// Schedule cycles: one per `refresh` while they succeed, on the backoff
/// delay while they fail, and immediately on a manual refresh.
pub async fn drive_cycles<F, Fut>(
    state: Arc<AppState>,
    refresh: Duration,
    backoff_max: Duration,
    mut shutdown: broadcast::Receiver<()>,
    mut cycle: F,
) where
    F: FnMut(Option<Arc<GroupConfig>>) -> Fut,
    Fut: Future<Output = Result<CycleReport>>,
{
    let mut backoff = Backoff::new(refresh, backoff_max.max(refresh));
    let mut next_run = Instant::now();

    loop {
        let manual = tokio::select! {
            _ = shutdown.recv() => {
                tracing::info!("Refresh loop shutting down");
                break;
            }
            _ = sleep_until(next_run) => false,
            _ = state.refresh_requested() => true,
        };

        // One snapshot per cycle; uploads made during the pass apply next time.
        let groups = state.session().groups();

        match cycle(groups).await {
            Ok(report) => {
                backoff.reset();
                next_run = Instant::now() + refresh;
                tracing::info!(
                    "Cycle complete: {} flights, {} specialties{}",
                    report.flights.len(),
                    report.specialty_summary.len(),
                    if manual { " (manual)" } else { "" }
                );
                state.publish_report(report, wall_clock(next_run));
            }
            Err(err) => {
                let delay = backoff.fail();
                next_run = backoff.next_attempt_at();
                tracing::warn!(
                    "Cycle failed: {:#} (attempt {}, retrying in {:?})",
                    err,
                    backoff.failures(),
                    delay
                );
                state.record_failure(format!("{:#}", err), wall_clock(next_run));
            }
        }
    }
}

/// Fetch both feeds and run the engine over them.
pub async fn run_cycle(
    feed: &FeedClient,
    config: &Config,
    groups: Option<&GroupConfig>,
    generated_at: DateTime<Utc>,
) -> Result<CycleReport> {
    let rules = config.classifier_rules();
    let (sectors, traffic) = tokio::try_join!(
        feed.fetch_sectors(&rules.perimeter_designator),
        feed.fetch_traffic()
    )?;

    let thresholds = config.band_thresholds();
    let report = CycleContext::new(&sectors, &rules, &thresholds)
        .with_groups(groups)
        .with_controller_prefix(&config.controller_prefix)
        .run(&traffic, generated_at);

    Ok(report)
}

/// Wall-clock time of a scheduled run, for the status endpoint.
fn wall_clock(at: Instant) -> Option<DateTime<Utc>> {
    chrono::Duration::from_std(at.saturating_duration_since(Instant::now()))
        .ok()
        .map(|delta| Utc::now() + delta)
}
