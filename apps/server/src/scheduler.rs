//! Background schedulers for the expiration and notification passes.
//!
//! Four independent interval loops, started at process boot:
//! - detect pass (hourly): ACTIVE + overdue -> EXPIRED
//! - archive pass (daily): stale EXPIRED -> ARCHIVED
//! - 24 h warning tier (daily)
//! - 3 h urgent warning tier (every 3 h)
//!
//! Each loop runs its pass to completion before its next tick, so one task
//! never overlaps itself; different tasks run concurrently. Errors are logged
//! and the loop keeps going; the next tick retries naturally.

use std::sync::Arc;

use chrono::Utc;
use tokio::time::{interval, Duration};
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::main_lib::AppState;

/// Initial delay before the first run of any pass, to let the server settle.
const INITIAL_DELAY_SECS: u64 = 30;

pub fn start_schedulers(state: Arc<AppState>, config: &Config) {
    start_expiration_check(state.clone(), config.expiration_check_interval_secs);
    start_archive_check(state.clone(), config.archive_check_interval_secs);
    for (interval_secs, horizon_hours) in config.warning_tiers() {
        start_warning_pass(state.clone(), interval_secs, horizon_hours);
    }
}

fn start_expiration_check(state: Arc<AppState>, interval_secs: u64) {
    tokio::spawn(async move {
        info!("Expiration check scheduler started ({}s interval)", interval_secs);
        tokio::time::sleep(Duration::from_secs(INITIAL_DELAY_SECS)).await;

        // First tick fires immediately, subsequent ticks are interval_secs apart.
        let mut tick = interval(Duration::from_secs(interval_secs));
        loop {
            tick.tick().await;
            let now = Utc::now().naive_utc();
            match state.expiration_service.check_and_expire(now).await {
                Ok(0) => debug!("Scheduled expiration check: nothing to do"),
                Ok(count) => info!("Scheduled expiration check: expired {} goals", count),
                Err(e) => warn!("Scheduled expiration check failed: {}", e),
            }
        }
    });
}

fn start_archive_check(state: Arc<AppState>, interval_secs: u64) {
    tokio::spawn(async move {
        info!("Archive check scheduler started ({}s interval)", interval_secs);
        tokio::time::sleep(Duration::from_secs(INITIAL_DELAY_SECS)).await;

        let mut tick = interval(Duration::from_secs(interval_secs));
        loop {
            tick.tick().await;
            let now = Utc::now().naive_utc();
            match state.expiration_service.check_and_archive(now).await {
                Ok(0) => debug!("Scheduled archive check: nothing to do"),
                Ok(count) => info!("Scheduled archive check: archived {} goals", count),
                Err(e) => warn!("Scheduled archive check failed: {}", e),
            }
        }
    });
}

fn start_warning_pass(state: Arc<AppState>, interval_secs: u64, horizon_hours: i64) {
    tokio::spawn(async move {
        info!(
            "Warning scheduler started ({} h tier, {}s interval)",
            horizon_hours, interval_secs
        );
        tokio::time::sleep(Duration::from_secs(INITIAL_DELAY_SECS)).await;

        let mut tick = interval(Duration::from_secs(interval_secs));
        loop {
            tick.tick().await;
            let now = Utc::now().naive_utc();
            match state
                .dispatcher
                .send_expiration_warnings(now, horizon_hours)
                .await
            {
                Ok(summary) if summary.goals_matched == 0 => {
                    debug!("{} h warning pass: no goals in window", horizon_hours)
                }
                Ok(summary) => info!(
                    "{} h warning pass: {} notifications sent for {} goals",
                    horizon_hours, summary.notifications_sent, summary.goals_matched
                ),
                Err(e) => warn!("{} h warning pass failed: {}", horizon_hours, e),
            }
        }
    });
}
