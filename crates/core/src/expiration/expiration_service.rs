use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, NaiveDateTime};
use log::info;

use crate::constants::ARCHIVE_RETENTION_HOURS;
use crate::errors::Result;
use crate::expiration::expiration_traits::ExpirationServiceTrait;
use crate::goals::{Goal, GoalRepositoryTrait, GoalStatus};

/// Applies the time-driven goal transitions: the hourly detect pass
/// (ACTIVE and overdue → EXPIRED) and the daily archive pass
/// (EXPIRED for longer than the retention window → ARCHIVED).
///
/// Both passes persist through a status-guarded batch write, so a user
/// completing a goal between the scan and the write always wins. Both also
/// serve as the manual administrative triggers.
pub struct ExpirationService {
    goal_repo: Arc<dyn GoalRepositoryTrait>,
}

impl ExpirationService {
    pub fn new(goal_repo: Arc<dyn GoalRepositoryTrait>) -> Self {
        ExpirationService { goal_repo }
    }
}

#[async_trait]
impl ExpirationServiceTrait for ExpirationService {
    async fn check_and_expire(&self, now: NaiveDateTime) -> Result<usize> {
        let mut overdue = self.goal_repo.find_active_overdue(now)?;
        if overdue.is_empty() {
            info!("Expiration check: no overdue goals");
            return Ok(0);
        }

        for goal in &mut overdue {
            info!(
                "Goal expired: '{}' (id: {}, due: {})",
                goal.title,
                goal.id,
                goal.due_date.map(|d| d.to_string()).unwrap_or_default()
            );
            goal.expire(now);
        }

        // Rows that left ACTIVE since the scan (user completions) are skipped
        // by the guard and not counted.
        let updated = self
            .goal_repo
            .save_transitions(overdue, GoalStatus::Active)
            .await?;
        info!("Expiration check: expired {} goals", updated);
        Ok(updated)
    }

    async fn check_and_archive(&self, now: NaiveDateTime) -> Result<usize> {
        let cutoff = now - Duration::hours(ARCHIVE_RETENTION_HOURS);
        let mut stale = self.goal_repo.find_stale_expired(cutoff)?;
        if stale.is_empty() {
            info!("Archive check: no stale expired goals");
            return Ok(0);
        }

        for goal in &mut stale {
            info!(
                "Goal archived: '{}' (id: {}, expired at: {})",
                goal.title, goal.id, goal.updated_at
            );
            goal.archive(now);
        }

        let updated = self
            .goal_repo
            .save_transitions(stale, GoalStatus::Expired)
            .await?;
        info!("Archive check: archived {} goals", updated);
        Ok(updated)
    }

    fn expiring_soon(&self, now: NaiveDateTime, horizon_hours: i64) -> Result<Vec<Goal>> {
        let goals = self
            .goal_repo
            .find_expiring_soon(now, now + Duration::hours(horizon_hours))?;
        log::debug!(
            "Found {} goals expiring within {} hours",
            goals.len(),
            horizon_hours
        );
        Ok(goals)
    }
}
