//! Goals domain models and the per-goal lifecycle state machine.

use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_PRIORITY;
use crate::errors::{Error, Result};

/// Goal granularity, ordered from broadest to narrowest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GoalType {
    Lifetime,
    LifetimeSub,
    Yearly,
    Monthly,
    Weekly,
    Daily,
}

impl GoalType {
    /// Returns the database string representation (SCREAMING_SNAKE_CASE).
    pub const fn as_db_str(&self) -> &'static str {
        match self {
            GoalType::Lifetime => "LIFETIME",
            GoalType::LifetimeSub => "LIFETIME_SUB",
            GoalType::Yearly => "YEARLY",
            GoalType::Monthly => "MONTHLY",
            GoalType::Weekly => "WEEKLY",
            GoalType::Daily => "DAILY",
        }
    }

    /// Parses a goal type from its database string.
    pub fn from_db_str(s: &str) -> Option<Self> {
        match s {
            "LIFETIME" => Some(GoalType::Lifetime),
            "LIFETIME_SUB" => Some(GoalType::LifetimeSub),
            "YEARLY" => Some(GoalType::Yearly),
            "MONTHLY" => Some(GoalType::Monthly),
            "WEEKLY" => Some(GoalType::Weekly),
            "DAILY" => Some(GoalType::Daily),
            _ => None,
        }
    }

    /// The types a goal of this type may parent, narrowest last.
    ///
    /// DAILY goals can never have children.
    pub const fn valid_child_types(&self) -> &'static [GoalType] {
        match self {
            GoalType::Lifetime => &[GoalType::LifetimeSub],
            GoalType::LifetimeSub => &[
                GoalType::Yearly,
                GoalType::Monthly,
                GoalType::Weekly,
                GoalType::Daily,
            ],
            GoalType::Yearly => &[GoalType::Monthly, GoalType::Weekly, GoalType::Daily],
            GoalType::Monthly => &[GoalType::Weekly, GoalType::Daily],
            GoalType::Weekly => &[GoalType::Daily],
            GoalType::Daily => &[],
        }
    }

    /// Whether `child` may be attached under a goal of this type.
    pub fn is_valid_child(&self, child: GoalType) -> bool {
        self.valid_child_types().contains(&child)
    }
}

/// Goal lifecycle status.
///
/// "Is completed" is derived as `status == Completed` everywhere; there is no
/// separate completion flag to drift out of sync.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GoalStatus {
    Active,
    Completed,
    Expired,
    Archived,
}

impl GoalStatus {
    /// Returns the database string representation (SCREAMING_SNAKE_CASE).
    pub const fn as_db_str(&self) -> &'static str {
        match self {
            GoalStatus::Active => "ACTIVE",
            GoalStatus::Completed => "COMPLETED",
            GoalStatus::Expired => "EXPIRED",
            GoalStatus::Archived => "ARCHIVED",
        }
    }

    /// Parses a goal status from its database string.
    pub fn from_db_str(s: &str) -> Option<Self> {
        match s {
            "ACTIVE" => Some(GoalStatus::Active),
            "COMPLETED" => Some(GoalStatus::Completed),
            "EXPIRED" => Some(GoalStatus::Expired),
            "ARCHIVED" => Some(GoalStatus::Archived),
            _ => None,
        }
    }
}

/// Domain model representing a goal.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Goal {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub goal_type: GoalType,
    pub status: GoalStatus,
    pub parent_id: Option<String>,
    pub due_date: Option<NaiveDateTime>,
    pub completed_at: Option<NaiveDateTime>,
    pub priority: i32,
    pub reminder_enabled: bool,
    pub reminder_frequency: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Input model for creating a new goal.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct NewGoal {
    pub id: Option<String>,
    pub title: String,
    pub description: Option<String>,
    pub goal_type: GoalType,
    pub parent_id: Option<String>,
    pub due_date: Option<NaiveDateTime>,
    #[serde(default = "default_priority")]
    pub priority: i32,
    #[serde(default)]
    pub reminder_enabled: bool,
    pub reminder_frequency: Option<String>,
}

fn default_priority() -> i32 {
    DEFAULT_PRIORITY
}

/// Partial update for a goal; absent fields are left untouched.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct GoalUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<i32>,
    pub due_date: Option<NaiveDateTime>,
    pub reminder_enabled: Option<bool>,
    pub reminder_frequency: Option<String>,
}

impl Goal {
    /// Derived completion flag; `completed_at` is non-null iff this is true.
    pub fn is_completed(&self) -> bool {
        self.status == GoalStatus::Completed
    }

    /// A goal that stands alone: no parent, and of a type that is allowed to.
    ///
    /// LIFETIME and LIFETIME_SUB anchor hierarchies and are never counted as
    /// independent, even when created without a parent.
    pub fn is_independent(&self) -> bool {
        self.parent_id.is_none()
            && matches!(
                self.goal_type,
                GoalType::Yearly | GoalType::Monthly | GoalType::Weekly | GoalType::Daily
            )
    }

    /// Marks the goal completed. Calling again refreshes `completed_at`.
    pub fn complete(&mut self, now: NaiveDateTime) {
        self.status = GoalStatus::Completed;
        self.completed_at = Some(now);
        self.updated_at = now;
    }

    /// Reverts the goal to ACTIVE and clears `completed_at`. Legal from any status.
    pub fn uncomplete(&mut self, now: NaiveDateTime) {
        self.status = GoalStatus::Active;
        self.completed_at = None;
        self.updated_at = now;
    }

    /// Marks the goal expired. Silent no-op on a completed goal; the scheduler
    /// filters those out before ever calling this.
    pub fn expire(&mut self, now: NaiveDateTime) {
        if self.is_completed() {
            return;
        }
        self.status = GoalStatus::Expired;
        self.updated_at = now;
    }

    /// Archives the goal unconditionally. ARCHIVED is terminal.
    pub fn archive(&mut self, now: NaiveDateTime) {
        self.status = GoalStatus::Archived;
        self.updated_at = now;
    }

    /// Pushes the due date forward by `days` and reactivates the goal, even
    /// from EXPIRED. Fails without mutating when there is no due date.
    pub fn extend_due_date(&mut self, days: i64, now: NaiveDateTime) -> Result<()> {
        let due = self
            .due_date
            .ok_or_else(|| Error::MissingDueDate(self.id.clone()))?;
        self.due_date = Some(due + Duration::days(days));
        self.status = GoalStatus::Active;
        self.updated_at = now;
        Ok(())
    }

    /// Detects a newly-overdue goal: due date in the past and still ACTIVE.
    ///
    /// A goal already marked EXPIRED does not match; this predicate feeds the
    /// detect pass, it does not describe the EXPIRED state.
    pub fn is_expired(&self, now: NaiveDateTime) -> bool {
        match self.due_date {
            Some(due) => due < now && self.status == GoalStatus::Active,
            None => false,
        }
    }

    /// True when the goal is ACTIVE and due within the next `horizon_hours`.
    pub fn is_expiring_soon(&self, now: NaiveDateTime, horizon_hours: i64) -> bool {
        match self.due_date {
            Some(due) => {
                self.status == GoalStatus::Active
                    && now < due
                    && due <= now + Duration::hours(horizon_hours)
            }
            None => false,
        }
    }

    /// Progress derived from direct children: the fraction of them completed.
    /// A leaf reports 100% when completed, 0% otherwise.
    pub fn progress_percentage(&self, children: &[Goal]) -> f64 {
        if children.is_empty() {
            return if self.is_completed() { 100.0 } else { 0.0 };
        }
        let completed = children.iter().filter(|c| c.is_completed()).count();
        completed as f64 / children.len() as f64 * 100.0
    }
}
