use crate::errors::Result;
use crate::goals::goals_model::{Goal, GoalStatus, GoalType, GoalUpdate, NewGoal};
use async_trait::async_trait;
use chrono::NaiveDateTime;

/// Trait for goal repository operations.
///
/// Reads are synchronous; writes go through the storage writer and are async.
/// `save_transitions` is the conditional-write entry point used by the
/// scheduler passes: each row is only updated while its stored status still
/// matches `guard`, so a user action racing a pass wins.
#[async_trait]
pub trait GoalRepositoryTrait: Send + Sync {
    fn load_goals(&self) -> Result<Vec<Goal>>;
    fn find_goal_by_id(&self, goal_id: &str) -> Result<Option<Goal>>;
    fn find_by_parent_id(&self, parent_id: &str) -> Result<Vec<Goal>>;
    fn find_root_goals(&self) -> Result<Vec<Goal>>;
    fn find_by_type(&self, goal_type: GoalType) -> Result<Vec<Goal>>;
    fn find_by_status(&self, status: GoalStatus) -> Result<Vec<Goal>>;
    /// ACTIVE goals whose due date is strictly before `now`.
    fn find_active_overdue(&self, now: NaiveDateTime) -> Result<Vec<Goal>>;
    /// ACTIVE goals with `now < due_date <= until`.
    fn find_expiring_soon(&self, now: NaiveDateTime, until: NaiveDateTime) -> Result<Vec<Goal>>;
    /// EXPIRED goals whose `updated_at` is at or before `cutoff`.
    fn find_stale_expired(&self, cutoff: NaiveDateTime) -> Result<Vec<Goal>>;
    /// COMPLETED goals whose `completed_at` is at or before `cutoff`.
    fn find_stale_completed(&self, cutoff: NaiveDateTime) -> Result<Vec<Goal>>;
    async fn insert_new_goal(&self, new_goal: NewGoal) -> Result<Goal>;
    async fn update_goal(&self, goal: Goal) -> Result<Goal>;
    /// Deletes the goal and all of its descendants. Returns rows deleted.
    async fn delete_goal(&self, goal_id: String) -> Result<usize>;
    /// Persists already-transitioned goals, guarded on each row still holding
    /// `guard` as its status. Returns the number of rows actually updated.
    async fn save_transitions(&self, goals: Vec<Goal>, guard: GoalStatus) -> Result<usize>;
}

/// Trait for goal service operations.
#[async_trait]
pub trait GoalServiceTrait: Send + Sync {
    fn get_goals(&self) -> Result<Vec<Goal>>;
    fn get_goal(&self, goal_id: &str) -> Result<Goal>;
    fn get_goals_by_type(&self, goal_type: GoalType) -> Result<Vec<Goal>>;
    fn get_goals_by_status(&self, status: GoalStatus) -> Result<Vec<Goal>>;
    fn get_root_goals(&self) -> Result<Vec<Goal>>;
    fn get_child_goals(&self, parent_id: &str) -> Result<Vec<Goal>>;
    fn get_expired_goals(&self) -> Result<Vec<Goal>>;
    fn get_archived_goals(&self) -> Result<Vec<Goal>>;
    fn get_expiring_soon_goals(&self, hours: i64) -> Result<Vec<Goal>>;
    fn get_progress(&self, goal_id: &str) -> Result<f64>;
    fn available_sub_types(&self, goal_type: GoalType) -> Vec<GoalType>;
    async fn create_goal(&self, new_goal: NewGoal) -> Result<Goal>;
    async fn update_goal(&self, goal_id: &str, update: GoalUpdate) -> Result<Goal>;
    async fn delete_goal(&self, goal_id: &str) -> Result<usize>;
    async fn complete_goal(&self, goal_id: &str) -> Result<Goal>;
    async fn uncomplete_goal(&self, goal_id: &str) -> Result<Goal>;
    async fn expire_goal(&self, goal_id: &str) -> Result<Goal>;
    async fn archive_goal(&self, goal_id: &str) -> Result<Goal>;
    async fn extend_goal_due_date(&self, goal_id: &str, days: i64) -> Result<Goal>;
}
