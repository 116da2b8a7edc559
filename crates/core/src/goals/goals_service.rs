use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, NaiveDateTime, Utc};
use log::info;

use crate::errors::{Error, Result, ValidationError};
use crate::goals::goals_model::{Goal, GoalStatus, GoalType, GoalUpdate, NewGoal};
use crate::goals::goals_traits::{GoalRepositoryTrait, GoalServiceTrait};

pub struct GoalService {
    goal_repo: Arc<dyn GoalRepositoryTrait>,
}

impl GoalService {
    pub fn new(goal_repo: Arc<dyn GoalRepositoryTrait>) -> Self {
        GoalService { goal_repo }
    }

    fn now() -> NaiveDateTime {
        Utc::now().naive_utc()
    }

    fn load_goal(&self, goal_id: &str) -> Result<Goal> {
        self.goal_repo
            .find_goal_by_id(goal_id)?
            .ok_or_else(|| Error::GoalNotFound(goal_id.to_string()))
    }

    /// Hierarchy check, run before any mutation when a parent is supplied.
    fn validate_parent(&self, parent_id: &str, child_type: GoalType) -> Result<()> {
        let parent = self.load_goal(parent_id)?;
        if !parent.goal_type.is_valid_child(child_type) {
            return Err(Error::InvalidHierarchy {
                parent: parent.goal_type,
                child: child_type,
            });
        }
        Ok(())
    }
}

#[async_trait]
impl GoalServiceTrait for GoalService {
    fn get_goals(&self) -> Result<Vec<Goal>> {
        self.goal_repo.load_goals()
    }

    fn get_goal(&self, goal_id: &str) -> Result<Goal> {
        self.load_goal(goal_id)
    }

    fn get_goals_by_type(&self, goal_type: GoalType) -> Result<Vec<Goal>> {
        self.goal_repo.find_by_type(goal_type)
    }

    fn get_goals_by_status(&self, status: GoalStatus) -> Result<Vec<Goal>> {
        self.goal_repo.find_by_status(status)
    }

    fn get_root_goals(&self) -> Result<Vec<Goal>> {
        self.goal_repo.find_root_goals()
    }

    fn get_child_goals(&self, parent_id: &str) -> Result<Vec<Goal>> {
        self.goal_repo.find_by_parent_id(parent_id)
    }

    fn get_expired_goals(&self) -> Result<Vec<Goal>> {
        self.goal_repo.find_by_status(GoalStatus::Expired)
    }

    fn get_archived_goals(&self) -> Result<Vec<Goal>> {
        self.goal_repo.find_by_status(GoalStatus::Archived)
    }

    fn get_expiring_soon_goals(&self, hours: i64) -> Result<Vec<Goal>> {
        let now = Self::now();
        self.goal_repo
            .find_expiring_soon(now, now + Duration::hours(hours))
    }

    fn get_progress(&self, goal_id: &str) -> Result<f64> {
        let goal = self.load_goal(goal_id)?;
        let children = self.goal_repo.find_by_parent_id(goal_id)?;
        Ok(goal.progress_percentage(&children))
    }

    fn available_sub_types(&self, goal_type: GoalType) -> Vec<GoalType> {
        goal_type.valid_child_types().to_vec()
    }

    async fn create_goal(&self, new_goal: NewGoal) -> Result<Goal> {
        if new_goal.title.trim().is_empty() {
            return Err(Error::Validation(ValidationError::MissingField(
                "title".to_string(),
            )));
        }
        if let Some(ref parent_id) = new_goal.parent_id {
            self.validate_parent(parent_id, new_goal.goal_type)?;
        }
        let goal = self.goal_repo.insert_new_goal(new_goal).await?;
        info!("Goal created: {}", goal.title);
        Ok(goal)
    }

    async fn update_goal(&self, goal_id: &str, update: GoalUpdate) -> Result<Goal> {
        let mut goal = self.load_goal(goal_id)?;
        if let Some(title) = update.title {
            goal.title = title;
        }
        if let Some(description) = update.description {
            goal.description = Some(description);
        }
        if let Some(priority) = update.priority {
            goal.priority = priority;
        }
        if let Some(due_date) = update.due_date {
            goal.due_date = Some(due_date);
        }
        if let Some(reminder_enabled) = update.reminder_enabled {
            goal.reminder_enabled = reminder_enabled;
        }
        if let Some(reminder_frequency) = update.reminder_frequency {
            goal.reminder_frequency = Some(reminder_frequency);
        }
        goal.updated_at = Self::now();
        let saved = self.goal_repo.update_goal(goal).await?;
        info!("Goal updated: {}", saved.title);
        Ok(saved)
    }

    async fn delete_goal(&self, goal_id: &str) -> Result<usize> {
        let goal = self.load_goal(goal_id)?;
        let deleted = self.goal_repo.delete_goal(goal.id).await?;
        info!("Goal deleted: {} ({} rows)", goal.title, deleted);
        Ok(deleted)
    }

    async fn complete_goal(&self, goal_id: &str) -> Result<Goal> {
        let mut goal = self.load_goal(goal_id)?;
        goal.complete(Self::now());
        let saved = self.goal_repo.update_goal(goal).await?;
        info!("Goal completed: {}", saved.title);
        Ok(saved)
    }

    async fn uncomplete_goal(&self, goal_id: &str) -> Result<Goal> {
        let mut goal = self.load_goal(goal_id)?;
        goal.uncomplete(Self::now());
        let saved = self.goal_repo.update_goal(goal).await?;
        info!("Goal uncompleted: {}", saved.title);
        Ok(saved)
    }

    async fn expire_goal(&self, goal_id: &str) -> Result<Goal> {
        let mut goal = self.load_goal(goal_id)?;
        goal.expire(Self::now());
        let saved = self.goal_repo.update_goal(goal).await?;
        info!("Goal expired: {}", saved.title);
        Ok(saved)
    }

    async fn archive_goal(&self, goal_id: &str) -> Result<Goal> {
        let mut goal = self.load_goal(goal_id)?;
        goal.archive(Self::now());
        let saved = self.goal_repo.update_goal(goal).await?;
        info!("Goal archived: {}", saved.title);
        Ok(saved)
    }

    async fn extend_goal_due_date(&self, goal_id: &str, days: i64) -> Result<Goal> {
        let mut goal = self.load_goal(goal_id)?;
        goal.extend_due_date(days, Self::now())?;
        let saved = self.goal_repo.update_goal(goal).await?;
        info!("Goal due date extended by {} days: {}", days, saved.title);
        Ok(saved)
    }
}
