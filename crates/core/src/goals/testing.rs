//! In-memory goal repository used by unit tests across the crate.

use std::sync::RwLock;

use async_trait::async_trait;
use chrono::{NaiveDateTime, Utc};
use uuid::Uuid;

use crate::constants::DEFAULT_PRIORITY;
use crate::errors::Result;
use crate::goals::goals_model::{Goal, GoalStatus, GoalType, NewGoal};
use crate::goals::goals_traits::GoalRepositoryTrait;

/// Builds a bare goal for tests; timestamps are "now", no due date.
pub fn make_goal(id: &str, goal_type: GoalType, status: GoalStatus, parent: Option<&str>) -> Goal {
    let now = Utc::now().naive_utc();
    Goal {
        id: id.to_string(),
        title: format!("goal {id}"),
        description: None,
        goal_type,
        status,
        parent_id: parent.map(str::to_string),
        due_date: None,
        completed_at: match status {
            GoalStatus::Completed => Some(now),
            _ => None,
        },
        priority: DEFAULT_PRIORITY,
        reminder_enabled: false,
        reminder_frequency: None,
        created_at: now,
        updated_at: now,
    }
}

pub struct MockGoalRepository {
    goals: RwLock<Vec<Goal>>,
}

impl MockGoalRepository {
    pub fn new(goals: Vec<Goal>) -> Self {
        Self {
            goals: RwLock::new(goals),
        }
    }

    fn filtered(&self, pred: impl Fn(&Goal) -> bool) -> Result<Vec<Goal>> {
        Ok(self
            .goals
            .read()
            .unwrap()
            .iter()
            .filter(|g| pred(g))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl GoalRepositoryTrait for MockGoalRepository {
    fn load_goals(&self) -> Result<Vec<Goal>> {
        self.filtered(|_| true)
    }

    fn find_goal_by_id(&self, goal_id: &str) -> Result<Option<Goal>> {
        Ok(self
            .goals
            .read()
            .unwrap()
            .iter()
            .find(|g| g.id == goal_id)
            .cloned())
    }

    fn find_by_parent_id(&self, parent_id: &str) -> Result<Vec<Goal>> {
        self.filtered(|g| g.parent_id.as_deref() == Some(parent_id))
    }

    fn find_root_goals(&self) -> Result<Vec<Goal>> {
        self.filtered(|g| g.parent_id.is_none())
    }

    fn find_by_type(&self, goal_type: GoalType) -> Result<Vec<Goal>> {
        self.filtered(|g| g.goal_type == goal_type)
    }

    fn find_by_status(&self, status: GoalStatus) -> Result<Vec<Goal>> {
        self.filtered(|g| g.status == status)
    }

    fn find_active_overdue(&self, now: NaiveDateTime) -> Result<Vec<Goal>> {
        self.filtered(|g| g.is_expired(now))
    }

    fn find_expiring_soon(&self, now: NaiveDateTime, until: NaiveDateTime) -> Result<Vec<Goal>> {
        self.filtered(|g| {
            g.status == GoalStatus::Active
                && g.due_date.map(|d| now < d && d <= until).unwrap_or(false)
        })
    }

    fn find_stale_expired(&self, cutoff: NaiveDateTime) -> Result<Vec<Goal>> {
        self.filtered(|g| g.status == GoalStatus::Expired && g.updated_at <= cutoff)
    }

    fn find_stale_completed(&self, cutoff: NaiveDateTime) -> Result<Vec<Goal>> {
        self.filtered(|g| {
            g.status == GoalStatus::Completed
                && g.completed_at.map(|c| c <= cutoff).unwrap_or(false)
        })
    }

    async fn insert_new_goal(&self, new_goal: NewGoal) -> Result<Goal> {
        let now = Utc::now().naive_utc();
        let goal = Goal {
            id: new_goal.id.unwrap_or_else(|| Uuid::new_v4().to_string()),
            title: new_goal.title,
            description: new_goal.description,
            goal_type: new_goal.goal_type,
            status: GoalStatus::Active,
            parent_id: new_goal.parent_id,
            due_date: new_goal.due_date,
            completed_at: None,
            priority: new_goal.priority,
            reminder_enabled: new_goal.reminder_enabled,
            reminder_frequency: new_goal.reminder_frequency,
            created_at: now,
            updated_at: now,
        };
        self.goals.write().unwrap().push(goal.clone());
        Ok(goal)
    }

    async fn update_goal(&self, goal: Goal) -> Result<Goal> {
        let mut goals = self.goals.write().unwrap();
        if let Some(stored) = goals.iter_mut().find(|g| g.id == goal.id) {
            *stored = goal.clone();
        }
        Ok(goal)
    }

    async fn delete_goal(&self, goal_id: String) -> Result<usize> {
        let mut goals = self.goals.write().unwrap();
        let mut doomed = vec![goal_id];
        let mut index = 0;
        while index < doomed.len() {
            let parent = doomed[index].clone();
            doomed.extend(
                goals
                    .iter()
                    .filter(|g| g.parent_id.as_deref() == Some(parent.as_str()))
                    .map(|g| g.id.clone()),
            );
            index += 1;
        }
        let before = goals.len();
        goals.retain(|g| !doomed.contains(&g.id));
        Ok(before - goals.len())
    }

    async fn save_transitions(&self, goals: Vec<Goal>, guard: GoalStatus) -> Result<usize> {
        let mut stored = self.goals.write().unwrap();
        let mut updated = 0;
        for goal in goals {
            if let Some(row) = stored
                .iter_mut()
                .find(|g| g.id == goal.id && g.status == guard)
            {
                *row = goal;
                updated += 1;
            }
        }
        Ok(updated)
    }
}
