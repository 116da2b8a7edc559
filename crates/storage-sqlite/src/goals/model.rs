//! Database models for goals.

use chrono::NaiveDateTime;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use goaltrack_core::errors::{Error, ValidationError};
use goaltrack_core::goals::{Goal, GoalStatus, GoalType, NewGoal};

/// Database model for goals. Enum fields are stored as their
/// SCREAMING_SNAKE_CASE strings.
#[derive(
    Queryable,
    Identifiable,
    AsChangeset,
    Selectable,
    PartialEq,
    Serialize,
    Deserialize,
    Debug,
    Clone,
)]
#[diesel(table_name = crate::schema::goals)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
// Updates write the full row; a None here means NULL, not "leave unchanged".
// Uncompleting a goal must clear completed_at.
#[diesel(treat_none_as_null = true)]
#[serde(rename_all = "camelCase")]
pub struct GoalDB {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub goal_type: String,
    pub status: String,
    pub parent_id: Option<String>,
    pub due_date: Option<NaiveDateTime>,
    pub completed_at: Option<NaiveDateTime>,
    pub priority: i32,
    pub reminder_enabled: bool,
    pub reminder_frequency: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Database model for creating a new goal.
#[derive(Insertable, Serialize, Deserialize, Debug, Clone)]
#[diesel(table_name = crate::schema::goals)]
#[serde(rename_all = "camelCase")]
pub struct NewGoalDB {
    pub id: Option<String>,
    pub title: String,
    pub description: Option<String>,
    pub goal_type: String,
    pub status: String,
    pub parent_id: Option<String>,
    pub due_date: Option<NaiveDateTime>,
    pub priority: i32,
    pub reminder_enabled: bool,
    pub reminder_frequency: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

// Conversion to and from domain models

impl TryFrom<GoalDB> for Goal {
    type Error = Error;

    fn try_from(db: GoalDB) -> Result<Self, Error> {
        let goal_type = GoalType::from_db_str(&db.goal_type).ok_or_else(|| {
            Error::Validation(ValidationError::InvalidInput(format!(
                "unknown goal type '{}' on goal {}",
                db.goal_type, db.id
            )))
        })?;
        let status = GoalStatus::from_db_str(&db.status).ok_or_else(|| {
            Error::Validation(ValidationError::InvalidInput(format!(
                "unknown goal status '{}' on goal {}",
                db.status, db.id
            )))
        })?;
        Ok(Self {
            id: db.id,
            title: db.title,
            description: db.description,
            goal_type,
            status,
            parent_id: db.parent_id,
            due_date: db.due_date,
            completed_at: db.completed_at,
            priority: db.priority,
            reminder_enabled: db.reminder_enabled,
            reminder_frequency: db.reminder_frequency,
            created_at: db.created_at,
            updated_at: db.updated_at,
        })
    }
}

impl From<Goal> for GoalDB {
    fn from(domain: Goal) -> Self {
        Self {
            id: domain.id,
            title: domain.title,
            description: domain.description,
            goal_type: domain.goal_type.as_db_str().to_string(),
            status: domain.status.as_db_str().to_string(),
            parent_id: domain.parent_id,
            due_date: domain.due_date,
            completed_at: domain.completed_at,
            priority: domain.priority,
            reminder_enabled: domain.reminder_enabled,
            reminder_frequency: domain.reminder_frequency,
            created_at: domain.created_at,
            updated_at: domain.updated_at,
        }
    }
}

impl From<NewGoal> for NewGoalDB {
    fn from(domain: NewGoal) -> Self {
        let now = chrono::Utc::now().naive_utc();
        Self {
            id: domain.id,
            title: domain.title,
            description: domain.description,
            goal_type: domain.goal_type.as_db_str().to_string(),
            status: GoalStatus::Active.as_db_str().to_string(),
            parent_id: domain.parent_id,
            due_date: domain.due_date,
            priority: domain.priority,
            reminder_enabled: domain.reminder_enabled,
            reminder_frequency: domain.reminder_frequency,
            created_at: now,
            updated_at: now,
        }
    }
}
