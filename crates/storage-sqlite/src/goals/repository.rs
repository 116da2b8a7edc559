use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDateTime;
use diesel::prelude::*;
use diesel::SqliteConnection;
use uuid::Uuid;

use goaltrack_core::errors::Result;
use goaltrack_core::goals::{Goal, GoalRepositoryTrait, GoalStatus, GoalType, NewGoal};

use super::model::{GoalDB, NewGoalDB};
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::StorageError;
use crate::schema::goals;

pub struct GoalRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

fn to_domain(rows: Vec<GoalDB>) -> Result<Vec<Goal>> {
    rows.into_iter().map(Goal::try_from).collect()
}

impl GoalRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        GoalRepository { pool, writer }
    }
}

#[async_trait]
impl GoalRepositoryTrait for GoalRepository {
    fn load_goals(&self) -> Result<Vec<Goal>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = goals::table
            .load::<GoalDB>(&mut conn)
            .map_err(StorageError::from)?;
        to_domain(rows)
    }

    fn find_goal_by_id(&self, goal_id: &str) -> Result<Option<Goal>> {
        let mut conn = get_connection(&self.pool)?;
        let row = goals::table
            .find(goal_id)
            .first::<GoalDB>(&mut conn)
            .optional()
            .map_err(StorageError::from)?;
        row.map(Goal::try_from).transpose()
    }

    fn find_by_parent_id(&self, parent_id: &str) -> Result<Vec<Goal>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = goals::table
            .filter(goals::parent_id.eq(parent_id))
            .load::<GoalDB>(&mut conn)
            .map_err(StorageError::from)?;
        to_domain(rows)
    }

    fn find_root_goals(&self) -> Result<Vec<Goal>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = goals::table
            .filter(goals::parent_id.is_null())
            .load::<GoalDB>(&mut conn)
            .map_err(StorageError::from)?;
        to_domain(rows)
    }

    fn find_by_type(&self, goal_type: GoalType) -> Result<Vec<Goal>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = goals::table
            .filter(goals::goal_type.eq(goal_type.as_db_str()))
            .load::<GoalDB>(&mut conn)
            .map_err(StorageError::from)?;
        to_domain(rows)
    }

    fn find_by_status(&self, status: GoalStatus) -> Result<Vec<Goal>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = goals::table
            .filter(goals::status.eq(status.as_db_str()))
            .load::<GoalDB>(&mut conn)
            .map_err(StorageError::from)?;
        to_domain(rows)
    }

    fn find_active_overdue(&self, now: NaiveDateTime) -> Result<Vec<Goal>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = goals::table
            .filter(goals::status.eq(GoalStatus::Active.as_db_str()))
            .filter(goals::due_date.is_not_null())
            .filter(goals::due_date.lt(now))
            .load::<GoalDB>(&mut conn)
            .map_err(StorageError::from)?;
        to_domain(rows)
    }

    fn find_expiring_soon(&self, now: NaiveDateTime, until: NaiveDateTime) -> Result<Vec<Goal>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = goals::table
            .filter(goals::status.eq(GoalStatus::Active.as_db_str()))
            .filter(goals::due_date.is_not_null())
            .filter(goals::due_date.gt(now))
            .filter(goals::due_date.le(until))
            .load::<GoalDB>(&mut conn)
            .map_err(StorageError::from)?;
        to_domain(rows)
    }

    fn find_stale_expired(&self, cutoff: NaiveDateTime) -> Result<Vec<Goal>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = goals::table
            .filter(goals::status.eq(GoalStatus::Expired.as_db_str()))
            .filter(goals::updated_at.le(cutoff))
            .load::<GoalDB>(&mut conn)
            .map_err(StorageError::from)?;
        to_domain(rows)
    }

    fn find_stale_completed(&self, cutoff: NaiveDateTime) -> Result<Vec<Goal>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = goals::table
            .filter(goals::status.eq(GoalStatus::Completed.as_db_str()))
            .filter(goals::completed_at.is_not_null())
            .filter(goals::completed_at.le(cutoff))
            .load::<GoalDB>(&mut conn)
            .map_err(StorageError::from)?;
        to_domain(rows)
    }

    async fn insert_new_goal(&self, new_goal: NewGoal) -> Result<Goal> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<Goal> {
                let mut new_goal_db: NewGoalDB = new_goal.into();
                if new_goal_db.id.is_none() {
                    new_goal_db.id = Some(Uuid::new_v4().to_string());
                }

                let result_db = diesel::insert_into(goals::table)
                    .values(&new_goal_db)
                    .returning(GoalDB::as_returning())
                    .get_result(conn)
                    .map_err(StorageError::from)?;
                Goal::try_from(result_db)
            })
            .await
    }

    async fn update_goal(&self, goal: Goal) -> Result<Goal> {
        let goal_db: GoalDB = goal.into();
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<Goal> {
                diesel::update(goals::table.find(goal_db.id.clone()))
                    .set(&goal_db)
                    .execute(conn)
                    .map_err(StorageError::from)?;
                let result_db = goals::table
                    .find(goal_db.id.clone())
                    .first::<GoalDB>(conn)
                    .map_err(StorageError::from)?;
                Goal::try_from(result_db)
            })
            .await
    }

    async fn delete_goal(&self, goal_id: String) -> Result<usize> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<usize> {
                // Collect the whole subtree, breadth-first.
                let mut doomed = vec![goal_id];
                let mut index = 0;
                while index < doomed.len() {
                    let children: Vec<String> = goals::table
                        .filter(goals::parent_id.eq(&doomed[index]))
                        .select(goals::id)
                        .load(conn)
                        .map_err(StorageError::from)?;
                    doomed.extend(children);
                    index += 1;
                }

                // Leaves first, so the parent_id reference holds throughout.
                let mut deleted = 0;
                for id in doomed.iter().rev() {
                    deleted += diesel::delete(goals::table.find(id))
                        .execute(conn)
                        .map_err(StorageError::from)?;
                }
                Ok(deleted)
            })
            .await
    }

    async fn save_transitions(&self, transitioned: Vec<Goal>, guard: GoalStatus) -> Result<usize> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<usize> {
                let mut updated = 0;
                for goal in transitioned {
                    let goal_db: GoalDB = goal.into();
                    // The guard: only rows still holding the expected status
                    // take the transition. Anything a user touched since the
                    // scan is skipped.
                    updated += diesel::update(
                        goals::table
                            .filter(goals::id.eq(&goal_db.id))
                            .filter(goals::status.eq(guard.as_db_str())),
                    )
                    .set((
                        goals::status.eq(&goal_db.status),
                        goals::completed_at.eq(goal_db.completed_at),
                        goals::updated_at.eq(goal_db.updated_at),
                    ))
                    .execute(conn)
                    .map_err(StorageError::from)?;
                }
                Ok(updated)
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use chrono::{Duration, Utc};

    async fn setup() -> (tempfile::TempDir, GoalRepository) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("goaltrack-test.db");
        let pool = db::create_pool(path.to_str().unwrap()).unwrap();
        db::run_migrations(&pool).unwrap();
        let writer = db::spawn_writer((*pool).clone());
        (dir, GoalRepository::new(pool, writer))
    }

    fn new_goal(title: &str, parent_id: Option<&str>) -> NewGoal {
        NewGoal {
            id: None,
            title: title.to_string(),
            description: None,
            goal_type: GoalType::Daily,
            parent_id: parent_id.map(str::to_string),
            due_date: None,
            priority: 1,
            reminder_enabled: false,
            reminder_frequency: None,
        }
    }

    #[tokio::test]
    async fn test_insert_and_load_round_trip() {
        let (_dir, repo) = setup().await;

        let inserted = repo.insert_new_goal(new_goal("Run 5k", None)).await.unwrap();
        assert_eq!(inserted.status, GoalStatus::Active);

        let found = repo.find_goal_by_id(&inserted.id).unwrap().unwrap();
        assert_eq!(found, inserted);
        assert!(repo.find_goal_by_id("missing").unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_cascades_to_all_descendants() {
        let (_dir, repo) = setup().await;

        let root = repo.insert_new_goal(new_goal("root", None)).await.unwrap();
        let child = repo
            .insert_new_goal(new_goal("child", Some(&root.id)))
            .await
            .unwrap();
        let _grandchild = repo
            .insert_new_goal(new_goal("grandchild", Some(&child.id)))
            .await
            .unwrap();
        let _bystander = repo
            .insert_new_goal(new_goal("bystander", None))
            .await
            .unwrap();

        let deleted = repo.delete_goal(root.id).await.unwrap();
        assert_eq!(deleted, 3);

        let remaining = repo.load_goals().unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].title, "bystander");
    }

    #[tokio::test]
    async fn test_save_transitions_guard_skips_changed_rows() {
        let (_dir, repo) = setup().await;
        let now = Utc::now().naive_utc();

        let mut overdue = new_goal("overdue", None);
        overdue.due_date = Some(now - Duration::hours(2));
        let goal = repo.insert_new_goal(overdue).await.unwrap();

        // Scan finds the goal; a user completes it before the batch write.
        let mut scanned = repo.find_active_overdue(now).unwrap();
        assert_eq!(scanned.len(), 1);
        let mut raced = goal.clone();
        raced.complete(now);
        repo.update_goal(raced).await.unwrap();

        scanned[0].expire(now);
        let updated = repo
            .save_transitions(scanned, GoalStatus::Active)
            .await
            .unwrap();

        assert_eq!(updated, 0);
        let stored = repo.find_goal_by_id(&goal.id).unwrap().unwrap();
        assert_eq!(stored.status, GoalStatus::Completed);
    }

    #[tokio::test]
    async fn test_overdue_and_expiring_windows() {
        let (_dir, repo) = setup().await;
        let now = Utc::now().naive_utc();

        let mut overdue = new_goal("overdue", None);
        overdue.due_date = Some(now - Duration::hours(1));
        let mut soon = new_goal("soon", None);
        soon.due_date = Some(now + Duration::hours(2));
        let mut later = new_goal("later", None);
        later.due_date = Some(now + Duration::hours(48));
        let undated = new_goal("undated", None);

        for g in [overdue, soon, later, undated] {
            repo.insert_new_goal(g).await.unwrap();
        }

        let found = repo.find_active_overdue(now).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].title, "overdue");

        let found = repo
            .find_expiring_soon(now, now + Duration::hours(24))
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].title, "soon");
    }

    #[tokio::test]
    async fn test_stale_completed_query_respects_cutoff() {
        let (_dir, repo) = setup().await;
        let now = Utc::now().naive_utc();

        let goal = repo
            .insert_new_goal(new_goal("done long ago", None))
            .await
            .unwrap();
        let mut completed = goal.clone();
        completed.complete(now - Duration::days(10));
        repo.update_goal(completed).await.unwrap();

        let recent = repo
            .insert_new_goal(new_goal("done today", None))
            .await
            .unwrap();
        let mut completed = recent.clone();
        completed.complete(now);
        repo.update_goal(completed).await.unwrap();

        let stale = repo.find_stale_completed(now - Duration::days(7)).unwrap();
        assert_eq!(stale.len(), 1);
        assert_eq!(stale[0].title, "done long ago");
    }

    #[tokio::test]
    async fn test_stale_expired_query_respects_cutoff() {
        let (_dir, repo) = setup().await;
        let now = Utc::now().naive_utc();

        let goal = repo.insert_new_goal(new_goal("stale", None)).await.unwrap();
        let mut expired = goal.clone();
        expired.expire(now - Duration::hours(30));
        repo.update_goal(expired).await.unwrap();

        let fresh = repo.insert_new_goal(new_goal("fresh", None)).await.unwrap();
        let mut expired = fresh.clone();
        expired.expire(now - Duration::hours(1));
        repo.update_goal(expired).await.unwrap();

        let stale = repo.find_stale_expired(now - Duration::hours(24)).unwrap();
        assert_eq!(stale.len(), 1);
        assert_eq!(stale[0].title, "stale");
    }
}
