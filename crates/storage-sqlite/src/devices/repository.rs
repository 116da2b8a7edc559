use std::sync::Arc;

use async_trait::async_trait;
use chrono::{NaiveDateTime, Utc};
use diesel::prelude::*;
use diesel::SqliteConnection;
use uuid::Uuid;

use goaltrack_core::devices::{DeviceToken, DeviceTokenRepositoryTrait, RegisterDeviceToken};
use goaltrack_core::errors::Result;

use super::model::DeviceTokenDB;
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::StorageError;
use crate::schema::device_tokens;

pub struct DeviceTokenRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl DeviceTokenRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        DeviceTokenRepository { pool, writer }
    }
}

#[async_trait]
impl DeviceTokenRepositoryTrait for DeviceTokenRepository {
    fn find_active(&self) -> Result<Vec<DeviceToken>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = device_tokens::table
            .filter(device_tokens::is_active.eq(true))
            .load::<DeviceTokenDB>(&mut conn)
            .map_err(StorageError::from)?;
        Ok(rows.into_iter().map(DeviceToken::from).collect())
    }

    fn find_by_id(&self, token_id: &str) -> Result<Option<DeviceToken>> {
        let mut conn = get_connection(&self.pool)?;
        let row = device_tokens::table
            .find(token_id)
            .first::<DeviceTokenDB>(&mut conn)
            .optional()
            .map_err(StorageError::from)?;
        Ok(row.map(DeviceToken::from))
    }

    fn find_by_push_token(&self, push_token: &str) -> Result<Option<DeviceToken>> {
        let mut conn = get_connection(&self.pool)?;
        let row = device_tokens::table
            .filter(device_tokens::push_token.eq(push_token))
            .first::<DeviceTokenDB>(&mut conn)
            .optional()
            .map_err(StorageError::from)?;
        Ok(row.map(DeviceToken::from))
    }

    async fn upsert(&self, registration: RegisterDeviceToken) -> Result<DeviceToken> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<DeviceToken> {
                let row =
                    DeviceTokenDB::from_registration(registration, Uuid::new_v4().to_string());

                // Re-registration keeps the existing row (and id) and
                // reactivates it.
                let result_db = diesel::insert_into(device_tokens::table)
                    .values(&row)
                    .on_conflict(device_tokens::push_token)
                    .do_update()
                    .set((
                        device_tokens::device_id.eq(row.device_id.clone()),
                        device_tokens::device_name.eq(row.device_name.clone()),
                        device_tokens::platform.eq(row.platform.clone()),
                        device_tokens::is_active.eq(true),
                        device_tokens::updated_at.eq(row.updated_at),
                    ))
                    .returning(DeviceTokenDB::as_returning())
                    .get_result(conn)
                    .map_err(StorageError::from)?;
                Ok(DeviceToken::from(result_db))
            })
            .await
    }

    async fn deactivate(&self, token_id: &str) -> Result<usize> {
        let token_id = token_id.to_string();
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<usize> {
                let affected = diesel::update(device_tokens::table.find(&token_id))
                    .set((
                        device_tokens::is_active.eq(false),
                        device_tokens::updated_at.eq(Utc::now().naive_utc()),
                    ))
                    .execute(conn)
                    .map_err(StorageError::from)?;
                Ok(affected)
            })
            .await
    }

    async fn touch(&self, token_id: &str, now: NaiveDateTime) -> Result<()> {
        let token_id = token_id.to_string();
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<()> {
                diesel::update(device_tokens::table.find(&token_id))
                    .set((
                        device_tokens::last_used_at.eq(Some(now)),
                        device_tokens::updated_at.eq(now),
                    ))
                    .execute(conn)
                    .map_err(StorageError::from)?;
                Ok(())
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;

    async fn setup() -> (tempfile::TempDir, DeviceTokenRepository) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("goaltrack-test.db");
        let pool = db::create_pool(path.to_str().unwrap()).unwrap();
        db::run_migrations(&pool).unwrap();
        let writer = db::spawn_writer((*pool).clone());
        (dir, DeviceTokenRepository::new(pool, writer))
    }

    fn registration(token: &str, name: &str) -> RegisterDeviceToken {
        RegisterDeviceToken {
            push_token: token.to_string(),
            device_id: None,
            device_name: Some(name.to_string()),
            platform: Some("android".to_string()),
        }
    }

    #[tokio::test]
    async fn test_upsert_keeps_the_row_for_a_known_push_token() {
        let (_dir, repo) = setup().await;

        let first = repo.upsert(registration("tok-1", "Pixel 9")).await.unwrap();
        repo.deactivate(&first.id).await.unwrap();

        let second = repo
            .upsert(registration("tok-1", "Pixel 9 Pro"))
            .await
            .unwrap();
        assert_eq!(first.id, second.id);
        assert!(second.is_active);
        assert_eq!(second.device_name.as_deref(), Some("Pixel 9 Pro"));

        assert_eq!(repo.find_active().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_deactivate_is_a_soft_delete() {
        let (_dir, repo) = setup().await;
        let token = repo.upsert(registration("tok-1", "Pixel 9")).await.unwrap();

        assert_eq!(repo.deactivate(&token.id).await.unwrap(), 1);
        assert_eq!(repo.deactivate("missing").await.unwrap(), 0);

        assert!(repo.find_active().unwrap().is_empty());
        let stored = repo.find_by_id(&token.id).unwrap().unwrap();
        assert!(!stored.is_active);
    }

    #[tokio::test]
    async fn test_touch_records_last_use() {
        let (_dir, repo) = setup().await;
        let token = repo.upsert(registration("tok-1", "Pixel 9")).await.unwrap();
        assert!(token.last_used_at.is_none());

        let now = Utc::now().naive_utc();
        repo.touch(&token.id, now).await.unwrap();

        let stored = repo.find_by_id(&token.id).unwrap().unwrap();
        assert_eq!(stored.last_used_at, Some(now));
    }
}
