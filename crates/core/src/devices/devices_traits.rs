use crate::devices::devices_model::{DeviceToken, RegisterDeviceToken};
use crate::errors::Result;
use async_trait::async_trait;
use chrono::NaiveDateTime;

/// Trait for device token repository operations.
#[async_trait]
pub trait DeviceTokenRepositoryTrait: Send + Sync {
    fn find_active(&self) -> Result<Vec<DeviceToken>>;
    fn find_by_id(&self, token_id: &str) -> Result<Option<DeviceToken>>;
    fn find_by_push_token(&self, push_token: &str) -> Result<Option<DeviceToken>>;
    /// Insert, or update-and-reactivate the row holding the same push token.
    async fn upsert(&self, registration: RegisterDeviceToken) -> Result<DeviceToken>;
    /// Soft delete. Returns the number of rows affected.
    async fn deactivate(&self, token_id: &str) -> Result<usize>;
    /// Records a successful delivery. Best-effort; lost updates are tolerated.
    async fn touch(&self, token_id: &str, now: NaiveDateTime) -> Result<()>;
}

/// Trait for device token service operations.
#[async_trait]
pub trait DeviceTokenServiceTrait: Send + Sync {
    fn get_active_tokens(&self) -> Result<Vec<DeviceToken>>;
    fn get_token(&self, token_id: &str) -> Result<DeviceToken>;
    fn find_by_push_token(&self, push_token: &str) -> Result<Option<DeviceToken>>;
    async fn register(&self, registration: RegisterDeviceToken) -> Result<DeviceToken>;
    async fn deactivate(&self, token_id: &str) -> Result<DeviceToken>;
    async fn touch(&self, token_id: &str, now: NaiveDateTime) -> Result<()>;
}
