use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDateTime;
use log::info;

use crate::devices::devices_model::{DeviceToken, RegisterDeviceToken};
use crate::devices::devices_traits::{DeviceTokenRepositoryTrait, DeviceTokenServiceTrait};
use crate::errors::{Error, Result, ValidationError};

pub struct DeviceTokenService {
    token_repo: Arc<dyn DeviceTokenRepositoryTrait>,
}

impl DeviceTokenService {
    pub fn new(token_repo: Arc<dyn DeviceTokenRepositoryTrait>) -> Self {
        DeviceTokenService { token_repo }
    }
}

#[async_trait]
impl DeviceTokenServiceTrait for DeviceTokenService {
    fn get_active_tokens(&self) -> Result<Vec<DeviceToken>> {
        self.token_repo.find_active()
    }

    fn get_token(&self, token_id: &str) -> Result<DeviceToken> {
        self.token_repo
            .find_by_id(token_id)?
            .ok_or_else(|| Error::DeviceTokenNotFound(token_id.to_string()))
    }

    fn find_by_push_token(&self, push_token: &str) -> Result<Option<DeviceToken>> {
        self.token_repo.find_by_push_token(push_token)
    }

    async fn register(&self, registration: RegisterDeviceToken) -> Result<DeviceToken> {
        if registration.push_token.trim().is_empty() {
            return Err(Error::Validation(ValidationError::MissingField(
                "pushToken".to_string(),
            )));
        }
        let token = self.token_repo.upsert(registration).await?;
        info!(
            "Device token registered: id={} platform={}",
            token.id,
            token.platform.as_deref().unwrap_or("unknown")
        );
        Ok(token)
    }

    async fn deactivate(&self, token_id: &str) -> Result<DeviceToken> {
        let affected = self.token_repo.deactivate(token_id).await?;
        if affected == 0 {
            return Err(Error::DeviceTokenNotFound(token_id.to_string()));
        }
        info!("Device token deactivated: id={}", token_id);
        self.get_token(token_id)
    }

    async fn touch(&self, token_id: &str, now: NaiveDateTime) -> Result<()> {
        self.token_repo.touch(token_id, now).await
    }
}
