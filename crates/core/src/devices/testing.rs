//! In-memory device token repository used by unit tests across the crate.

use std::sync::RwLock;

use async_trait::async_trait;
use chrono::{NaiveDateTime, Utc};
use uuid::Uuid;

use crate::devices::devices_model::{DeviceToken, RegisterDeviceToken};
use crate::devices::devices_traits::DeviceTokenRepositoryTrait;
use crate::errors::Result;

#[derive(Default)]
pub struct MockDeviceTokenRepository {
    tokens: RwLock<Vec<DeviceToken>>,
}

impl MockDeviceTokenRepository {
    pub fn with_active_tokens(push_tokens: &[&str]) -> Self {
        let now = Utc::now().naive_utc();
        let tokens = push_tokens
            .iter()
            .map(|t| DeviceToken {
                id: Uuid::new_v4().to_string(),
                push_token: t.to_string(),
                device_id: None,
                device_name: None,
                platform: None,
                is_active: true,
                created_at: now,
                updated_at: now,
                last_used_at: None,
            })
            .collect();
        Self {
            tokens: RwLock::new(tokens),
        }
    }

    pub fn touched_count(&self) -> usize {
        self.tokens
            .read()
            .unwrap()
            .iter()
            .filter(|t| t.last_used_at.is_some())
            .count()
    }
}

#[async_trait]
impl DeviceTokenRepositoryTrait for MockDeviceTokenRepository {
    fn find_active(&self) -> Result<Vec<DeviceToken>> {
        Ok(self
            .tokens
            .read()
            .unwrap()
            .iter()
            .filter(|t| t.is_active)
            .cloned()
            .collect())
    }

    fn find_by_id(&self, token_id: &str) -> Result<Option<DeviceToken>> {
        Ok(self
            .tokens
            .read()
            .unwrap()
            .iter()
            .find(|t| t.id == token_id)
            .cloned())
    }

    fn find_by_push_token(&self, push_token: &str) -> Result<Option<DeviceToken>> {
        Ok(self
            .tokens
            .read()
            .unwrap()
            .iter()
            .find(|t| t.push_token == push_token)
            .cloned())
    }

    async fn upsert(&self, registration: RegisterDeviceToken) -> Result<DeviceToken> {
        let now = Utc::now().naive_utc();
        let mut tokens = self.tokens.write().unwrap();
        if let Some(existing) = tokens
            .iter_mut()
            .find(|t| t.push_token == registration.push_token)
        {
            existing.device_id = registration.device_id;
            existing.device_name = registration.device_name;
            existing.platform = registration.platform;
            existing.is_active = true;
            existing.updated_at = now;
            return Ok(existing.clone());
        }
        let token = DeviceToken {
            id: Uuid::new_v4().to_string(),
            push_token: registration.push_token,
            device_id: registration.device_id,
            device_name: registration.device_name,
            platform: registration.platform,
            is_active: true,
            created_at: now,
            updated_at: now,
            last_used_at: None,
        };
        tokens.push(token.clone());
        Ok(token)
    }

    async fn deactivate(&self, token_id: &str) -> Result<usize> {
        let mut tokens = self.tokens.write().unwrap();
        match tokens.iter_mut().find(|t| t.id == token_id) {
            Some(token) => {
                token.is_active = false;
                token.updated_at = Utc::now().naive_utc();
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn touch(&self, token_id: &str, now: NaiveDateTime) -> Result<()> {
        let mut tokens = self.tokens.write().unwrap();
        if let Some(token) = tokens.iter_mut().find(|t| t.id == token_id) {
            token.last_used_at = Some(now);
            token.updated_at = now;
        }
        Ok(())
    }
}
