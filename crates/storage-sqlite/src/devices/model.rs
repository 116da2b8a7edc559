//! Database models for device tokens.

use chrono::NaiveDateTime;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use goaltrack_core::devices::{DeviceToken, RegisterDeviceToken};

/// Database model for device tokens.
#[derive(
    Queryable,
    Identifiable,
    Insertable,
    AsChangeset,
    Selectable,
    PartialEq,
    Serialize,
    Deserialize,
    Debug,
    Clone,
)]
#[diesel(table_name = crate::schema::device_tokens)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[serde(rename_all = "camelCase")]
pub struct DeviceTokenDB {
    pub id: String,
    pub push_token: String,
    pub device_id: Option<String>,
    pub device_name: Option<String>,
    pub platform: Option<String>,
    pub is_active: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
    pub last_used_at: Option<NaiveDateTime>,
}

// Conversion to and from domain models

impl From<DeviceTokenDB> for DeviceToken {
    fn from(db: DeviceTokenDB) -> Self {
        Self {
            id: db.id,
            push_token: db.push_token,
            device_id: db.device_id,
            device_name: db.device_name,
            platform: db.platform,
            is_active: db.is_active,
            created_at: db.created_at,
            updated_at: db.updated_at,
            last_used_at: db.last_used_at,
        }
    }
}

impl DeviceTokenDB {
    /// Builds a fresh row for a registration that matched no existing token.
    pub fn from_registration(registration: RegisterDeviceToken, id: String) -> Self {
        let now = chrono::Utc::now().naive_utc();
        Self {
            id,
            push_token: registration.push_token,
            device_id: registration.device_id,
            device_name: registration.device_name,
            platform: registration.platform,
            is_active: true,
            created_at: now,
            updated_at: now,
            last_used_at: None,
        }
    }
}
