//! Device token domain models.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// A registered push-notification target.
///
/// The push token itself is opaque and unique per device. Removal only
/// deactivates the row; history (`last_used_at`) is kept.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DeviceToken {
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

/// Registration input; an existing row with the same push token is updated
/// and re-activated instead of duplicated.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct RegisterDeviceToken {
    pub push_token: String,
    pub device_id: Option<String>,
    pub device_name: Option<String>,
    pub platform: Option<String>,
}
