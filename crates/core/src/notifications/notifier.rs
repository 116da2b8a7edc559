//! Push-notification transport boundary.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::errors::Result;

/// Opaque push transport. Implementations live at the application edge
/// (FCM over HTTP in the server); the dispatcher only sees this trait.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(
        &self,
        push_token: &str,
        title: &str,
        body: &str,
        data: HashMap<String, String>,
    ) -> Result<()>;
}

/// A rendered notification: display fields plus the structured payload
/// clients use for routing.
#[derive(Debug, Clone)]
pub struct PushMessage {
    pub title: String,
    pub body: String,
    pub data: HashMap<String, String>,
}

impl PushMessage {
    /// The goal-deadline warning shared by the 24 h and 3 h tiers.
    pub fn goal_expiring(goal_title: &str, hours_left: i64) -> Self {
        let data = HashMap::from([
            ("type".to_string(), "GOAL_EXPIRING".to_string()),
            ("goal_title".to_string(), goal_title.to_string()),
            ("hours_left".to_string(), hours_left.to_string()),
        ]);
        PushMessage {
            title: "Goal deadline approaching".to_string(),
            body: format!("\"{goal_title}\" expires in {hours_left} hours"),
            data,
        }
    }

    /// Sent when a goal transitions to EXPIRED.
    pub fn goal_expired(goal_title: &str) -> Self {
        let data = HashMap::from([
            ("type".to_string(), "GOAL_EXPIRED".to_string()),
            ("goal_title".to_string(), goal_title.to_string()),
        ]);
        PushMessage {
            title: "Goal expired".to_string(),
            body: format!("\"{goal_title}\" has expired. Extend the deadline?"),
            data,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_goal_expiring_payload() {
        let message = PushMessage::goal_expiring("Ship the report", 3);
        assert_eq!(message.body, "\"Ship the report\" expires in 3 hours");
        assert_eq!(message.data.get("type").unwrap(), "GOAL_EXPIRING");
        assert_eq!(message.data.get("hours_left").unwrap(), "3");
        assert_eq!(message.data.get("goal_title").unwrap(), "Ship the report");
    }
}
