//! FCM push transport over the legacy HTTP send endpoint.

use std::collections::HashMap;

use async_trait::async_trait;
use goaltrack_core::errors::{Error, Result};
use goaltrack_core::notifications::Notifier;
use serde_json::json;

const FCM_SEND_ENDPOINT: &str = "https://fcm.googleapis.com/fcm/send";

/// Sends push notifications through Firebase Cloud Messaging.
///
/// Without a server key the notifier is disabled: every send fails with a
/// delivery error, which the dispatcher logs and skips.
pub struct FcmNotifier {
    client: reqwest::Client,
    server_key: Option<String>,
    endpoint: String,
}

impl FcmNotifier {
    pub fn new(server_key: Option<String>) -> Self {
        FcmNotifier {
            client: reqwest::Client::new(),
            server_key,
            endpoint: FCM_SEND_ENDPOINT.to_string(),
        }
    }

    #[cfg(test)]
    fn with_endpoint(server_key: Option<String>, endpoint: String) -> Self {
        FcmNotifier {
            client: reqwest::Client::new(),
            server_key,
            endpoint,
        }
    }
}

#[async_trait]
impl Notifier for FcmNotifier {
    async fn send(
        &self,
        push_token: &str,
        title: &str,
        body: &str,
        data: HashMap<String, String>,
    ) -> Result<()> {
        let Some(server_key) = &self.server_key else {
            tracing::debug!("FCM not configured, skipping notification");
            return Err(Error::NotificationDelivery(
                "FCM is not configured".to_string(),
            ));
        };
        if push_token.is_empty() {
            return Err(Error::NotificationDelivery(
                "push token is empty".to_string(),
            ));
        }

        let payload = json!({
            "to": push_token,
            "notification": { "title": title, "body": body },
            "data": data,
        });

        let response = self
            .client
            .post(&self.endpoint)
            .header("Authorization", format!("key={server_key}"))
            .json(&payload)
            .send()
            .await
            .map_err(|e| Error::NotificationDelivery(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(Error::NotificationDelivery(format!(
                "FCM returned {status}: {detail}"
            )));
        }
        tracing::debug!("FCM notification accepted for token");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_disabled_notifier_rejects_sends() {
        let notifier = FcmNotifier::new(None);
        let result = notifier
            .send("tok-1", "title", "body", HashMap::new())
            .await;
        assert!(matches!(result, Err(Error::NotificationDelivery(_))));
    }

    #[tokio::test]
    async fn test_empty_token_is_rejected_before_any_request() {
        // An unroutable endpoint proves no request is attempted.
        let notifier = FcmNotifier::with_endpoint(
            Some("key".to_string()),
            "http://127.0.0.1:1/unreachable".to_string(),
        );
        let result = notifier.send("", "title", "body", HashMap::new()).await;
        assert!(matches!(result, Err(Error::NotificationDelivery(ref m)) if m.contains("empty")));
    }
}
