use std::sync::Arc;

use chrono::NaiveDateTime;
use log::{info, warn};
use serde::Serialize;

use crate::devices::DeviceTokenRepositoryTrait;
use crate::errors::Result;
use crate::expiration::ExpirationServiceTrait;
use crate::notifications::notifier::{Notifier, PushMessage};

/// Counts reported by one warning pass, for logs and the admin API.
#[derive(Debug, Clone, Copy, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DispatchSummary {
    pub goals_matched: usize,
    pub notifications_sent: usize,
}

/// Fans deadline warnings out to every registered device.
///
/// One pass covers one urgency tier (a horizon in hours). The pass re-queries
/// by horizon instead of tracking what was already notified, so a goal picked
/// up by the 24 h tier is later picked up by the 3 h tier as well: graduated
/// escalation. Per-token failures are logged and skipped.
pub struct NotificationDispatcher {
    expiration_service: Arc<dyn ExpirationServiceTrait>,
    token_repo: Arc<dyn DeviceTokenRepositoryTrait>,
    notifier: Arc<dyn Notifier>,
}

impl NotificationDispatcher {
    pub fn new(
        expiration_service: Arc<dyn ExpirationServiceTrait>,
        token_repo: Arc<dyn DeviceTokenRepositoryTrait>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        NotificationDispatcher {
            expiration_service,
            token_repo,
            notifier,
        }
    }

    /// Runs one warning tier: goals due within `horizon_hours`, with
    /// reminders enabled, × every active device token.
    pub async fn send_expiration_warnings(
        &self,
        now: NaiveDateTime,
        horizon_hours: i64,
    ) -> Result<DispatchSummary> {
        info!("Starting expiration warnings ({} hours)", horizon_hours);

        let expiring = self.expiration_service.expiring_soon(now, horizon_hours)?;
        let reminderable: Vec<_> = expiring
            .into_iter()
            .filter(|g| g.reminder_enabled)
            .collect();
        if reminderable.is_empty() {
            info!("No goals expiring within {} hours", horizon_hours);
            return Ok(DispatchSummary::default());
        }

        let tokens = self.token_repo.find_active()?;
        if tokens.is_empty() {
            warn!("No active device tokens registered");
            return Ok(DispatchSummary {
                goals_matched: reminderable.len(),
                notifications_sent: 0,
            });
        }

        let mut sent = 0;
        for goal in &reminderable {
            info!(
                "Sending deadline warning for goal '{}' (due: {})",
                goal.title,
                goal.due_date.map(|d| d.to_string()).unwrap_or_default()
            );
            let message = PushMessage::goal_expiring(&goal.title, horizon_hours);

            for token in &tokens {
                match self
                    .notifier
                    .send(
                        &token.push_token,
                        &message.title,
                        &message.body,
                        message.data.clone(),
                    )
                    .await
                {
                    Ok(()) => {
                        sent += 1;
                        // Best-effort bookkeeping; a lost update here is fine.
                        if let Err(e) = self.token_repo.touch(&token.id, now).await {
                            warn!("Failed to record delivery on token {}: {}", token.id, e);
                        }
                    }
                    Err(e) => {
                        warn!("Failed to notify token {}: {}", token.id, e);
                    }
                }
            }
        }

        info!(
            "Expiration warnings completed: {} notifications sent for {} goals",
            sent,
            reminderable.len()
        );
        Ok(DispatchSummary {
            goals_matched: reminderable.len(),
            notifications_sent: sent,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::devices::testing::MockDeviceTokenRepository;
    use crate::errors::Error;
    use crate::expiration::ExpirationService;
    use crate::goals::testing::{make_goal, MockGoalRepository};
    use crate::goals::{Goal, GoalStatus, GoalType};
    use async_trait::async_trait;
    use chrono::{Duration, NaiveDate, NaiveDateTime};
    use std::collections::HashMap;
    use std::sync::Mutex;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 6, 15)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap()
    }

    fn expiring_goal(id: &str, hours_out: i64, reminder: bool) -> Goal {
        let mut goal = make_goal(id, GoalType::Daily, GoalStatus::Active, None);
        goal.due_date = Some(now() + Duration::hours(hours_out));
        goal.reminder_enabled = reminder;
        goal
    }

    #[derive(Default)]
    struct RecordingNotifier {
        sent: Mutex<Vec<(String, String)>>,
        fail_tokens: Vec<String>,
    }

    impl RecordingNotifier {
        fn failing_on(token: &str) -> Self {
            RecordingNotifier {
                sent: Mutex::new(Vec::new()),
                fail_tokens: vec![token.to_string()],
            }
        }

        fn sent(&self) -> Vec<(String, String)> {
            self.sent.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Notifier for RecordingNotifier {
        async fn send(
            &self,
            push_token: &str,
            _title: &str,
            body: &str,
            _data: HashMap<String, String>,
        ) -> crate::errors::Result<()> {
            if self.fail_tokens.iter().any(|t| t == push_token) {
                return Err(Error::NotificationDelivery(format!(
                    "token {push_token} rejected"
                )));
            }
            self.sent
                .lock()
                .unwrap()
                .push((push_token.to_string(), body.to_string()));
            Ok(())
        }
    }

    fn dispatcher(
        goals: Vec<Goal>,
        tokens: MockDeviceTokenRepository,
        notifier: RecordingNotifier,
    ) -> (
        NotificationDispatcher,
        Arc<MockDeviceTokenRepository>,
        Arc<RecordingNotifier>,
    ) {
        let goal_repo = Arc::new(MockGoalRepository::new(goals));
        let token_repo = Arc::new(tokens);
        let notifier = Arc::new(notifier);
        let dispatcher = NotificationDispatcher::new(
            Arc::new(ExpirationService::new(goal_repo)),
            token_repo.clone(),
            notifier.clone(),
        );
        (dispatcher, token_repo, notifier)
    }

    #[tokio::test]
    async fn test_reminder_disabled_goals_produce_no_notifications() {
        let (dispatcher, _, notifier) = dispatcher(
            vec![expiring_goal("g1", 5, false)],
            MockDeviceTokenRepository::with_active_tokens(&["tok-1"]),
            RecordingNotifier::default(),
        );

        let summary = dispatcher.send_expiration_warnings(now(), 24).await.unwrap();
        assert_eq!(summary.goals_matched, 0);
        assert_eq!(summary.notifications_sent, 0);
        assert!(notifier.sent().is_empty());
    }

    #[tokio::test]
    async fn test_one_goal_one_token_sends_exactly_once() {
        let (dispatcher, token_repo, notifier) = dispatcher(
            vec![expiring_goal("g1", 5, true)],
            MockDeviceTokenRepository::with_active_tokens(&["tok-1"]),
            RecordingNotifier::default(),
        );

        let summary = dispatcher.send_expiration_warnings(now(), 24).await.unwrap();
        assert_eq!(summary.goals_matched, 1);
        assert_eq!(summary.notifications_sent, 1);
        assert_eq!(notifier.sent().len(), 1);
        assert_eq!(token_repo.touched_count(), 1);
    }

    #[tokio::test]
    async fn test_fan_out_covers_the_goal_token_product() {
        let (dispatcher, _, notifier) = dispatcher(
            vec![expiring_goal("g1", 2, true), expiring_goal("g2", 20, true)],
            MockDeviceTokenRepository::with_active_tokens(&["tok-1", "tok-2"]),
            RecordingNotifier::default(),
        );

        let summary = dispatcher.send_expiration_warnings(now(), 24).await.unwrap();
        assert_eq!(summary.goals_matched, 2);
        assert_eq!(summary.notifications_sent, 4);
        assert_eq!(notifier.sent().len(), 4);
    }

    #[tokio::test]
    async fn test_urgent_tier_only_sees_the_tighter_window() {
        let goals = vec![expiring_goal("g1", 2, true), expiring_goal("g2", 20, true)];
        let (dispatcher, _, notifier) = dispatcher(
            goals,
            MockDeviceTokenRepository::with_active_tokens(&["tok-1"]),
            RecordingNotifier::default(),
        );

        let summary = dispatcher.send_expiration_warnings(now(), 3).await.unwrap();
        assert_eq!(summary.goals_matched, 1);
        assert_eq!(summary.notifications_sent, 1);
        assert!(notifier.sent()[0].1.contains("3 hours"));
    }

    #[tokio::test]
    async fn test_delivery_failure_skips_token_and_continues() {
        let (dispatcher, token_repo, notifier) = dispatcher(
            vec![expiring_goal("g1", 5, true)],
            MockDeviceTokenRepository::with_active_tokens(&["bad", "good"]),
            RecordingNotifier::failing_on("bad"),
        );

        let summary = dispatcher.send_expiration_warnings(now(), 24).await.unwrap();
        assert_eq!(summary.notifications_sent, 1);
        assert_eq!(notifier.sent().len(), 1);
        assert_eq!(notifier.sent()[0].0, "good");
        // Only the delivered token is touched.
        assert_eq!(token_repo.touched_count(), 1);
    }

    #[tokio::test]
    async fn test_no_active_tokens_reports_matched_goals_only() {
        let (dispatcher, _, notifier) = dispatcher(
            vec![expiring_goal("g1", 5, true)],
            MockDeviceTokenRepository::default(),
            RecordingNotifier::default(),
        );

        let summary = dispatcher.send_expiration_warnings(now(), 24).await.unwrap();
        assert_eq!(summary.goals_matched, 1);
        assert_eq!(summary.notifications_sent, 0);
        assert!(notifier.sent().is_empty());
    }

    #[tokio::test]
    async fn test_rerun_sends_again_no_ledger() {
        // Re-running the same tier re-notifies; suppression within a window
        // comes from the scheduler cadence, not a ledger.
        let (dispatcher, _, notifier) = dispatcher(
            vec![expiring_goal("g1", 5, true)],
            MockDeviceTokenRepository::with_active_tokens(&["tok-1"]),
            RecordingNotifier::default(),
        );

        dispatcher.send_expiration_warnings(now(), 24).await.unwrap();
        dispatcher.send_expiration_warnings(now(), 24).await.unwrap();
        assert_eq!(notifier.sent().len(), 2);
    }
}
