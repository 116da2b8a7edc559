use crate::errors::Result;
use crate::goals::Goal;
use async_trait::async_trait;
use chrono::NaiveDateTime;

/// Trait for the time-driven expiration passes.
///
/// `check_and_expire` and `check_and_archive` are invoked both by the
/// background scheduler and by the administrative trigger endpoints; each
/// returns the number of goals it actually transitioned.
#[async_trait]
pub trait ExpirationServiceTrait: Send + Sync {
    async fn check_and_expire(&self, now: NaiveDateTime) -> Result<usize>;
    async fn check_and_archive(&self, now: NaiveDateTime) -> Result<usize>;
    fn expiring_soon(&self, now: NaiveDateTime, horizon_hours: i64) -> Result<Vec<Goal>>;
}
