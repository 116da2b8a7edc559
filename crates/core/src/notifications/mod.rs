//! Notifications module - deadline warning fan-out and the transport trait.

mod dispatcher;
mod notifier;

pub use dispatcher::{DispatchSummary, NotificationDispatcher};
pub use notifier::{Notifier, PushMessage};
