use std::sync::Arc;

use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use goaltrack_core::devices::{DeviceTokenRepositoryTrait, DeviceTokenService, DeviceTokenServiceTrait};
use goaltrack_core::expiration::{ExpirationService, ExpirationServiceTrait};
use goaltrack_core::goals::{GoalRepositoryTrait, GoalService, GoalServiceTrait};
use goaltrack_core::notifications::{NotificationDispatcher, Notifier};
use goaltrack_storage_sqlite::devices::DeviceTokenRepository;
use goaltrack_storage_sqlite::goals::GoalRepository;
use goaltrack_storage_sqlite::{db, db::write_actor};

use crate::config::Config;
use crate::notifier::FcmNotifier;

pub struct AppState {
    pub goal_service: Arc<dyn GoalServiceTrait>,
    pub device_token_service: Arc<dyn DeviceTokenServiceTrait>,
    pub expiration_service: Arc<dyn ExpirationServiceTrait>,
    pub dispatcher: Arc<NotificationDispatcher>,
    pub notifier: Arc<dyn Notifier>,
    pub db_path: String,
}

pub fn init_tracing() {
    let log_format = std::env::var("GT_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if log_format.eq_ignore_ascii_case("json") {
        registry
            .with(fmt::layer().json().with_current_span(false))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_line_number(true))
            .init();
    }
}

pub async fn build_state(config: &Config) -> anyhow::Result<Arc<AppState>> {
    let db_path = db::init(&config.db_path)?;
    tracing::info!("Database path in use: {}", db_path);

    let pool = db::create_pool(&db_path)?;
    db::run_migrations(&pool)?;
    let writer = write_actor::spawn_writer((*pool).clone());

    let goal_repo: Arc<dyn GoalRepositoryTrait> =
        Arc::new(GoalRepository::new(pool.clone(), writer.clone()));
    let token_repo: Arc<dyn DeviceTokenRepositoryTrait> =
        Arc::new(DeviceTokenRepository::new(pool.clone(), writer.clone()));

    let goal_service = Arc::new(GoalService::new(goal_repo.clone()));
    let device_token_service = Arc::new(DeviceTokenService::new(token_repo.clone()));
    let expiration_service: Arc<dyn ExpirationServiceTrait> =
        Arc::new(ExpirationService::new(goal_repo));

    let notifier: Arc<dyn Notifier> = Arc::new(FcmNotifier::new(config.fcm_server_key.clone()));
    if config.fcm_server_key.is_none() {
        tracing::warn!("GT_FCM_SERVER_KEY not set; push delivery is disabled");
    }
    let dispatcher = Arc::new(NotificationDispatcher::new(
        expiration_service.clone(),
        token_repo,
        notifier.clone(),
    ));

    Ok(Arc::new(AppState {
        goal_service,
        device_token_service,
        expiration_service,
        dispatcher,
        notifier,
        db_path,
    }))
}
