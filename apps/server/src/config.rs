//! Server configuration from environment variables.

use goaltrack_core::constants::{URGENT_HORIZON_HOURS, WARNING_HORIZON_HOURS};

/// Runtime configuration, resolved once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub listen_addr: String,
    pub db_path: String,
    /// Allowed CORS origin; `None` allows any origin (local development).
    pub cors_origin: Option<String>,
    /// FCM legacy server key; push delivery is disabled when absent.
    pub fcm_server_key: Option<String>,
    pub expiration_check_interval_secs: u64,
    pub archive_check_interval_secs: u64,
    pub warning_interval_secs: u64,
    pub urgent_interval_secs: u64,
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_secs(key: &str, default: u64) -> u64 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Config {
            listen_addr: env_or("GT_LISTEN_ADDR", "0.0.0.0:8080"),
            db_path: env_or("GT_DB_PATH", "data/goaltrack.db"),
            cors_origin: std::env::var("GT_CORS_ORIGIN").ok(),
            fcm_server_key: std::env::var("GT_FCM_SERVER_KEY").ok().filter(|k| !k.is_empty()),
            // Hourly detect pass, daily archive pass.
            expiration_check_interval_secs: env_secs("GT_EXPIRATION_INTERVAL_SECS", 60 * 60),
            archive_check_interval_secs: env_secs("GT_ARCHIVE_INTERVAL_SECS", 24 * 60 * 60),
            // Daily 24 h warnings, urgent warnings every 3 h.
            warning_interval_secs: env_secs("GT_WARNING_INTERVAL_SECS", 24 * 60 * 60),
            urgent_interval_secs: env_secs(
                "GT_URGENT_INTERVAL_SECS",
                (URGENT_HORIZON_HOURS as u64) * 60 * 60,
            ),
        }
    }

    /// The two warning tiers: (cadence seconds, horizon hours).
    pub fn warning_tiers(&self) -> [(u64, i64); 2] {
        [
            (self.warning_interval_secs, WARNING_HORIZON_HOURS),
            (self.urgent_interval_secs, URGENT_HORIZON_HOURS),
        ]
    }
}
