//! Runtime configuration.
//!
//! Loads configuration from environment variables.

use std::env;
use std::time::Duration;

use crate::database::models::ReviewFamily;
use crate::utils::parse_duration;

/// Process-level configuration for the moderation backend.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    // MongoDB
    pub mongodb_uri: String,
    pub mongodb_database: String,

    /// How often the expiry sweeper scans for due tasks.
    pub sweep_interval: Duration,

    /// Upper bound on due tasks processed in one sweep.
    pub sweep_batch: i64,

    /// Delay before a stale report alert is deleted.
    pub report_alert_grace: Duration,

    /// Delay before a stale request alert is deleted.
    pub request_alert_grace: Duration,

    /// Operator user IDs (comma-separated in the environment).
    /// Operators bypass per-guild capability checks.
    pub operator_ids: Vec<u64>,

    /// Identity recorded as resolver on platform-triggered auto-resolutions.
    pub system_actor_id: u64,
}

impl RuntimeConfig {
    /// Load configuration from environment variables.
    ///
    /// # Panics
    /// Panics if required environment variables are not set.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let sweep_interval = env::var("VIGIL_SWEEP_INTERVAL")
            .ok()
            .and_then(|s| parse_duration(&s))
            .unwrap_or(Duration::from_secs(30));

        let sweep_batch = env::var("VIGIL_SWEEP_BATCH")
            .ok()
            .and_then(|s| s.parse::<i64>().ok())
            .filter(|n| *n > 0)
            .unwrap_or(500);

        Self {
            mongodb_uri: env::var("MONGODB_URI").expect("MONGODB_URI must be set"),
            mongodb_database: env::var("MONGODB_DATABASE")
                .unwrap_or_else(|_| "vigil".to_string()),
            sweep_interval,
            sweep_batch,
            report_alert_grace: grace_from_env("VIGIL_REPORT_ALERT_GRACE_SECS"),
            request_alert_grace: grace_from_env("VIGIL_REQUEST_ALERT_GRACE_SECS"),
            operator_ids: parse_id_list(&env::var("VIGIL_OPERATOR_IDS").unwrap_or_default()),
            system_actor_id: env::var("VIGIL_SYSTEM_ACTOR_ID")
                .ok()
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(0),
        }
    }

    /// Grace delay before deleting a stale alert, per entity family.
    pub fn alert_grace(&self, family: ReviewFamily) -> Duration {
        match family {
            ReviewFamily::Report => self.report_alert_grace,
            ReviewFamily::Request => self.request_alert_grace,
        }
    }
}

fn grace_from_env(key: &str) -> Duration {
    env::var(key)
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_secs)
        .unwrap_or(Duration::from_secs(7))
}

/// Parse a comma-separated list of numeric IDs, skipping malformed entries.
fn parse_id_list(raw: &str) -> Vec<u64> {
    raw.split(',')
        .filter_map(|s| s.trim().parse::<u64>().ok())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_list_skips_garbage() {
        assert_eq!(parse_id_list("1, 2,x,3"), vec![1, 2, 3]);
        assert_eq!(parse_id_list(""), Vec::<u64>::new());
    }
}
