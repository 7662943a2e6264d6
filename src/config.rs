//! Server configuration: defaults, then an optional `canvass.toml`, then
//! `CANVASS_*` environment variables.

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::domain::route::RouteParams;

pub const DEFAULT_CONFIG_FILE: &str = "canvass.toml";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub db_path: String,
    pub schema_path: String,
    pub bind_addr: String,
    pub max_workers: usize,
    /// Absolute URL prefix used in emailed sign-in links.
    pub public_base_url: String,

    pub session_ttl_secs: i64,
    pub magic_link_ttl_secs: i64,

    /// A claim with no activity for this long is treated as released.
    pub claim_expiry_secs: i64,
    pub undo_window_secs: i64,
    pub callback_window_secs: i64,
    pub skip_min_visits: usize,
    pub skip_flag_rate: f64,
    pub skip_clear_engagement_rate: f64,
    pub insight_min_samples: u32,
    pub timezone_offset_minutes: i32,
    pub support_unit_cents: i64,

    pub max_poll_secs: u64,
    pub max_body_bytes: u64,

    pub brevo_api_key: Option<String>,
    pub sender_email: String,
    pub sender_name: String,

    pub insights_url: Option<String>,
    pub insights_api_key: Option<String>,
    pub insights_model: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: "canvass.sqlite3".to_string(),
            schema_path: "sql/schema.sql".to_string(),
            bind_addr: "127.0.0.1:3000".to_string(),
            max_workers: 8,
            public_base_url: "http://127.0.0.1:3000".to_string(),
            session_ttl_secs: 60 * 60 * 24 * 7,
            magic_link_ttl_secs: 15 * 60,
            claim_expiry_secs: 30 * 60,
            undo_window_secs: 10,
            callback_window_secs: 2 * 60 * 60,
            skip_min_visits: 5,
            skip_flag_rate: 0.70,
            skip_clear_engagement_rate: 0.40,
            insight_min_samples: 3,
            timezone_offset_minutes: 0,
            support_unit_cents: 5_000,
            max_poll_secs: 25,
            max_body_bytes: 1024 * 1024,
            brevo_api_key: None,
            sender_email: "noreply@canvass.local".to_string(),
            sender_name: "Canvass".to_string(),
            insights_url: None,
            insights_api_key: None,
            insights_model: "gpt-4o-mini".to_string(),
        }
    }
}

impl Config {
    pub fn load() -> Self {
        Self::load_from(Path::new(DEFAULT_CONFIG_FILE))
    }

    pub fn load_from(path: &Path) -> Self {
        Figment::from(Serialized::defaults(Self::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed("CANVASS_").lowercase(true))
            .extract()
            .inspect_err(|e| tracing::warn!("failed to parse config: {e}"))
            .unwrap_or_default()
    }

    pub fn route_params(&self) -> RouteParams {
        RouteParams {
            callback_window_secs: self.callback_window_secs,
            skip_min_visits: self.skip_min_visits,
            skip_flag_rate: self.skip_flag_rate,
            skip_clear_engagement_rate: self.skip_clear_engagement_rate,
        }
    }
}
