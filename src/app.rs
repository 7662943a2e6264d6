// src/app.rs
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::auth::magic::MagicLinkConfig;
use crate::config::Config;
use crate::db::connection::Database;
use crate::events::ChangeHub;
use crate::insights::InsightsClient;
use crate::mailer::BrevoMailer;
use crate::services::claims::ClaimService;
use crate::services::help::HelpService;
use crate::services::recording::RecordingService;

/// Shared by every worker thread.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub config: Arc<Config>,
    pub hub: ChangeHub,
    pub mailer: Option<Arc<BrevoMailer>>,
    pub insights: Option<Arc<InsightsClient>>,
}

impl AppState {
    pub fn new(db: Database, config: Config) -> Self {
        let mailer = config.brevo_api_key.as_ref().map(|key| {
            Arc::new(BrevoMailer::new(
                key.clone(),
                config.sender_email.clone(),
                config.sender_name.clone(),
            ))
        });
        let insights = config.insights_url.as_ref().map(|url| {
            Arc::new(InsightsClient::new(
                url.clone(),
                config.insights_api_key.clone(),
                config.insights_model.clone(),
            ))
        });
        Self { db, config: Arc::new(config), hub: ChangeHub::new(), mailer, insights }
    }

    pub fn claims(&self) -> ClaimService {
        ClaimService::new(self.config.claim_expiry_secs, self.hub.clone())
    }

    pub fn recording(&self) -> RecordingService {
        RecordingService::new(self.config.undo_window_secs, self.hub.clone())
    }

    pub fn help(&self) -> HelpService {
        HelpService::new(self.hub.clone())
    }

    pub fn magic_link_config(&self) -> MagicLinkConfig {
        MagicLinkConfig {
            ttl_secs: self.config.magic_link_ttl_secs,
            base_url: Some(self.config.public_base_url.clone()),
            ..MagicLinkConfig::default()
        }
    }
}

pub fn now_unix() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}
