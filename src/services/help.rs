// src/services/help.rs
use rusqlite::Connection;

use crate::db::help_requests::{self, HelpRequest};
use crate::errors::ServerError;
use crate::events::{ChangeHub, ChangeKind};
use crate::services::campaign_for_member;

pub struct HelpService {
    hub: ChangeHub,
}

impl HelpService {
    pub fn new(hub: ChangeHub) -> Self {
        Self { hub }
    }

    pub fn raise(
        &self,
        conn: &Connection,
        campaign_id: i64,
        floor: Option<i64>,
        user_id: i64,
        message: &str,
        now: i64,
    ) -> Result<HelpRequest, ServerError> {
        let (campaign, _) = campaign_for_member(conn, campaign_id, user_id)?;
        if let Some(f) = floor {
            if !(1..=campaign.floors).contains(&f) {
                return Err(ServerError::BadRequest(format!("no floor {f} in this building")));
            }
        }
        let req = help_requests::create_help_request(conn, campaign_id, floor, user_id, message, now)?;
        self.hub.publish(
            campaign_id,
            ChangeKind::HelpRequested { help_request_id: req.id, floor },
        );
        tracing::info!(campaign_id, ?floor, user_id, help_request_id = req.id, "help requested");
        Ok(req)
    }

    pub fn list_open(&self, conn: &Connection, campaign_id: i64, user_id: i64) -> Result<Vec<HelpRequest>, ServerError> {
        let (_, role) = campaign_for_member(conn, campaign_id, user_id)?;
        if !role.is_leader() {
            return Err(ServerError::Forbidden("team leader role required".into()));
        }
        help_requests::list_open(conn, campaign_id)
    }

    pub fn resolve(&self, conn: &Connection, id: i64, user_id: i64, now: i64) -> Result<HelpRequest, ServerError> {
        let req = help_requests::get_help_request(conn, id)?.ok_or(ServerError::NotFound)?;
        let (_, role) = campaign_for_member(conn, req.campaign_id, user_id)?;
        if !role.is_leader() {
            return Err(ServerError::Forbidden("team leader role required".into()));
        }
        let resolved = help_requests::resolve(conn, id, user_id, now)?;
        self.hub.publish(resolved.campaign_id, ChangeKind::HelpResolved { help_request_id: id });
        Ok(resolved)
    }
}
