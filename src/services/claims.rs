// src/services/claims.rs
use rusqlite::{Connection, TransactionBehavior};
use serde::Serialize;

use crate::db::claims as db_claims;
use crate::db::users::get_profile;
use crate::domain::campaign::CampaignKind;
use crate::domain::claims::{decide_claim, floor_statuses, ClaimDecision, FloorClaim, FloorStatus};
use crate::errors::ServerError;
use crate::events::{ChangeHub, ChangeKind};
use crate::services::campaign_for_member;

/// A claim as shown to viewers, with its lazily computed liveness.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClaimView {
    #[serde(flatten)]
    pub claim: FloorClaim,
    pub active: bool,
    pub expires_at: i64,
}

pub struct ClaimService {
    expiry_secs: i64,
    hub: ChangeHub,
}

impl ClaimService {
    pub fn new(expiry_secs: i64, hub: ChangeHub) -> Self {
        Self { expiry_secs, hub }
    }

    /// Claims a floor for `user_id`.
    ///
    /// Runs in an immediate transaction so the read of the current row and the
    /// write that follows see the same state. A stale claim is replaced; an
    /// active claim by someone else is a `Conflict` and nothing changes.
    pub fn claim(
        &self,
        conn: &mut Connection,
        campaign_id: i64,
        floor: i64,
        user_id: i64,
        now: i64,
    ) -> Result<FloorClaim, ServerError> {
        let (campaign, _) = campaign_for_member(conn, campaign_id, user_id)?;
        if campaign.kind == CampaignKind::Corporate {
            return Err(ServerError::BadRequest("corporate campaigns have no floors".into()));
        }
        if !(1..=campaign.floors).contains(&floor) {
            return Err(ServerError::BadRequest(format!(
                "floor must be between 1 and {}",
                campaign.floors
            )));
        }

        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let existing = db_claims::claim_for_floor(&tx, campaign_id, floor)?;
        let mut events = Vec::new();

        let claim = match decide_claim(existing.as_ref(), user_id, now, self.expiry_secs) {
            ClaimDecision::Insert => {
                let claim = db_claims::insert_claim(&tx, campaign_id, floor, user_id, now)?;
                events.push(ChangeKind::ClaimInserted { claim: claim.clone() });
                claim
            }
            ClaimDecision::Refresh { claim_id } => {
                db_claims::touch_claim(&tx, claim_id, now)?;
                let claim = db_claims::get_claim(&tx, claim_id)?.ok_or(ServerError::NotFound)?;
                events.push(ChangeKind::ClaimUpdated { claim: claim.clone() });
                claim
            }
            ClaimDecision::ReplaceStale { claim_id } => {
                db_claims::delete_claim(&tx, claim_id)?;
                events.push(ChangeKind::ClaimDeleted { claim_id, floor });
                let claim = db_claims::insert_claim(&tx, campaign_id, floor, user_id, now)?;
                events.push(ChangeKind::ClaimInserted { claim: claim.clone() });
                claim
            }
            ClaimDecision::Reject { holder } => {
                let who = get_profile(&tx, holder)?
                    .map(|p| p.shown_name().to_string())
                    .unwrap_or_else(|| "another volunteer".to_string());
                tracing::info!(campaign_id, floor, user_id, holder, "claim rejected");
                return Err(ServerError::Conflict(format!(
                    "floor {floor} is already claimed by {who}"
                )));
            }
        };
        tx.commit()?;

        for kind in events {
            self.hub.publish(campaign_id, kind);
        }
        tracing::info!(campaign_id, floor, user_id, claim_id = claim.id, "floor claimed");
        Ok(claim)
    }

    /// Releases a claim. Only its holder or a team leader may do this.
    pub fn release(&self, conn: &Connection, claim_id: i64, user_id: i64) -> Result<(), ServerError> {
        let claim = db_claims::get_claim(conn, claim_id)?.ok_or(ServerError::NotFound)?;
        let (_, role) = campaign_for_member(conn, claim.campaign_id, user_id)?;
        if claim.user_id != user_id && !role.is_leader() {
            return Err(ServerError::Forbidden(
                "only the claimant or a team leader can release this floor".into(),
            ));
        }

        db_claims::delete_claim(conn, claim_id)?;
        self.hub.publish(
            claim.campaign_id,
            ChangeKind::ClaimDeleted { claim_id, floor: claim.floor },
        );
        tracing::info!(campaign_id = claim.campaign_id, floor = claim.floor, user_id, "floor released");
        Ok(())
    }

    pub fn list(
        &self,
        conn: &Connection,
        campaign_id: i64,
        user_id: i64,
        now: i64,
    ) -> Result<Vec<ClaimView>, ServerError> {
        campaign_for_member(conn, campaign_id, user_id)?;
        Ok(db_claims::list_claims(conn, campaign_id)?
            .into_iter()
            .map(|claim| ClaimView {
                active: claim.is_active(now, self.expiry_secs),
                expires_at: claim.expires_at(self.expiry_secs),
                claim,
            })
            .collect())
    }

    /// One entry per floor, top floor first.
    pub fn list_status(
        &self,
        conn: &Connection,
        campaign_id: i64,
        user_id: i64,
        now: i64,
    ) -> Result<Vec<FloorStatus>, ServerError> {
        let (campaign, _) = campaign_for_member(conn, campaign_id, user_id)?;
        let claims = db_claims::list_claims(conn, campaign_id)?;
        Ok(floor_statuses(campaign.floors, &claims, now, self.expiry_secs))
    }

    /// Bumps the caller's own claim on a floor after activity there.
    /// Returns the refreshed claim, or `None` if the caller holds no claim on it.
    /// Does not publish; the caller does that once its transaction commits.
    pub fn refresh_own(
        conn: &Connection,
        campaign_id: i64,
        floor: i64,
        user_id: i64,
        now: i64,
    ) -> Result<Option<FloorClaim>, ServerError> {
        match db_claims::claim_for_floor(conn, campaign_id, floor)? {
            Some(mut claim) if claim.user_id == user_id => {
                db_claims::touch_claim(conn, claim.id, now)?;
                claim.last_activity_at = now;
                Ok(Some(claim))
            }
            _ => Ok(None),
        }
    }
}
