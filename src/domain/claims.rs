// src/domain/claims.rs

use serde::Serialize;

/// A volunteer's soft lock on one floor of a campaign.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FloorClaim {
    pub id: i64,
    pub campaign_id: i64,
    pub floor: i64,
    pub user_id: i64,
    pub claimed_at: i64,
    pub last_activity_at: i64,
}

impl FloorClaim {
    /// Expiry is lazy: a claim is only reinterpreted as inactive when read.
    pub fn is_active(&self, now: i64, expiry_secs: i64) -> bool {
        now - self.last_activity_at < expiry_secs
    }

    pub fn expires_at(&self, expiry_secs: i64) -> i64 {
        self.last_activity_at + expiry_secs
    }
}

/// What a claim attempt does, given the row currently stored for the floor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClaimDecision {
    /// No row: insert a fresh claim.
    Insert,
    /// The caller already holds it: bump `last_activity_at`.
    Refresh { claim_id: i64 },
    /// Someone's claim went stale: drop it, then insert.
    ReplaceStale { claim_id: i64 },
    /// Someone else holds an active claim.
    Reject { holder: i64 },
}

pub fn decide_claim(
    existing: Option<&FloorClaim>,
    user_id: i64,
    now: i64,
    expiry_secs: i64,
) -> ClaimDecision {
    match existing {
        None => ClaimDecision::Insert,
        Some(c) if !c.is_active(now, expiry_secs) => ClaimDecision::ReplaceStale { claim_id: c.id },
        Some(c) if c.user_id == user_id => ClaimDecision::Refresh { claim_id: c.id },
        Some(c) => ClaimDecision::Reject { holder: c.user_id },
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum FloorState {
    Unclaimed,
    Claimed {
        claim_id: i64,
        user_id: i64,
        active: bool,
        expires_at: i64,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FloorStatus {
    pub floor: i64,
    #[serde(flatten)]
    pub state: FloorState,
}

/// One entry per floor, top floor first.
pub fn floor_statuses(
    floors: i64,
    claims: &[FloorClaim],
    now: i64,
    expiry_secs: i64,
) -> Vec<FloorStatus> {
    (1..=floors)
        .rev()
        .map(|floor| {
            let state = match claims.iter().find(|c| c.floor == floor) {
                Some(c) => FloorState::Claimed {
                    claim_id: c.id,
                    user_id: c.user_id,
                    active: c.is_active(now, expiry_secs),
                    expires_at: c.expires_at(expiry_secs),
                },
                None => FloorState::Unclaimed,
            };
            FloorStatus { floor, state }
        })
        .collect()
}
