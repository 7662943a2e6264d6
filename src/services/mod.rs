//! Operations that span several tables and publish change events.
//! Handlers call these; the `db` modules below them never publish.

pub mod claims;
pub mod dashboard;
pub mod help;
pub mod planning;
pub mod recording;

use rusqlite::Connection;

use crate::db::{campaigns::require_campaign, teams::require_member};
use crate::domain::campaign::Campaign;
use crate::domain::team::Role;
use crate::errors::ServerError;

/// Loads a campaign the caller may work on, with the caller's team role.
pub fn campaign_for_member(
    conn: &Connection,
    campaign_id: i64,
    user_id: i64,
) -> Result<(Campaign, Role), ServerError> {
    let campaign = require_campaign(conn, campaign_id)?;
    let role = require_member(conn, campaign.team_id, user_id)?;
    Ok((campaign, role))
}
