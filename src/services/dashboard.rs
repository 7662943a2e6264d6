// src/services/dashboard.rs
use rusqlite::Connection;
use serde::Serialize;

use crate::db::businesses::list_businesses;
use crate::db::campaigns::list_for_team;
use crate::db::rooms::list_rooms;
use crate::db::teams::{get_team, require_leader};
use crate::db::visits::leaderboard;
use crate::domain::campaign::{Campaign, Room};
use crate::domain::stats::{
    campaign_stats, floor_breakdown, team_totals, CampaignStats, FloorBreakdown, LeaderboardEntry,
};
use crate::domain::status::VisitStatus;
use crate::domain::team::Team;
use crate::errors::ServerError;

#[derive(Debug, Clone, Serialize)]
pub struct TeamDashboard {
    pub team: Team,
    pub campaigns: Vec<CampaignStats>,
    pub totals: CampaignStats,
    pub leaderboard: Vec<LeaderboardEntry>,
}

/// Everything the printable report shows for one campaign.
#[derive(Debug, Clone, Serialize)]
pub struct CampaignReport {
    pub campaign: Campaign,
    pub stats: CampaignStats,
    pub floors: Vec<FloorBreakdown>,
    pub donations: Vec<Room>,
}

pub fn stats_for(conn: &Connection, campaign: &Campaign, support_unit_cents: i64) -> Result<CampaignStats, ServerError> {
    let rooms = list_rooms(conn, campaign.id)?;
    let businesses = list_businesses(conn, campaign.id)?;
    Ok(campaign_stats(campaign, &rooms, &businesses, support_unit_cents))
}

/// Leader-only overview of a team's campaigns and volunteers.
pub fn team_dashboard(
    conn: &Connection,
    team_id: i64,
    user_id: i64,
    support_unit_cents: i64,
) -> Result<TeamDashboard, ServerError> {
    let team = get_team(conn, team_id)?.ok_or(ServerError::NotFound)?;
    require_leader(conn, team_id, user_id)?;

    let campaigns = list_for_team(conn, team_id)?
        .iter()
        .map(|c| stats_for(conn, c, support_unit_cents))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(TeamDashboard {
        totals: team_totals(&campaigns),
        leaderboard: leaderboard(conn, team_id)?,
        team,
        campaigns,
    })
}

pub fn campaign_report(
    conn: &Connection,
    campaign: Campaign,
    support_unit_cents: i64,
) -> Result<CampaignReport, ServerError> {
    let rooms = list_rooms(conn, campaign.id)?;
    let businesses = list_businesses(conn, campaign.id)?;
    let stats = campaign_stats(&campaign, &rooms, &businesses, support_unit_cents);
    let floors = floor_breakdown(campaign.floors, &rooms);
    let donations = rooms
        .into_iter()
        .filter(|r| r.status == VisitStatus::Donated)
        .collect();
    Ok(CampaignReport { campaign, stats, floors, donations })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::businesses::{add_business, update_business};
    use crate::db::teams::add_member;
    use crate::db::test_conn;
    use crate::db::test_support::{seed_building, seed_corporate, seed_team};
    use crate::domain::campaign::{BusinessUpdate, StatusUpdate, MAX_AMOUNT_CENTS, MAX_SUPPORTS};
    use crate::domain::team::Role;
    use crate::events::ChangeHub;
    use crate::services::recording::RecordingService;

    #[test]
    fn dashboard_totals_rooms_and_supports() {
        let mut conn = test_conn();
        let (team, lead) = seed_team(&mut conn);
        let vol = add_member(&conn, team, "vol@example.com", Role::Volunteer, 1).unwrap();
        let building = seed_building(&mut conn, team, 1, 4);
        let offices = seed_corporate(&mut conn, team);

        let rec = RecordingService::new(10, ChangeHub::new());
        let room = list_rooms(&conn, building.id).unwrap()[0].id;
        let upd = StatusUpdate { status: VisitStatus::Donated, note: None, donation_cents: 2_500, callback_at: None };
        rec.record_room_status(&mut conn, room, vol, &upd, 10).unwrap();

        let b = add_business(&conn, offices.id, "Acme", None).unwrap();
        let bu = BusinessUpdate { status: VisitStatus::Donated, note: None, supports: 2, callback_at: None };
        update_business(&conn, b.id, &bu, lead, 10).unwrap();

        let dash = team_dashboard(&conn, team, lead, 5_000).unwrap();
        assert_eq!(dash.campaigns.len(), 2);
        assert_eq!(dash.totals.raised_cents, 12_500);
        assert_eq!(dash.totals.units, 5);
        assert_eq!(dash.leaderboard[0].user_id, vol);

        assert!(matches!(team_dashboard(&conn, team, vol, 5_000), Err(ServerError::Forbidden(_))));

        let report = campaign_report(&conn, building, 5_000).unwrap();
        assert_eq!(report.donations.len(), 1);
        assert_eq!(report.floors.len(), 1);
    }

    #[test]
    fn largest_accepted_values_still_total() {
        let mut conn = test_conn();
        let (team, lead) = seed_team(&mut conn);
        let building = seed_building(&mut conn, team, 2, 2);
        let offices = seed_corporate(&mut conn, team);

        let rec = RecordingService::new(10, ChangeHub::new());
        let upd = StatusUpdate { status: VisitStatus::Donated, note: None, donation_cents: MAX_AMOUNT_CENTS, callback_at: None };
        for room in list_rooms(&conn, building.id).unwrap() {
            rec.record_room_status(&mut conn, room.id, lead, &upd, 10).unwrap();
        }

        let b = add_business(&conn, offices.id, "Acme", None).unwrap();
        let too_many = BusinessUpdate { status: VisitStatus::Donated, note: None, supports: 10_000_000_000_000_000, callback_at: None };
        assert!(matches!(update_business(&conn, b.id, &too_many, lead, 10), Err(ServerError::BadRequest(_))));
        let most = BusinessUpdate { supports: MAX_SUPPORTS, ..too_many };
        update_business(&conn, b.id, &most, lead, 10).unwrap();

        let dash = team_dashboard(&conn, team, lead, 5_000).unwrap();
        assert_eq!(dash.totals.raised_cents, 4 * MAX_AMOUNT_CENTS + MAX_SUPPORTS * 5_000);
        assert_eq!(dash.leaderboard[0].raised_cents, 4 * MAX_AMOUNT_CENTS);
    }
}
