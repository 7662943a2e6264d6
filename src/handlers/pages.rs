use std::collections::HashMap;

use astra::Request;

use crate::app::{now_unix, AppState};
use crate::db::businesses::list_businesses;
use crate::db::campaigns::list_for_team;
use crate::db::rooms::list_rooms;
use crate::db::teams::{list_members, teams_for_user};
use crate::db::visits::leaderboard;
use crate::domain::campaign::{Business, Campaign, CampaignKind, Room};
use crate::domain::stats::{campaign_stats, team_totals, CampaignStats};
use crate::errors::ServerError;
use crate::handlers::file_stem;
use crate::request::current_user;
use crate::responses::{csv_response, html_response, redirect_response, xlsx_response, ResultResp};
use crate::services::campaign_for_member;
use crate::services::dashboard::{campaign_report, stats_for};
use crate::services::planning::route_for_campaign;
use crate::spreadsheets::{campaign_csv, export_campaign_xlsx};
use crate::templates::pages::{
    campaign_page, dashboard_page, home_page, login_page, report_page, CampaignVm, DashboardVm, TeamCard,
};

pub fn home(req: &Request, app: &AppState) -> ResultResp {
    let user = current_user(app, req.headers(), now_unix())?;
    html_response(home_page(user.as_ref().map(|u| u.shown_name())))
}

pub fn login() -> ResultResp {
    html_response(login_page())
}

pub fn dashboard(req: &Request, app: &AppState) -> ResultResp {
    let Some(user) = current_user(app, req.headers(), now_unix())? else {
        return redirect_response("/login", None);
    };
    let unit = app.config.support_unit_cents;

    let teams = app.db.with_conn(|conn| {
        let mut cards = Vec::new();
        for (team, role) in teams_for_user(conn, user.id)? {
            let mut campaigns = Vec::new();
            for campaign in list_for_team(conn, team.id)? {
                let stats = stats_for(conn, &campaign, unit)?;
                campaigns.push((campaign, stats));
            }
            let (totals, board) = if role.is_leader() {
                let all: Vec<CampaignStats> = campaigns.iter().map(|(_, s)| s.clone()).collect();
                (Some(team_totals(&all)), leaderboard(conn, team.id)?)
            } else {
                (None, Vec::new())
            };
            cards.push(TeamCard { team, role, campaigns, totals, leaderboard: board });
        }
        Ok(cards)
    })?;

    html_response(dashboard_page(&DashboardVm {
        name: user.shown_name().to_string(),
        email: user.email.clone(),
        teams,
    }))
}

pub fn campaign(req: &Request, app: &AppState, campaign_id: i64) -> ResultResp {
    let now = now_unix();
    let Some(user) = current_user(app, req.headers(), now)? else {
        return redirect_response("/login", None);
    };
    let claims = app.claims();
    let params = app.config.route_params();
    let unit = app.config.support_unit_cents;

    let vm = app.db.with_conn(|conn| {
        let (campaign, role) = campaign_for_member(conn, campaign_id, user.id)?;
        let rooms = list_rooms(conn, campaign.id)?;
        let businesses = list_businesses(conn, campaign.id)?;
        let stats = campaign_stats(&campaign, &rooms, &businesses, unit);

        let (floors, route) = match campaign.kind {
            CampaignKind::Residential => (
                claims.list_status(conn, campaign.id, user.id, now)?,
                Some(route_for_campaign(conn, campaign.id, user.id, now, &params)?),
            ),
            CampaignKind::Corporate => (Vec::new(), None),
        };

        let names: HashMap<i64, String> = list_members(conn, campaign.team_id)?
            .into_iter()
            .map(|m| (m.user_id, m.shown_name().to_string()))
            .collect();

        Ok(CampaignVm {
            viewer_name: user.shown_name().to_string(),
            viewer_id: user.id,
            is_leader: role.is_leader(),
            campaign,
            stats,
            rooms,
            floors,
            route,
            businesses,
            names,
            tz_offset_minutes: app.config.timezone_offset_minutes,
        })
    })?;

    html_response(campaign_page(&vm))
}

pub fn report(req: &Request, app: &AppState, campaign_id: i64) -> ResultResp {
    let now = now_unix();
    let Some(user) = current_user(app, req.headers(), now)? else {
        return redirect_response("/login", None);
    };
    let unit = app.config.support_unit_cents;
    let report = app.db.with_conn(|conn| {
        let (campaign, _) = campaign_for_member(conn, campaign_id, user.id)?;
        campaign_report(conn, campaign, unit)
    })?;
    html_response(report_page(&report, now, app.config.timezone_offset_minutes))
}

type ExportData = (Campaign, Vec<Room>, Vec<Business>);

fn export_data(req: &Request, app: &AppState, campaign_id: i64) -> Result<Option<ExportData>, ServerError> {
    let Some(user) = current_user(app, req.headers(), now_unix())? else {
        return Ok(None);
    };
    app.db
        .with_conn(|conn| {
            let (campaign, _) = campaign_for_member(conn, campaign_id, user.id)?;
            let rooms = list_rooms(conn, campaign.id)?;
            let businesses = list_businesses(conn, campaign.id)?;
            Ok((campaign, rooms, businesses))
        })
        .map(Some)
}

pub fn export_csv(req: &Request, app: &AppState, campaign_id: i64) -> ResultResp {
    let Some((campaign, rooms, businesses)) = export_data(req, app, campaign_id)? else {
        return redirect_response("/login", None);
    };
    let bytes = campaign_csv(&campaign, &rooms, &businesses)?;
    csv_response(bytes, &format!("{}.csv", file_stem(&campaign.name)))
}

pub fn export_xlsx(req: &Request, app: &AppState, campaign_id: i64) -> ResultResp {
    let Some((campaign, rooms, businesses)) = export_data(req, app, campaign_id)? else {
        return redirect_response("/login", None);
    };
    let stats = campaign_stats(&campaign, &rooms, &businesses, app.config.support_unit_cents);
    let bytes = export_campaign_xlsx(&campaign, &stats, &rooms, &businesses)?;
    tracing::info!(campaign_id, bytes = bytes.len(), "workbook exported");
    xlsx_response(bytes, &format!("{}.xlsx", file_stem(&campaign.name)))
}
