use astra::Request;
use serde::{Deserialize, Serialize};

use crate::app::{now_unix, AppState};
use crate::db::businesses::{add_business, list_businesses};
use crate::db::campaigns::{delete_campaign, list_for_user};
use crate::db::rooms::list_rooms;
use crate::domain::campaign::{BusinessUpdate, Campaign, CampaignKind, StatusUpdate};
use crate::domain::geo::nearest;
use crate::domain::stats::CampaignStats;
use crate::domain::team::Role;
use crate::errors::ServerError;
use crate::events::ChangeKind;
use crate::request::{parse_json, parse_query, read_body, require_user};
use crate::responses::{json_response, no_content, ResultResp};
use crate::services::campaign_for_member;
use crate::services::dashboard::stats_for;

const NEARBY_LIMIT: usize = 10;

#[derive(Serialize)]
struct CampaignDetail {
    campaign: Campaign,
    stats: CampaignStats,
    role: Role,
}

#[derive(Deserialize)]
struct NewBusiness {
    name: String,
    #[serde(default)]
    contact_name: Option<String>,
}

pub fn get(req: &Request, app: &AppState, campaign_id: i64) -> ResultResp {
    let user = require_user(app, req.headers(), now_unix())?;
    let unit = app.config.support_unit_cents;
    let detail = app.db.with_conn(|conn| {
        let (campaign, role) = campaign_for_member(conn, campaign_id, user.id)?;
        let stats = stats_for(conn, &campaign, unit)?;
        Ok(CampaignDetail { campaign, stats, role })
    })?;
    json_response(200, &detail)
}

pub fn delete(req: &Request, app: &AppState, campaign_id: i64) -> ResultResp {
    let user = require_user(app, req.headers(), now_unix())?;
    app.db.with_conn(|conn| {
        let (_, role) = campaign_for_member(conn, campaign_id, user.id)?;
        if !role.is_leader() {
            return Err(ServerError::Forbidden("team leader role required".into()));
        }
        delete_campaign(conn, campaign_id)
    })?;
    app.hub.remove(campaign_id);
    no_content()
}

fn coordinate(query: &std::collections::HashMap<String, String>, key: &str, bound: f64) -> Result<f64, ServerError> {
    let value: f64 = query
        .get(key)
        .ok_or_else(|| ServerError::BadRequest(format!("{key} is required")))?
        .parse()
        .map_err(|_| ServerError::BadRequest(format!("{key} must be a number")))?;
    if !(-bound..=bound).contains(&value) {
        return Err(ServerError::BadRequest(format!("{key} must be within ±{bound}")));
    }
    Ok(value)
}

/// Campaigns of the caller's teams, closest to `lat`/`lon` first.
pub fn nearby(req: &Request, app: &AppState) -> ResultResp {
    let user = require_user(app, req.headers(), now_unix())?;
    let query = parse_query(req.uri().query());
    let lat = coordinate(&query, "lat", 90.0)?;
    let lon = coordinate(&query, "lon", 180.0)?;

    let campaigns = app.db.with_conn(|conn| list_for_user(conn, user.id))?;
    json_response(200, &nearest(campaigns, lat, lon, NEARBY_LIMIT))
}

pub fn rooms(req: &Request, app: &AppState, campaign_id: i64) -> ResultResp {
    let user = require_user(app, req.headers(), now_unix())?;
    let rooms = app.db.with_conn(|conn| {
        campaign_for_member(conn, campaign_id, user.id)?;
        list_rooms(conn, campaign_id)
    })?;
    json_response(200, &rooms)
}

pub fn record_status(req: Request, app: &AppState, room_id: i64) -> ResultResp {
    let now = now_unix();
    let user = require_user(app, req.headers(), now)?;
    let (_, body) = read_body(req, app.config.max_body_bytes)?;
    let update: StatusUpdate = parse_json(&body)?;

    let recording = app.recording();
    let recorded = app
        .db
        .with_conn(|conn| recording.record_room_status(conn, room_id, user.id, &update, now))?;
    json_response(200, &recorded)
}

pub fn undo(req: &Request, app: &AppState, change_id: i64) -> ResultResp {
    let now = now_unix();
    let user = require_user(app, req.headers(), now)?;
    let recording = app.recording();
    let room = app.db.with_conn(|conn| recording.undo(conn, change_id, user.id, now))?;
    json_response(200, &room)
}

pub fn businesses(req: &Request, app: &AppState, campaign_id: i64) -> ResultResp {
    let user = require_user(app, req.headers(), now_unix())?;
    let list = app.db.with_conn(|conn| {
        campaign_for_member(conn, campaign_id, user.id)?;
        list_businesses(conn, campaign_id)
    })?;
    json_response(200, &list)
}

pub fn add_business_to(req: Request, app: &AppState, campaign_id: i64) -> ResultResp {
    let now = now_unix();
    let user = require_user(app, req.headers(), now)?;
    let (_, body) = read_body(req, app.config.max_body_bytes)?;
    let input: NewBusiness = parse_json(&body)?;

    let business = app.db.with_conn(|conn| {
        let (campaign, _) = campaign_for_member(conn, campaign_id, user.id)?;
        if campaign.kind != CampaignKind::Corporate {
            return Err(ServerError::BadRequest("businesses belong to corporate campaigns".into()));
        }
        add_business(conn, campaign_id, &input.name, input.contact_name.as_deref())
    })?;
    app.hub
        .publish(campaign_id, ChangeKind::BusinessUpdated { business: business.clone() });
    json_response(201, &business)
}

pub fn record_business(req: Request, app: &AppState, business_id: i64) -> ResultResp {
    let now = now_unix();
    let user = require_user(app, req.headers(), now)?;
    let (_, body) = read_body(req, app.config.max_body_bytes)?;
    let update: BusinessUpdate = parse_json(&body)?;

    let recording = app.recording();
    let business = app
        .db
        .with_conn(|conn| recording.record_business(conn, business_id, user.id, &update, now))?;
    json_response(200, &business)
}
