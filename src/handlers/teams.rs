use astra::Request;
use serde::{Deserialize, Serialize};

use crate::app::{now_unix, AppState};
use crate::auth::magic::MagicLinkService;
use crate::db::campaigns::{create_campaign, create_campaigns, list_for_team};
use crate::db::teams::{add_member, create_team, list_members, require_leader, require_member, teams_for_user};
use crate::domain::campaign::NewCampaign;
use crate::domain::import::parse_campaign_csv;
use crate::domain::team::{Role, Team};
use crate::request::{parse_json, read_body, require_user};
use crate::responses::{json_response, ResultResp};
use crate::services::dashboard::team_dashboard;

#[derive(Deserialize)]
struct NewTeam {
    name: String,
}

#[derive(Serialize)]
struct TeamWithRole {
    #[serde(flatten)]
    team: Team,
    role: Role,
}

#[derive(Deserialize)]
struct NewMember {
    email: String,
    #[serde(default = "volunteer")]
    role: Role,
}

fn volunteer() -> Role {
    Role::Volunteer
}

#[derive(Serialize)]
struct AddedMember {
    user_id: i64,
    email: String,
    role: Role,
}

pub fn list(req: &Request, app: &AppState) -> ResultResp {
    let user = require_user(app, req.headers(), now_unix())?;
    let teams: Vec<TeamWithRole> = app
        .db
        .with_conn(|conn| teams_for_user(conn, user.id))?
        .into_iter()
        .map(|(team, role)| TeamWithRole { team, role })
        .collect();
    json_response(200, &teams)
}

pub fn create(req: Request, app: &AppState) -> ResultResp {
    let now = now_unix();
    let user = require_user(app, req.headers(), now)?;
    let (_, body) = read_body(req, app.config.max_body_bytes)?;
    let input: NewTeam = parse_json(&body)?;

    let team = app.db.with_conn(|conn| create_team(conn, &input.name, user.id, now))?;
    tracing::info!(team_id = team.id, user_id = user.id, "team created");
    json_response(201, &team)
}

pub fn members(req: &Request, app: &AppState, team_id: i64) -> ResultResp {
    let user = require_user(app, req.headers(), now_unix())?;
    let members = app.db.with_conn(|conn| {
        require_member(conn, team_id, user.id)?;
        list_members(conn, team_id)
    })?;
    json_response(200, &members)
}

pub fn add(req: Request, app: &AppState, team_id: i64) -> ResultResp {
    let now = now_unix();
    let user = require_user(app, req.headers(), now)?;
    let (_, body) = read_body(req, app.config.max_body_bytes)?;
    let input: NewMember = parse_json(&body)?;
    let email = MagicLinkService::normalize_email(&input.email)?;

    let user_id = app.db.with_conn(|conn| {
        require_leader(conn, team_id, user.id)?;
        add_member(conn, team_id, &email, input.role, now)
    })?;
    tracing::info!(team_id, user_id, role = input.role.as_str(), "member added");
    json_response(201, &AddedMember { user_id, email, role: input.role })
}

pub fn campaigns(req: &Request, app: &AppState, team_id: i64) -> ResultResp {
    let user = require_user(app, req.headers(), now_unix())?;
    let campaigns = app.db.with_conn(|conn| {
        require_member(conn, team_id, user.id)?;
        list_for_team(conn, team_id)
    })?;
    json_response(200, &campaigns)
}

pub fn create_one(req: Request, app: &AppState, team_id: i64) -> ResultResp {
    let now = now_unix();
    let user = require_user(app, req.headers(), now)?;
    let (_, body) = read_body(req, app.config.max_body_bytes)?;
    let input: NewCampaign = parse_json(&body)?;

    let campaign = app.db.with_conn(|conn| {
        require_leader(conn, team_id, user.id)?;
        create_campaign(conn, team_id, &input, now)
    })?;
    json_response(201, &campaign)
}

/// CSV body. Any row problem rejects the whole file with 422.
pub fn import(req: Request, app: &AppState, team_id: i64) -> ResultResp {
    let now = now_unix();
    let user = require_user(app, req.headers(), now)?;
    app.db.with_conn(|conn| require_leader(conn, team_id, user.id))?;

    let (_, body) = read_body(req, app.config.max_body_bytes)?;
    let inputs = parse_campaign_csv(&body)?;
    let created = app.db.with_conn(|conn| create_campaigns(conn, team_id, &inputs, now))?;
    json_response(201, &created)
}

pub fn dashboard(req: &Request, app: &AppState, team_id: i64) -> ResultResp {
    let user = require_user(app, req.headers(), now_unix())?;
    let unit = app.config.support_unit_cents;
    let dash = app.db.with_conn(|conn| team_dashboard(conn, team_id, user.id, unit))?;
    json_response(200, &dash)
}
