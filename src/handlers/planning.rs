use astra::Request;
use serde::Serialize;

use crate::app::{now_unix, AppState};
use crate::errors::ServerError;
use crate::insights::build_prompt;
use crate::request::require_user;
use crate::responses::{json_response, ResultResp};
use crate::services::campaign_for_member;
use crate::services::dashboard::stats_for;
use crate::services::planning::{route_for_campaign, time_of_day};

#[derive(Serialize)]
struct Advice {
    campaign_id: i64,
    advice: String,
}

pub fn route(req: &Request, app: &AppState, campaign_id: i64) -> ResultResp {
    let now = now_unix();
    let user = require_user(app, req.headers(), now)?;
    let params = app.config.route_params();
    let plan = app
        .db
        .with_conn(|conn| route_for_campaign(conn, campaign_id, user.id, now, &params))?;
    json_response(200, &plan)
}

pub fn insights(req: &Request, app: &AppState, campaign_id: i64) -> ResultResp {
    let now = now_unix();
    let user = require_user(app, req.headers(), now)?;
    let cfg = &app.config;
    let report = app.db.with_conn(|conn| {
        time_of_day(conn, campaign_id, user.id, now, cfg.timezone_offset_minutes, cfg.insight_min_samples)
    })?;
    json_response(200, &report)
}

/// Free-text advice from the configured completion endpoint.
pub fn ai_insights(req: &Request, app: &AppState, campaign_id: i64) -> ResultResp {
    let now = now_unix();
    let user = require_user(app, req.headers(), now)?;
    let Some(client) = app.insights.clone() else {
        return Err(ServerError::Unavailable("insights are not configured".into()));
    };
    let cfg = &app.config;
    let params = cfg.route_params();

    let prompt = app.db.with_conn(|conn| {
        let (campaign, _) = campaign_for_member(conn, campaign_id, user.id)?;
        let stats = stats_for(conn, &campaign, cfg.support_unit_cents)?;
        let hours = time_of_day(conn, campaign_id, user.id, now, cfg.timezone_offset_minutes, cfg.insight_min_samples)?;
        let route = route_for_campaign(conn, campaign_id, user.id, now, &params)?;
        Ok(build_prompt(&stats, &hours, &route))
    })?;

    // Network call happens outside the connection borrow.
    let advice = client.advise(&prompt)?;
    tracing::info!(campaign_id, chars = advice.len(), "ai insights generated");
    json_response(200, &Advice { campaign_id, advice })
}
