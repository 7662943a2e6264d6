use std::time::Duration;

use astra::Request;
use serde::{Deserialize, Serialize};

use crate::app::{now_unix, AppState};
use crate::errors::ServerError;
use crate::events::ChangeEvent;
use crate::request::{parse_json, parse_query, read_body, require_user};
use crate::responses::{json_response, no_content, ResultResp};
use crate::services::campaign_for_member;

#[derive(Deserialize)]
struct NewHelpRequest {
    #[serde(default)]
    floor: Option<i64>,
    message: String,
}

#[derive(Serialize)]
struct EventBatch {
    /// Pass back as `since` on the next poll.
    seq: u64,
    events: Vec<ChangeEvent>,
}

pub fn claims(req: &Request, app: &AppState, campaign_id: i64) -> ResultResp {
    let now = now_unix();
    let user = require_user(app, req.headers(), now)?;
    let claims = app.claims();
    let list = app.db.with_conn(|conn| claims.list(conn, campaign_id, user.id, now))?;
    json_response(200, &list)
}

pub fn floors(req: &Request, app: &AppState, campaign_id: i64) -> ResultResp {
    let now = now_unix();
    let user = require_user(app, req.headers(), now)?;
    let claims = app.claims();
    let list = app.db.with_conn(|conn| claims.list_status(conn, campaign_id, user.id, now))?;
    json_response(200, &list)
}

pub fn claim_floor(req: &Request, app: &AppState, campaign_id: i64, floor: i64) -> ResultResp {
    let now = now_unix();
    let user = require_user(app, req.headers(), now)?;
    let claims = app.claims();
    let claim = app.db.with_conn(|conn| claims.claim(conn, campaign_id, floor, user.id, now))?;
    json_response(200, &claim)
}

pub fn release(req: &Request, app: &AppState, claim_id: i64) -> ResultResp {
    let user = require_user(app, req.headers(), now_unix())?;
    let claims = app.claims();
    app.db.with_conn(|conn| claims.release(conn, claim_id, user.id))?;
    no_content()
}

/// Long poll. Returns queued events after `since` at once, otherwise waits
/// up to `wait` seconds (capped by config) for the next one.
pub fn events(req: &Request, app: &AppState, campaign_id: i64) -> ResultResp {
    let user = require_user(app, req.headers(), now_unix())?;
    app.db.with_conn(|conn| campaign_for_member(conn, campaign_id, user.id))?;

    let query = parse_query(req.uri().query());
    let since = match query.get("since") {
        Some(s) => s
            .parse::<u64>()
            .map_err(|_| ServerError::BadRequest("since must be a sequence number".into()))?,
        None => app.hub.current_seq(campaign_id),
    };
    let wait = match query.get("wait") {
        Some(s) => s
            .parse::<u64>()
            .map_err(|_| ServerError::BadRequest("wait must be a number of seconds".into()))?,
        None => app.config.max_poll_secs,
    }
    .min(app.config.max_poll_secs);

    let (mut events, rx) = app.hub.subscribe_since(campaign_id, since);
    if events.is_empty() && wait > 0 {
        if let Ok(first) = rx.recv_timeout(Duration::from_secs(wait)) {
            events.push(first);
            events.extend(rx.try_iter());
        }
    }

    let seq = events.last().map(|e| e.seq).unwrap_or(since);
    json_response(200, &EventBatch { seq, events })
}

pub fn help_requests(req: &Request, app: &AppState, campaign_id: i64) -> ResultResp {
    let user = require_user(app, req.headers(), now_unix())?;
    let help = app.help();
    let open = app.db.with_conn(|conn| help.list_open(conn, campaign_id, user.id))?;
    json_response(200, &open)
}

pub fn raise_help(req: Request, app: &AppState, campaign_id: i64) -> ResultResp {
    let now = now_unix();
    let user = require_user(app, req.headers(), now)?;
    let (_, body) = read_body(req, app.config.max_body_bytes)?;
    let input: NewHelpRequest = parse_json(&body)?;

    let help = app.help();
    let raised = app
        .db
        .with_conn(|conn| help.raise(conn, campaign_id, input.floor, user.id, &input.message, now))?;
    json_response(201, &raised)
}

pub fn resolve_help(req: &Request, app: &AppState, help_request_id: i64) -> ResultResp {
    let now = now_unix();
    let user = require_user(app, req.headers(), now)?;
    let help = app.help();
    let resolved = app.db.with_conn(|conn| help.resolve(conn, help_request_id, user.id, now))?;
    json_response(200, &resolved)
}
