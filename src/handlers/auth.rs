use astra::Request;
use serde::Deserialize;

use crate::app::{now_unix, AppState};
use crate::auth::sessions::revoke_session;
use crate::db::magic_auth::{redeem_magic_link, request_magic_link};
use crate::db::users::{get_profile, set_display_name};
use crate::errors::ServerError;
use crate::request::{parse_form, parse_json, parse_query, read_body, require_user, session_token, SESSION_COOKIE};
use crate::responses::{html_response, json_response, redirect_response, ResultResp};
use crate::templates::pages::check_email_content;

#[derive(Deserialize)]
struct ProfileUpdate {
    display_name: String,
}

/// htmx form target: issues a link and swaps in the "check your email" partial.
pub fn request_link(req: Request, app: &AppState) -> ResultResp {
    let (_, body) = read_body(req, app.config.max_body_bytes)?;
    let form = parse_form(&body);
    let email = form.get("email").map(String::as_str).unwrap_or("");

    let issued = request_magic_link(&app.db, app.magic_link_config(), email, now_unix())?;
    let ttl_minutes = app.config.magic_link_ttl_secs / 60;

    match &app.mailer {
        Some(mailer) => mailer
            .send_magic_link(&issued.email, &issued.link, ttl_minutes)
            .map_err(|e| ServerError::Upstream(e.to_string()))?,
        None => tracing::info!(email = %issued.email, link = %issued.link, "mailer not configured, magic link logged"),
    }

    html_response(check_email_content(&issued.email))
}

pub fn magic(req: &Request, app: &AppState) -> ResultResp {
    let query = parse_query(req.uri().query());
    let token = query.get("token").map(String::as_str).unwrap_or("");
    let ttl = app.config.session_ttl_secs;

    let (redeemed, session) = redeem_magic_link(&app.db, app.magic_link_config(), token, now_unix(), ttl)?;
    tracing::info!(user_id = redeemed.user_id, email = %redeemed.email, "signed in");

    let cookie = format!("{SESSION_COOKIE}={session}; HttpOnly; Path=/; SameSite=Lax; Max-Age={ttl}");
    redirect_response("/dashboard", Some(cookie))
}

pub fn logout(req: &Request, app: &AppState) -> ResultResp {
    if let Some(token) = session_token(req.headers()) {
        app.db.with_conn(|conn| revoke_session(conn, &token, now_unix()))?;
    }
    let cleared = format!("{SESSION_COOKIE}=; HttpOnly; Path=/; SameSite=Lax; Max-Age=0");
    redirect_response("/", Some(cleared))
}

pub fn me(req: &Request, app: &AppState) -> ResultResp {
    let user = require_user(app, req.headers(), now_unix())?;
    let profile = app
        .db
        .with_conn(|conn| get_profile(conn, user.id))?
        .ok_or(ServerError::NotFound)?;
    json_response(200, &profile)
}

pub fn update_me(req: Request, app: &AppState) -> ResultResp {
    let user = require_user(app, req.headers(), now_unix())?;
    let (_, body) = read_body(req, app.config.max_body_bytes)?;
    let update: ProfileUpdate = parse_json(&body)?;

    let profile = app.db.with_conn(|conn| {
        set_display_name(conn, user.id, &update.display_name)?;
        get_profile(conn, user.id)?.ok_or(ServerError::NotFound)
    })?;
    json_response(200, &profile)
}
