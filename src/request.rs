// src/request.rs

//! Small helpers for pulling data out of an incoming request.

use astra::Request;
use http::request::Parts;
use http::HeaderMap;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::io::Read;

use crate::app::AppState;
use crate::auth::sessions::{load_user_from_session, SessionUser};
use crate::errors::ServerError;

pub const SESSION_COOKIE: &str = "session";

/// Splits the request and reads at most `limit` bytes of body.
pub fn read_body(req: Request, limit: u64) -> Result<(Parts, Vec<u8>), ServerError> {
    let (parts, mut body) = req.into_parts();
    let mut buf = Vec::new();
    body.reader()
        .take(limit + 1)
        .read_to_end(&mut buf)
        .map_err(|e| ServerError::BadRequest(format!("failed to read body: {e}")))?;
    if buf.len() as u64 > limit {
        return Err(ServerError::BadRequest(format!("request body exceeds {limit} bytes")));
    }
    Ok((parts, buf))
}

pub fn parse_query(query: Option<&str>) -> HashMap<String, String> {
    query
        .map(|q| url::form_urlencoded::parse(q.as_bytes()).into_owned().collect())
        .unwrap_or_default()
}

pub fn parse_form(body: &[u8]) -> HashMap<String, String> {
    url::form_urlencoded::parse(body).into_owned().collect()
}

pub fn parse_json<T: DeserializeOwned>(body: &[u8]) -> Result<T, ServerError> {
    Ok(serde_json::from_slice(body)?)
}

pub fn cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(http::header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(k, _)| *k == name)
        .map(|(_, v)| v.to_string())
}

pub fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(http::header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
}

/// Raw session token from the bearer header, else the session cookie.
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    bearer_token(headers).or_else(|| cookie(headers, SESSION_COOKIE))
}

pub fn current_user(app: &AppState, headers: &HeaderMap, now: i64) -> Result<Option<SessionUser>, ServerError> {
    let Some(token) = session_token(headers) else {
        return Ok(None);
    };
    app.db.with_conn(|conn| load_user_from_session(conn, &token, now))
}

pub fn require_user(app: &AppState, headers: &HeaderMap, now: i64) -> Result<SessionUser, ServerError> {
    current_user(app, headers, now)?.ok_or_else(|| ServerError::Unauthorized("sign in required".into()))
}

/// Parses a path segment as an id. Garbage ids are simply unknown resources.
pub fn path_id(segment: &str) -> Result<i64, ServerError> {
    segment.parse().map_err(|_| ServerError::NotFound)
}
