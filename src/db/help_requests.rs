// src/db/help_requests.rs
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::Serialize;

use crate::errors::ServerError;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HelpRequest {
    pub id: i64,
    pub campaign_id: i64,
    pub floor: Option<i64>,
    pub user_id: i64,
    pub requester: String,
    pub message: String,
    pub created_at: i64,
    pub resolved_at: Option<i64>,
    pub resolved_by: Option<i64>,
}

const HELP_SELECT: &str = r#"
    select h.id, h.campaign_id, h.floor, h.user_id, coalesce(u.display_name, u.email),
           h.message, h.created_at, h.resolved_at, h.resolved_by
    from help_requests h
    join users u on u.id = h.user_id
"#;

fn help_from_row(r: &Row<'_>) -> rusqlite::Result<HelpRequest> {
    Ok(HelpRequest {
        id: r.get(0)?,
        campaign_id: r.get(1)?,
        floor: r.get(2)?,
        user_id: r.get(3)?,
        requester: r.get(4)?,
        message: r.get(5)?,
        created_at: r.get(6)?,
        resolved_at: r.get(7)?,
        resolved_by: r.get(8)?,
    })
}

pub fn create_help_request(
    conn: &Connection,
    campaign_id: i64,
    floor: Option<i64>,
    user_id: i64,
    message: &str,
    now: i64,
) -> Result<HelpRequest, ServerError> {
    let message = message.trim();
    if message.is_empty() {
        return Err(ServerError::BadRequest("message must not be empty".into()));
    }
    conn.execute(
        "insert into help_requests (campaign_id, floor, user_id, message, created_at) values (?, ?, ?, ?, ?)",
        params![campaign_id, floor, user_id, message, now],
    )?;
    get_help_request(conn, conn.last_insert_rowid())?.ok_or(ServerError::InternalError)
}

pub fn get_help_request(conn: &Connection, id: i64) -> Result<Option<HelpRequest>, ServerError> {
    Ok(conn
        .query_row(&format!("{HELP_SELECT} where h.id = ?"), params![id], help_from_row)
        .optional()?)
}

/// Unresolved requests, oldest first.
pub fn list_open(conn: &Connection, campaign_id: i64) -> Result<Vec<HelpRequest>, ServerError> {
    let mut stmt = conn.prepare(&format!(
        "{HELP_SELECT} where h.campaign_id = ? and h.resolved_at is null order by h.created_at, h.id"
    ))?;
    let rows = stmt.query_map(params![campaign_id], help_from_row)?;
    let mut out = Vec::new();
    for h in rows {
        out.push(h?);
    }
    Ok(out)
}

pub fn resolve(conn: &Connection, id: i64, resolver: i64, now: i64) -> Result<HelpRequest, ServerError> {
    let n = conn.execute(
        "update help_requests set resolved_at = ?, resolved_by = ? where id = ? and resolved_at is null",
        params![now, resolver, id],
    )?;
    let req = get_help_request(conn, id)?.ok_or(ServerError::NotFound)?;
    if n == 0 {
        return Err(ServerError::Conflict("help request already resolved".into()));
    }
    Ok(req)
}
