// src/db/businesses.rs
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::domain::campaign::{Business, BusinessUpdate};
use crate::errors::ServerError;

const BUSINESS_COLUMNS: &str =
    "id, campaign_id, name, contact_name, status, supports, note, callback_at, updated_at, updated_by";

fn business_from_row(r: &Row<'_>) -> rusqlite::Result<Business> {
    Ok(Business {
        id: r.get(0)?,
        campaign_id: r.get(1)?,
        name: r.get(2)?,
        contact_name: r.get(3)?,
        status: r.get(4)?,
        supports: r.get(5)?,
        note: r.get(6)?,
        callback_at: r.get(7)?,
        updated_at: r.get(8)?,
        updated_by: r.get(9)?,
    })
}

pub fn add_business(
    conn: &Connection,
    campaign_id: i64,
    name: &str,
    contact_name: Option<&str>,
) -> Result<Business, ServerError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ServerError::BadRequest("business name must not be empty".into()));
    }
    let contact = contact_name.map(str::trim).filter(|c| !c.is_empty());
    conn.execute(
        "insert into businesses (campaign_id, name, contact_name) values (?, ?, ?)",
        params![campaign_id, name, contact],
    )?;
    let id = conn.last_insert_rowid();
    get_business(conn, id)?.ok_or(ServerError::InternalError)
}

pub fn get_business(conn: &Connection, business_id: i64) -> Result<Option<Business>, ServerError> {
    Ok(conn
        .query_row(
            &format!("select {BUSINESS_COLUMNS} from businesses where id = ?"),
            params![business_id],
            business_from_row,
        )
        .optional()?)
}

pub fn list_businesses(conn: &Connection, campaign_id: i64) -> Result<Vec<Business>, ServerError> {
    let mut stmt = conn.prepare(&format!(
        "select {BUSINESS_COLUMNS} from businesses where campaign_id = ? order by name"
    ))?;
    let rows = stmt.query_map(params![campaign_id], business_from_row)?;
    let mut out = Vec::new();
    for b in rows {
        out.push(b?);
    }
    Ok(out)
}

pub fn update_business(
    conn: &Connection,
    business_id: i64,
    update: &BusinessUpdate,
    user_id: i64,
    now: i64,
) -> Result<Business, ServerError> {
    update.validate()?;
    let callback_at = match update.status {
        crate::domain::status::VisitStatus::Callback => update.callback_at,
        _ => None,
    };
    let n = conn.execute(
        r#"
        update businesses set status = ?1, note = ?2, supports = ?3, callback_at = ?4,
            updated_at = ?5, updated_by = ?6
        where id = ?7
        "#,
        params![update.status, update.note, update.supports, callback_at, now, user_id, business_id],
    )?;
    if n == 0 {
        return Err(ServerError::NotFound);
    }
    get_business(conn, business_id)?.ok_or(ServerError::NotFound)
}
