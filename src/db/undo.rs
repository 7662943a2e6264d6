// src/db/undo.rs
use rusqlite::{params, Connection, OptionalExtension};
use serde::Serialize;

use crate::db::rooms::RoomFields;
use crate::errors::ServerError;

/// One journaled room status change, holding both sides of the write.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusChange {
    pub id: i64,
    pub room_id: i64,
    pub user_id: i64,
    pub visit_id: Option<i64>,
    #[serde(skip)]
    pub previous: RoomFields,
    #[serde(skip)]
    pub written: RoomFields,
    pub changed_at: i64,
    pub undone_at: Option<i64>,
}

pub fn insert_change(
    conn: &Connection,
    room_id: i64,
    user_id: i64,
    visit_id: Option<i64>,
    previous: &RoomFields,
    written: &RoomFields,
    now: i64,
) -> Result<i64, ServerError> {
    conn.execute(
        r#"
        insert into status_changes (
            room_id, user_id, visit_id,
            prev_status, prev_note, prev_donation_cents, prev_callback_at, prev_updated_at, prev_updated_by,
            new_status, new_note, new_donation_cents, new_callback_at,
            changed_at
        ) values (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)
        "#,
        params![
            room_id,
            user_id,
            visit_id,
            previous.status,
            previous.note,
            previous.donation_cents,
            previous.callback_at,
            previous.updated_at,
            previous.updated_by,
            written.status,
            written.note,
            written.donation_cents,
            written.callback_at,
            now,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn get_change(conn: &Connection, change_id: i64) -> Result<Option<StatusChange>, ServerError> {
    Ok(conn
        .query_row(
            r#"
            select id, room_id, user_id, visit_id,
                   prev_status, prev_note, prev_donation_cents, prev_callback_at, prev_updated_at, prev_updated_by,
                   new_status, new_note, new_donation_cents, new_callback_at,
                   changed_at, undone_at
            from status_changes where id = ?
            "#,
            params![change_id],
            |r| {
                let user_id: i64 = r.get(2)?;
                let changed_at: i64 = r.get(14)?;
                Ok(StatusChange {
                    id: r.get(0)?,
                    room_id: r.get(1)?,
                    user_id,
                    visit_id: r.get(3)?,
                    previous: RoomFields {
                        status: r.get(4)?,
                        note: r.get(5)?,
                        donation_cents: r.get(6)?,
                        callback_at: r.get(7)?,
                        updated_at: r.get(8)?,
                        updated_by: r.get(9)?,
                    },
                    written: RoomFields {
                        status: r.get(10)?,
                        note: r.get(11)?,
                        donation_cents: r.get(12)?,
                        callback_at: r.get(13)?,
                        updated_at: Some(changed_at),
                        updated_by: Some(user_id),
                    },
                    changed_at,
                    undone_at: r.get(15)?,
                })
            },
        )
        .optional()?)
}

/// Marks a change undone. Returns false if someone else got there first.
pub fn mark_undone(conn: &Connection, change_id: i64, now: i64) -> Result<bool, ServerError> {
    let n = conn.execute(
        "update status_changes set undone_at = ? where id = ? and undone_at is null",
        params![now, change_id],
    )?;
    Ok(n == 1)
}
