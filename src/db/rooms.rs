// src/db/rooms.rs
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::domain::campaign::Room;
use crate::domain::route::RoomSample;
use crate::domain::status::VisitStatus;
use crate::errors::ServerError;

const ROOM_COLUMNS: &str =
    "id, campaign_id, floor, position, label, status, note, donation_cents, callback_at, updated_at, updated_by";

fn room_from_row(r: &Row<'_>) -> rusqlite::Result<Room> {
    Ok(Room {
        id: r.get(0)?,
        campaign_id: r.get(1)?,
        floor: r.get(2)?,
        position: r.get(3)?,
        label: r.get(4)?,
        status: r.get(5)?,
        note: r.get(6)?,
        donation_cents: r.get(7)?,
        callback_at: r.get(8)?,
        updated_at: r.get(9)?,
        updated_by: r.get(10)?,
    })
}

pub fn get_room(conn: &Connection, room_id: i64) -> Result<Option<Room>, ServerError> {
    Ok(conn
        .query_row(
            &format!("select {ROOM_COLUMNS} from rooms where id = ?"),
            params![room_id],
            room_from_row,
        )
        .optional()?)
}

/// Rooms ordered top floor first, then by position.
pub fn list_rooms(conn: &Connection, campaign_id: i64) -> Result<Vec<Room>, ServerError> {
    let mut stmt = conn.prepare(&format!(
        "select {ROOM_COLUMNS} from rooms where campaign_id = ? order by floor desc, position"
    ))?;
    let rows = stmt.query_map(params![campaign_id], room_from_row)?;
    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

pub fn room_samples(rooms: &[Room]) -> Vec<RoomSample> {
    rooms
        .iter()
        .map(|r| RoomSample { floor: r.floor, status: r.status, callback_at: r.callback_at })
        .collect()
}

/// The mutable fields of a room, as written by one status change.
#[derive(Debug, Clone, PartialEq)]
pub struct RoomFields {
    pub status: VisitStatus,
    pub note: Option<String>,
    pub donation_cents: i64,
    pub callback_at: Option<i64>,
    pub updated_at: Option<i64>,
    pub updated_by: Option<i64>,
}

impl RoomFields {
    pub fn of(room: &Room) -> Self {
        Self {
            status: room.status,
            note: room.note.clone(),
            donation_cents: room.donation_cents,
            callback_at: room.callback_at,
            updated_at: room.updated_at,
            updated_by: room.updated_by,
        }
    }
}

pub fn write_room_fields(conn: &Connection, room_id: i64, f: &RoomFields) -> Result<(), ServerError> {
    let n = conn.execute(
        r#"
        update rooms set status = ?1, note = ?2, donation_cents = ?3, callback_at = ?4,
            updated_at = ?5, updated_by = ?6
        where id = ?7
        "#,
        params![f.status, f.note, f.donation_cents, f.callback_at, f.updated_at, f.updated_by, room_id],
    )?;
    if n == 0 {
        return Err(ServerError::NotFound);
    }
    Ok(())
}
