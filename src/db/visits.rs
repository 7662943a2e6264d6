// src/db/visits.rs
use rusqlite::{params, Connection};

use crate::domain::insights::VisitSample;
use crate::domain::stats::LeaderboardEntry;
use crate::domain::status::VisitStatus;
use crate::errors::ServerError;

/// What a visit-log row was recorded against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisitTarget {
    Room { id: i64, floor: i64 },
    Business { id: i64 },
}

pub fn insert_visit(
    conn: &Connection,
    campaign_id: i64,
    target: VisitTarget,
    user_id: i64,
    status: VisitStatus,
    donation_cents: i64,
    now: i64,
) -> Result<i64, ServerError> {
    let (floor, room_id, business_id) = match target {
        VisitTarget::Room { id, floor } => (Some(floor), Some(id), None),
        VisitTarget::Business { id } => (None, None, Some(id)),
    };
    conn.execute(
        r#"
        insert into visits (campaign_id, floor, room_id, business_id, user_id, status, donation_cents, recorded_at)
        values (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
        "#,
        params![campaign_id, floor, room_id, business_id, user_id, status, donation_cents, now],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn delete_visit(conn: &Connection, visit_id: i64) -> Result<(), ServerError> {
    conn.execute("delete from visits where id = ?", params![visit_id])?;
    Ok(())
}

/// Visit log for one campaign, oldest first.
pub fn visit_samples(conn: &Connection, campaign_id: i64) -> Result<Vec<VisitSample>, ServerError> {
    let mut stmt = conn.prepare(
        r#"
        select recorded_at, status, donation_cents
        from visits
        where campaign_id = ? and status != 'unvisited'
        order by recorded_at
        "#,
    )?;
    let rows = stmt.query_map(params![campaign_id], |r| {
        Ok(VisitSample { recorded_at: r.get(0)?, status: r.get(1)?, donation_cents: r.get(2)? })
    })?;
    let mut out = Vec::new();
    for v in rows {
        out.push(v?);
    }
    Ok(out)
}

/// Volunteers of a team ranked by donations, then cents raised.
pub fn leaderboard(conn: &Connection, team_id: i64) -> Result<Vec<LeaderboardEntry>, ServerError> {
    let mut stmt = conn.prepare(
        r#"
        select u.id, coalesce(u.display_name, u.email),
               count(v.id),
               coalesce(sum(case when v.status = 'donated' then 1 else 0 end), 0),
               coalesce(sum(v.donation_cents), 0)
        from visits v
        join campaigns c on c.id = v.campaign_id
        join users u on u.id = v.user_id
        where c.team_id = ? and v.status != 'unvisited'
        group by u.id
        order by 4 desc, 5 desc, 3 desc, u.id
        "#,
    )?;
    let rows = stmt.query_map(params![team_id], |r| {
        Ok(LeaderboardEntry {
            user_id: r.get(0)?,
            name: r.get(1)?,
            visits: r.get(2)?,
            donations: r.get(3)?,
            raised_cents: r.get(4)?,
        })
    })?;
    let mut out = Vec::new();
    for e in rows {
        out.push(e?);
    }
    Ok(out)
}
