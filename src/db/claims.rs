// src/db/claims.rs
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::domain::claims::FloorClaim;
use crate::errors::{is_constraint_violation, ServerError};

const CLAIM_COLUMNS: &str = "id, campaign_id, floor, user_id, claimed_at, last_activity_at";

fn claim_from_row(r: &Row<'_>) -> rusqlite::Result<FloorClaim> {
    Ok(FloorClaim {
        id: r.get(0)?,
        campaign_id: r.get(1)?,
        floor: r.get(2)?,
        user_id: r.get(3)?,
        claimed_at: r.get(4)?,
        last_activity_at: r.get(5)?,
    })
}

pub fn get_claim(conn: &Connection, claim_id: i64) -> Result<Option<FloorClaim>, ServerError> {
    Ok(conn
        .query_row(
            &format!("select {CLAIM_COLUMNS} from floor_claims where id = ?"),
            params![claim_id],
            claim_from_row,
        )
        .optional()?)
}

pub fn claim_for_floor(
    conn: &Connection,
    campaign_id: i64,
    floor: i64,
) -> Result<Option<FloorClaim>, ServerError> {
    Ok(conn
        .query_row(
            &format!("select {CLAIM_COLUMNS} from floor_claims where campaign_id = ? and floor = ?"),
            params![campaign_id, floor],
            claim_from_row,
        )
        .optional()?)
}

pub fn list_claims(conn: &Connection, campaign_id: i64) -> Result<Vec<FloorClaim>, ServerError> {
    let mut stmt = conn.prepare(&format!(
        "select {CLAIM_COLUMNS} from floor_claims where campaign_id = ? order by floor desc"
    ))?;
    let rows = stmt.query_map(params![campaign_id], claim_from_row)?;
    let mut out = Vec::new();
    for c in rows {
        out.push(c?);
    }
    Ok(out)
}

/// Inserts a claim. A UNIQUE(campaign_id, floor) violation means another
/// connection won the floor first and surfaces as `Conflict`.
pub fn insert_claim(
    conn: &Connection,
    campaign_id: i64,
    floor: i64,
    user_id: i64,
    now: i64,
) -> Result<FloorClaim, ServerError> {
    let res = conn.execute(
        r#"
        insert into floor_claims (campaign_id, floor, user_id, claimed_at, last_activity_at)
        values (?1, ?2, ?3, ?4, ?4)
        "#,
        params![campaign_id, floor, user_id, now],
    );
    match res {
        Ok(_) => {}
        Err(e) if is_constraint_violation(&e) => {
            return Err(ServerError::Conflict(format!("floor {floor} is already claimed")));
        }
        Err(e) => return Err(e.into()),
    }
    Ok(FloorClaim {
        id: conn.last_insert_rowid(),
        campaign_id,
        floor,
        user_id,
        claimed_at: now,
        last_activity_at: now,
    })
}

pub fn touch_claim(conn: &Connection, claim_id: i64, now: i64) -> Result<(), ServerError> {
    let n = conn.execute(
        "update floor_claims set last_activity_at = ? where id = ?",
        params![now, claim_id],
    )?;
    if n == 0 {
        return Err(ServerError::NotFound);
    }
    Ok(())
}

pub fn delete_claim(conn: &Connection, claim_id: i64) -> Result<(), ServerError> {
    let n = conn.execute("delete from floor_claims where id = ?", params![claim_id])?;
    if n == 0 {
        return Err(ServerError::NotFound);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_conn;
    use crate::db::test_support::{seed_building, seed_team};

    #[test]
    fn second_insert_on_same_floor_conflicts() {
        let mut conn = test_conn();
        let (team, lead) = seed_team(&mut conn);
        let c = seed_building(&mut conn, team, 3, 2);

        let first = insert_claim(&conn, c.id, 2, lead, 10).unwrap();
        let err = insert_claim(&conn, c.id, 2, lead, 11).unwrap_err();
        assert!(matches!(err, ServerError::Conflict(_)));

        let stored = claim_for_floor(&conn, c.id, 2).unwrap().unwrap();
        assert_eq!(stored, first);
    }

    #[test]
    fn touch_and_delete() {
        let mut conn = test_conn();
        let (team, lead) = seed_team(&mut conn);
        let c = seed_building(&mut conn, team, 3, 2);

        let claim = insert_claim(&conn, c.id, 1, lead, 10).unwrap();
        touch_claim(&conn, claim.id, 99).unwrap();
        assert_eq!(get_claim(&conn, claim.id).unwrap().unwrap().last_activity_at, 99);

        delete_claim(&conn, claim.id).unwrap();
        assert!(list_claims(&conn, c.id).unwrap().is_empty());
        assert!(matches!(delete_claim(&conn, claim.id), Err(ServerError::NotFound)));
    }
}
