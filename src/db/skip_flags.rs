// src/db/skip_flags.rs
use std::collections::HashSet;

use rusqlite::{params, Connection};

use crate::errors::ServerError;

pub fn load_flags(conn: &Connection, campaign_id: i64) -> Result<HashSet<i64>, ServerError> {
    let mut stmt = conn.prepare("select floor from floor_skip_flags where campaign_id = ?")?;
    let rows = stmt.query_map(params![campaign_id], |r| r.get::<_, i64>(0))?;
    let mut out = HashSet::new();
    for f in rows {
        out.insert(f?);
    }
    Ok(out)
}

/// Replaces the stored flag set, keeping `flagged_at` for floors that stay flagged.
pub fn save_flags(
    conn: &mut Connection,
    campaign_id: i64,
    flagged: &[i64],
    now: i64,
) -> Result<(), ServerError> {
    let tx = conn.transaction()?;
    {
        let keep: HashSet<i64> = flagged.iter().copied().collect();
        let mut existing = tx.prepare("select floor from floor_skip_flags where campaign_id = ?")?;
        let stored = existing
            .query_map(params![campaign_id], |r| r.get::<_, i64>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        for floor in stored.into_iter().filter(|f| !keep.contains(f)) {
            tx.execute(
                "delete from floor_skip_flags where campaign_id = ? and floor = ?",
                params![campaign_id, floor],
            )?;
        }
        for floor in flagged {
            tx.execute(
                "insert or ignore into floor_skip_flags (campaign_id, floor, flagged_at) values (?, ?, ?)",
                params![campaign_id, floor, now],
            )?;
        }
    }
    tx.commit()?;
    Ok(())
}
