// src/db/auth.rs
use rusqlite::{params, Connection, OptionalExtension};

use crate::errors::ServerError;

#[derive(Debug, Clone)]
pub struct MagicLinkRow {
    pub id: i64,
    pub user_id: i64,
    pub created_at: i64,
    pub expires_at: i64,
    pub used_at: Option<i64>,
}

/// Insert a user if they don't exist, then return the user id.
/// Email should already be normalized by caller (trim/lowercase).
pub fn get_or_create_user(conn: &Connection, email: &str, now: i64) -> Result<i64, ServerError> {
    conn.execute(
        "insert or ignore into users (email, created_at) values (?, ?)",
        params![email, now],
    )
    .map_err(|e| ServerError::DbError(format!("insert user failed: {e}")))?;

    let id: i64 = conn
        .query_row(
            "select id from users where email = ?",
            params![email],
            |row| row.get(0),
        )
        .map_err(|e| ServerError::DbError(format!("select user id failed: {e}")))?;

    Ok(id)
}

/// Insert a magic link row (token_hash should be SHA-256 bytes).
pub fn insert_magic_link(
    conn: &Connection,
    user_id: i64,
    token_hash: &[u8],
    created_at: i64,
    expires_at: i64,
) -> Result<(), ServerError> {
    conn.execute(
        "insert into magic_links (user_id, token_hash, created_at, expires_at) values (?, ?, ?, ?)",
        params![user_id, token_hash, created_at, expires_at],
    )
    .map_err(|e| ServerError::DbError(format!("insert magic link failed: {e}")))?;
    Ok(())
}

fn select_magic_link(conn: &Connection, token_hash: &[u8]) -> rusqlite::Result<Option<MagicLinkRow>> {
    conn.query_row(
        "select id, user_id, created_at, expires_at, used_at
         from magic_links
         where token_hash = ?",
        params![token_hash],
        |r| {
            Ok(MagicLinkRow {
                id: r.get(0)?,
                user_id: r.get(1)?,
                created_at: r.get(2)?,
                expires_at: r.get(3)?,
                used_at: r.get(4)?,
            })
        },
    )
    .optional()
}

/// Find magic link by token hash.
#[cfg(test)]
pub fn find_magic_link_by_hash(
    conn: &Connection,
    token_hash: &[u8],
) -> Result<Option<MagicLinkRow>, ServerError> {
    select_magic_link(conn, token_hash)
        .map_err(|e| ServerError::DbError(format!("select magic link failed: {e}")))
}

/// Consume a magic link token hash:
/// - must exist
/// - must be unexpired (expires_at > now)
/// - must be unused (used_at is null)
/// If valid, sets used_at=now and returns Some(user_id). Otherwise returns Ok(None).
///
/// Uses a transaction to prevent double-use races.
pub fn consume_magic_link(
    conn: &mut Connection,
    token_hash: &[u8],
    now: i64,
) -> Result<Option<i64>, ServerError> {
    let tx = conn
        .transaction()
        .map_err(|e| ServerError::DbError(format!("begin tx failed: {e}")))?;

    let row = select_magic_link(&tx, token_hash)
        .map_err(|e| ServerError::DbError(format!("select magic link in tx failed: {e}")))?;

    let Some(ml) = row else {
        tx.rollback().ok();
        return Ok(None);
    };

    if ml.used_at.is_some() || ml.expires_at <= now {
        tx.rollback().ok();
        return Ok(None);
    }

    // Guard used_at IS NULL so only one consumer wins.
    let updated = tx
        .execute(
            "update magic_links set used_at = ?
             where id = ? and used_at is null",
            params![now, ml.id],
        )
        .map_err(|e| ServerError::DbError(format!("update magic link used_at failed: {e}")))?;

    if updated != 1 {
        tx.rollback().ok();
        return Ok(None);
    }

    tx.commit()
        .map_err(|e| ServerError::DbError(format!("commit tx failed: {e}")))?;

    Ok(Some(ml.user_id))
}

pub fn touch_last_login(conn: &Connection, user_id: i64, now: i64) -> Result<(), ServerError> {
    conn.execute(
        "update users set last_login_at = ? where id = ?",
        params![now, user_id],
    )
    .map_err(|e| ServerError::DbError(format!("update last_login_at failed: {e}")))?;
    Ok(())
}
