// src/db/users.rs
use crate::errors::ServerError;
use rusqlite::{params, Connection, OptionalExtension};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct Profile {
    pub id: i64,
    pub email: String,
    pub display_name: Option<String>,
    pub created_at: i64,
    pub last_login_at: Option<i64>,
}

impl Profile {
    pub fn shown_name(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.email)
    }
}

pub fn get_profile(conn: &Connection, user_id: i64) -> Result<Option<Profile>, ServerError> {
    conn.query_row(
        "select id, email, display_name, created_at, last_login_at from users where id = ?",
        params![user_id],
        |r| {
            Ok(Profile {
                id: r.get(0)?,
                email: r.get(1)?,
                display_name: r.get(2)?,
                created_at: r.get(3)?,
                last_login_at: r.get(4)?,
            })
        },
    )
    .optional()
    .map_err(|e| ServerError::DbError(format!("select profile failed: {e}")))
}

pub fn set_display_name(conn: &Connection, user_id: i64, name: &str) -> Result<(), ServerError> {
    let name = name.trim();
    if name.is_empty() || name.chars().count() > 80 {
        return Err(ServerError::BadRequest("display name must be 1-80 characters".into()));
    }
    conn.execute(
        "update users set display_name = ? where id = ?",
        params![name, user_id],
    )
    .map_err(|e| ServerError::DbError(format!("update display name failed: {e}")))?;
    Ok(())
}
