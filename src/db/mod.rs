pub mod auth;
pub mod businesses;
pub mod campaigns;
pub mod claims;
pub mod connection;
pub mod help_requests;
pub mod magic_auth;
pub mod rooms;
pub mod skip_flags;
pub mod teams;
pub mod undo;
pub mod users;
pub mod visits;

/// In-memory connection with the full schema applied.
#[cfg(test)]
pub fn test_conn() -> rusqlite::Connection {
    let conn = rusqlite::Connection::open_in_memory().unwrap();
    conn.execute_batch(include_str!("../../sql/schema.sql")).unwrap();
    conn
}
