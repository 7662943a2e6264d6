// src/db/teams.rs
use rusqlite::{params, Connection, OptionalExtension};

use crate::db::auth::get_or_create_user;
use crate::domain::team::{Member, Role, Team};
use crate::errors::ServerError;

/// Creates a team; the creator becomes its first leader.
pub fn create_team(conn: &mut Connection, name: &str, creator_id: i64, now: i64) -> Result<Team, ServerError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ServerError::BadRequest("team name must not be empty".into()));
    }
    let tx = conn.transaction()?;
    tx.execute(
        "insert into teams (name, created_at) values (?, ?)",
        params![name, now],
    )?;
    let team_id = tx.last_insert_rowid();
    tx.execute(
        "insert into memberships (team_id, user_id, role, joined_at) values (?, ?, 'leader', ?)",
        params![team_id, creator_id, now],
    )?;
    tx.commit()?;

    Ok(Team { id: team_id, name: name.to_string(), created_at: now })
}

pub fn get_team(conn: &Connection, team_id: i64) -> Result<Option<Team>, ServerError> {
    Ok(conn
        .query_row(
            "select id, name, created_at from teams where id = ?",
            params![team_id],
            |r| Ok(Team { id: r.get(0)?, name: r.get(1)?, created_at: r.get(2)? }),
        )
        .optional()?)
}

/// Adds (or re-roles) a member by email, creating the user if needed.
pub fn add_member(
    conn: &Connection,
    team_id: i64,
    email: &str,
    role: Role,
    now: i64,
) -> Result<i64, ServerError> {
    let user_id = get_or_create_user(conn, email, now)?;
    conn.execute(
        r#"
        insert into memberships (team_id, user_id, role, joined_at) values (?1, ?2, ?3, ?4)
        on conflict(team_id, user_id) do update set role = excluded.role
        "#,
        params![team_id, user_id, role.as_str(), now],
    )?;
    Ok(user_id)
}

pub fn list_members(conn: &Connection, team_id: i64) -> Result<Vec<Member>, ServerError> {
    let mut stmt = conn.prepare(
        r#"
        select u.id, u.email, u.display_name, m.role, m.joined_at
        from memberships m
        join users u on u.id = m.user_id
        where m.team_id = ?
        order by m.role, u.email
        "#,
    )?;
    let rows = stmt.query_map(params![team_id], |r| {
        let role: String = r.get(3)?;
        Ok(Member {
            user_id: r.get(0)?,
            email: r.get(1)?,
            display_name: r.get(2)?,
            role: role.parse().unwrap_or(Role::Volunteer),
            joined_at: r.get(4)?,
        })
    })?;

    let mut out = Vec::new();
    for m in rows {
        out.push(m?);
    }
    Ok(out)
}

pub fn membership_role(conn: &Connection, team_id: i64, user_id: i64) -> Result<Option<Role>, ServerError> {
    let role: Option<String> = conn
        .query_row(
            "select role from memberships where team_id = ? and user_id = ?",
            params![team_id, user_id],
            |r| r.get(0),
        )
        .optional()?;
    Ok(role.and_then(|r| r.parse().ok()))
}

pub fn require_member(conn: &Connection, team_id: i64, user_id: i64) -> Result<Role, ServerError> {
    membership_role(conn, team_id, user_id)?
        .ok_or_else(|| ServerError::Forbidden("not a member of this team".into()))
}

pub fn require_leader(conn: &Connection, team_id: i64, user_id: i64) -> Result<(), ServerError> {
    match require_member(conn, team_id, user_id)? {
        Role::Leader => Ok(()),
        Role::Volunteer => Err(ServerError::Forbidden("team leader role required".into())),
    }
}

pub fn teams_for_user(conn: &Connection, user_id: i64) -> Result<Vec<(Team, Role)>, ServerError> {
    let mut stmt = conn.prepare(
        r#"
        select t.id, t.name, t.created_at, m.role
        from memberships m
        join teams t on t.id = m.team_id
        where m.user_id = ?
        order by t.name
        "#,
    )?;
    let rows = stmt.query_map(params![user_id], |r| {
        let role: String = r.get(3)?;
        Ok((
            Team { id: r.get(0)?, name: r.get(1)?, created_at: r.get(2)? },
            role.parse().unwrap_or(Role::Volunteer),
        ))
    })?;
    let mut out = Vec::new();
    for t in rows {
        out.push(t?);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_conn;

    #[test]
    fn creator_leads_and_members_can_be_rerolled() {
        let mut conn = test_conn();
        let lead = get_or_create_user(&conn, "lead@example.com", 1).unwrap();
        let team = create_team(&mut conn, " North Side ", lead, 1).unwrap();
        assert_eq!(team.name, "North Side");
        assert_eq!(membership_role(&conn, team.id, lead).unwrap(), Some(Role::Leader));

        let vol = add_member(&conn, team.id, "vol@example.com", Role::Volunteer, 2).unwrap();
        assert!(require_leader(&conn, team.id, vol).is_err());
        assert_eq!(require_member(&conn, team.id, vol).unwrap(), Role::Volunteer);

        add_member(&conn, team.id, "vol@example.com", Role::Leader, 3).unwrap();
        assert!(require_leader(&conn, team.id, vol).is_ok());
        assert_eq!(list_members(&conn, team.id).unwrap().len(), 2);
    }

    #[test]
    fn outsiders_are_forbidden() {
        let mut conn = test_conn();
        let lead = get_or_create_user(&conn, "lead@example.com", 1).unwrap();
        let outsider = get_or_create_user(&conn, "out@example.com", 1).unwrap();
        let team = create_team(&mut conn, "Team", lead, 1).unwrap();

        assert!(matches!(
            require_member(&conn, team.id, outsider),
            Err(ServerError::Forbidden(_))
        ));
        assert_eq!(teams_for_user(&conn, lead).unwrap().len(), 1);
        assert!(teams_for_user(&conn, outsider).unwrap().is_empty());
    }
}
