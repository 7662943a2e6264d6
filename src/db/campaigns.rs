// src/db/campaigns.rs
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction};

use crate::domain::campaign::{room_label, Campaign, CampaignKind, NewCampaign};
use crate::errors::ServerError;

const CAMPAIGN_COLUMNS: &str = "id, team_id, name, kind, floors, units_per_floor, target_cents, latitude, longitude, created_at";

fn campaign_from_row(r: &Row<'_>) -> rusqlite::Result<Campaign> {
    let kind: String = r.get(3)?;
    let kind = kind
        .parse()
        .map_err(|e: String| rusqlite::Error::FromSqlConversionFailure(3, Type::Text, e.into()))?;
    Ok(Campaign {
        id: r.get(0)?,
        team_id: r.get(1)?,
        name: r.get(2)?,
        kind,
        floors: r.get(4)?,
        units_per_floor: r.get(5)?,
        target_cents: r.get(6)?,
        latitude: r.get(7)?,
        longitude: r.get(8)?,
        created_at: r.get(9)?,
    })
}

/// Inserts the campaign row and, for residential buildings, every room.
fn insert_one(tx: &Transaction<'_>, team_id: i64, input: &NewCampaign, now: i64) -> Result<Campaign, ServerError> {
    let (floors, units) = match input.kind {
        CampaignKind::Residential => (input.floors, input.units_per_floor),
        CampaignKind::Corporate => (0, 0),
    };
    tx.execute(
        r#"
        insert into campaigns (team_id, name, kind, floors, units_per_floor, target_cents, latitude, longitude, created_at)
        values (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
        "#,
        params![
            team_id,
            input.name.trim(),
            input.kind.as_str(),
            floors,
            units,
            input.target_cents,
            input.latitude,
            input.longitude,
            now,
        ],
    )?;
    let id = tx.last_insert_rowid();

    {
        let mut stmt = tx.prepare(
            "insert into rooms (campaign_id, floor, position, label) values (?1, ?2, ?3, ?4)",
        )?;
        for floor in 1..=floors {
            for position in 1..=units {
                stmt.execute(params![id, floor, position, room_label(floor, position)])?;
            }
        }
    }

    Ok(Campaign {
        id,
        team_id,
        name: input.name.trim().to_string(),
        kind: input.kind,
        floors,
        units_per_floor: units,
        target_cents: input.target_cents,
        latitude: input.latitude,
        longitude: input.longitude,
        created_at: now,
    })
}

pub fn create_campaign(
    conn: &mut Connection,
    team_id: i64,
    input: &NewCampaign,
    now: i64,
) -> Result<Campaign, ServerError> {
    input.validate()?;
    let tx = conn.transaction()?;
    let campaign = insert_one(&tx, team_id, input, now)?;
    tx.commit()?;
    tracing::info!(campaign_id = campaign.id, team_id, name = %campaign.name, "campaign created");
    Ok(campaign)
}

/// All-or-nothing bulk insert used by CSV import.
pub fn create_campaigns(
    conn: &mut Connection,
    team_id: i64,
    inputs: &[NewCampaign],
    now: i64,
) -> Result<Vec<Campaign>, ServerError> {
    for input in inputs {
        input.validate()?;
    }
    let tx = conn.transaction()?;
    let mut created = Vec::with_capacity(inputs.len());
    for input in inputs {
        created.push(insert_one(&tx, team_id, input, now)?);
    }
    tx.commit()?;
    tracing::info!(team_id, count = created.len(), "campaigns imported");
    Ok(created)
}

pub fn get_campaign(conn: &Connection, campaign_id: i64) -> Result<Option<Campaign>, ServerError> {
    Ok(conn
        .query_row(
            &format!("select {CAMPAIGN_COLUMNS} from campaigns where id = ?"),
            params![campaign_id],
            campaign_from_row,
        )
        .optional()?)
}

pub fn require_campaign(conn: &Connection, campaign_id: i64) -> Result<Campaign, ServerError> {
    get_campaign(conn, campaign_id)?.ok_or(ServerError::NotFound)
}

pub fn list_for_team(conn: &Connection, team_id: i64) -> Result<Vec<Campaign>, ServerError> {
    let mut stmt = conn.prepare(&format!(
        "select {CAMPAIGN_COLUMNS} from campaigns where team_id = ? order by name"
    ))?;
    let rows = stmt.query_map(params![team_id], campaign_from_row)?;
    let mut out = Vec::new();
    for c in rows {
        out.push(c?);
    }
    Ok(out)
}

/// Campaigns from every team the user belongs to.
pub fn list_for_user(conn: &Connection, user_id: i64) -> Result<Vec<Campaign>, ServerError> {
    let mut stmt = conn.prepare(&format!(
        r#"
        select {CAMPAIGN_COLUMNS} from campaigns
        where team_id in (select team_id from memberships where user_id = ?)
        order by name
        "#
    ))?;
    let rows = stmt.query_map(params![user_id], campaign_from_row)?;
    let mut out = Vec::new();
    for c in rows {
        out.push(c?);
    }
    Ok(out)
}

pub fn delete_campaign(conn: &Connection, campaign_id: i64) -> Result<(), ServerError> {
    let n = conn.execute("delete from campaigns where id = ?", params![campaign_id])?;
    if n == 0 {
        return Err(ServerError::NotFound);
    }
    tracing::info!(campaign_id, "campaign deleted");
    Ok(())
}
