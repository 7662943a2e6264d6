// src/services/planning.rs
use rusqlite::Connection;

use crate::db::rooms::{list_rooms, room_samples};
use crate::db::skip_flags::{load_flags, save_flags};
use crate::db::visits::visit_samples;
use crate::domain::insights::{score_hours, TimeOfDayReport};
use crate::domain::route::{plan_route, RouteParams, RoutePlan};
use crate::errors::ServerError;
use crate::services::campaign_for_member;

/// Builds the route plan and persists the skip flags it settles on, so the
/// hysteresis carries over to the next request.
pub fn route_for_campaign(
    conn: &mut Connection,
    campaign_id: i64,
    user_id: i64,
    now: i64,
    params: &RouteParams,
) -> Result<RoutePlan, ServerError> {
    let (campaign, _) = campaign_for_member(conn, campaign_id, user_id)?;
    let rooms = list_rooms(conn, campaign_id)?;
    let previous = load_flags(conn, campaign_id)?;

    let plan = plan_route(campaign.floors, &room_samples(&rooms), &previous, now, params);

    let changed = plan.skip.len() != previous.len() || plan.skip.iter().any(|f| !previous.contains(f));
    if changed {
        save_flags(conn, campaign_id, &plan.skip, now)?;
        tracing::info!(campaign_id, skip = ?plan.skip, "skip flags changed");
    }
    Ok(plan)
}

pub fn time_of_day(
    conn: &Connection,
    campaign_id: i64,
    user_id: i64,
    now: i64,
    tz_offset_minutes: i32,
    min_samples: u32,
) -> Result<TimeOfDayReport, ServerError> {
    campaign_for_member(conn, campaign_id, user_id)?;
    let visits = visit_samples(conn, campaign_id)?;
    Ok(score_hours(&visits, tz_offset_minutes, min_samples, now))
}
